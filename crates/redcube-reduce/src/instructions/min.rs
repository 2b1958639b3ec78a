use crate::Numeric;

use super::{ReduceInstruction, ReduceOp};

/// Smallest element.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl<N: Numeric> ReduceInstruction<N> for Min {
    const OP: ReduceOp = ReduceOp::Min;

    fn starting_value(_extra_params: &[N]) -> N {
        N::highest()
    }

    fn update(old: N, item: N, _extra_params: &[N]) -> N {
        if item < old { item } else { old }
    }
}
