use crate::Numeric;

use super::{ReduceInstruction, ReduceOp};

/// Largest element.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl<N: Numeric> ReduceInstruction<N> for Max {
    const OP: ReduceOp = ReduceOp::Max;

    fn starting_value(_extra_params: &[N]) -> N {
        N::lowest()
    }

    fn update(old: N, item: N, _extra_params: &[N]) -> N {
        if item > old { item } else { old }
    }
}
