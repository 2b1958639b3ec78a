use crate::Numeric;

use super::{ReduceInstruction, ReduceOp};

/// Product of the elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prod;

impl<N: Numeric> ReduceInstruction<N> for Prod {
    const OP: ReduceOp = ReduceOp::Prod;

    fn starting_value(_extra_params: &[N]) -> N {
        N::one()
    }

    fn update(old: N, item: N, _extra_params: &[N]) -> N {
        old.device_mul(item)
    }
}
