use crate::Numeric;

use super::{ReduceInstruction, ReduceOp};

/// Sum of the elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl<N: Numeric> ReduceInstruction<N> for Sum {
    const OP: ReduceOp = ReduceOp::Sum;

    fn starting_value(_extra_params: &[N]) -> N {
        N::zero()
    }

    fn update(old: N, item: N, _extra_params: &[N]) -> N {
        old.device_add(item)
    }
}
