use crate::Numeric;

use super::{ReduceInstruction, ReduceOp};

/// Arithmetic mean of the elements.
///
/// Accumulates a sum and divides it by the element count once the reduction is complete.
/// Integer types use integer division.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl<N: Numeric> ReduceInstruction<N> for Mean {
    const OP: ReduceOp = ReduceOp::Mean;

    fn starting_value(_extra_params: &[N]) -> N {
        N::zero()
    }

    fn update(old: N, item: N, _extra_params: &[N]) -> N {
        old.device_add(item)
    }

    fn post_process(reduction: N, n: usize, _extra_params: &[N]) -> N {
        reduction / N::from_count(n)
    }
}
