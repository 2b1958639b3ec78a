use crate::Numeric;

use super::{ReduceInstruction, ReduceOp};

/// Sum of the absolute values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ASum;

/// Largest absolute value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AMax;

/// Smallest absolute value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AMin;

impl<N: Numeric> ReduceInstruction<N> for ASum {
    const OP: ReduceOp = ReduceOp::ASum;

    fn starting_value(_extra_params: &[N]) -> N {
        N::zero()
    }

    fn op(item: N, _extra_params: &[N]) -> N {
        item.abs_value()
    }

    fn update(old: N, item: N, _extra_params: &[N]) -> N {
        old.device_add(item)
    }
}

impl<N: Numeric> ReduceInstruction<N> for AMax {
    const OP: ReduceOp = ReduceOp::AMax;

    // Every absolute value is at least zero.
    fn starting_value(_extra_params: &[N]) -> N {
        N::zero()
    }

    fn op(item: N, _extra_params: &[N]) -> N {
        item.abs_value()
    }

    fn update(old: N, item: N, _extra_params: &[N]) -> N {
        if item > old { item } else { old }
    }
}

impl<N: Numeric> ReduceInstruction<N> for AMin {
    const OP: ReduceOp = ReduceOp::AMin;

    fn starting_value(_extra_params: &[N]) -> N {
        N::highest()
    }

    fn op(item: N, _extra_params: &[N]) -> N {
        item.abs_value()
    }

    fn update(old: N, item: N, _extra_params: &[N]) -> N {
        if item < old { item } else { old }
    }
}
