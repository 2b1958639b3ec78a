use crate::Numeric;

use super::ReduceOp;

/// One member of the closed family of reductions.
///
/// Instructions are selected at compile time and every function is resolved statically inside
/// the kernels, there is no dynamic dispatch in the per-element loop. `update` must be
/// associative and commutative for the block and grid folds to match a sequential fold.
pub trait ReduceInstruction<N: Numeric>: Send + Sync + 'static {
    /// The runtime identifier of the instruction.
    const OP: ReduceOp;

    /// The value every accumulator starts from, and the result of an empty reduction.
    fn starting_value(extra_params: &[N]) -> N;

    /// Maps an input element before it's accumulated.
    fn op(item: N, _extra_params: &[N]) -> N {
        item
    }

    /// Combines an accumulator with a mapped element or with another accumulator.
    fn update(old: N, item: N, extra_params: &[N]) -> N;

    /// Turns the final accumulator into the output value, given the number of reduced elements.
    fn post_process(reduction: N, _n: usize, _extra_params: &[N]) -> N {
        reduction
    }
}
