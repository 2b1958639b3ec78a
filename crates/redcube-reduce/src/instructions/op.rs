use serde::{Deserialize, Serialize};

use crate::{Numeric, ReduceError};

use super::{AMax, AMin, ASum, Max, Mean, Min, Prod, ReduceInstruction, Sum};

/// Runtime identifier of a reduction instruction.
///
/// The opcode table is closed: every defined opcode maps to exactly one instruction and any
/// other code is rejected before a kernel is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceOp {
    /// See [Sum].
    Sum,
    /// See [Max].
    Max,
    /// See [Min].
    Min,
    /// See [Prod].
    Prod,
    /// See [Mean].
    Mean,
    /// See [ASum].
    ASum,
    /// See [AMax].
    AMax,
    /// See [AMin].
    AMin,
}

/// Executes code monomorphized for the instruction matching a [ReduceOp].
pub trait ReduceOpVisitor<N: Numeric> {
    /// Value produced by the visit.
    type Output;

    /// Called with the instruction selected by [ReduceOp::dispatch].
    fn visit<R: ReduceInstruction<N>>(self) -> Self::Output;
}

impl ReduceOp {
    /// All instructions, indexed by opcode.
    pub const ALL: [ReduceOp; 8] = [
        ReduceOp::Sum,
        ReduceOp::Max,
        ReduceOp::Min,
        ReduceOp::Prod,
        ReduceOp::Mean,
        ReduceOp::ASum,
        ReduceOp::AMax,
        ReduceOp::AMin,
    ];

    /// The opcode of the instruction.
    pub fn opcode(self) -> i32 {
        match self {
            ReduceOp::Sum => 0,
            ReduceOp::Max => 1,
            ReduceOp::Min => 2,
            ReduceOp::Prod => 3,
            ReduceOp::Mean => 4,
            ReduceOp::ASum => 5,
            ReduceOp::AMax => 6,
            ReduceOp::AMin => 7,
        }
    }

    /// Resolves an opcode.
    pub fn from_opcode(opcode: i32) -> Result<Self, ReduceError> {
        usize::try_from(opcode)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(ReduceError::UnsupportedOpCode(opcode))
    }

    /// Runs the visitor with the matching instruction.
    pub fn dispatch<N: Numeric, V: ReduceOpVisitor<N>>(self, visitor: V) -> V::Output {
        match self {
            ReduceOp::Sum => visitor.visit::<Sum>(),
            ReduceOp::Max => visitor.visit::<Max>(),
            ReduceOp::Min => visitor.visit::<Min>(),
            ReduceOp::Prod => visitor.visit::<Prod>(),
            ReduceOp::Mean => visitor.visit::<Mean>(),
            ReduceOp::ASum => visitor.visit::<ASum>(),
            ReduceOp::AMax => visitor.visit::<AMax>(),
            ReduceOp::AMin => visitor.visit::<AMin>(),
        }
    }

    /// The starting value of the instruction.
    pub fn starting_value<N: Numeric>(self, extra_params: &[N]) -> N {
        struct StartingValue<'a, N>(&'a [N]);

        impl<N: Numeric> ReduceOpVisitor<N> for StartingValue<'_, N> {
            type Output = N;

            fn visit<R: ReduceInstruction<N>>(self) -> N {
                R::starting_value(self.0)
            }
        }

        self.dispatch(StartingValue(extra_params))
    }

    /// Folds host values sequentially, without any device involved.
    ///
    /// Used as the reference the parallel reductions are checked against.
    pub fn fold<N: Numeric>(self, values: &[N], extra_params: &[N]) -> N {
        struct Fold<'a, N> {
            values: &'a [N],
            extra_params: &'a [N],
        }

        impl<N: Numeric> ReduceOpVisitor<N> for Fold<'_, N> {
            type Output = N;

            fn visit<R: ReduceInstruction<N>>(self) -> N {
                if self.values.is_empty() {
                    return R::starting_value(self.extra_params);
                }
                let reduction = self
                    .values
                    .iter()
                    .fold(R::starting_value(self.extra_params), |acc, item| {
                        R::update(acc, R::op(*item, self.extra_params), self.extra_params)
                    });
                R::post_process(reduction, self.values.len(), self.extra_params)
            }
        }

        self.dispatch(Fold {
            values,
            extra_params,
        })
    }
}

impl core::fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}
