use core::fmt::{Debug, Display};

use num_traits::{Num, NumCast};

/// Element types that can be reduced.
///
/// Arithmetic follows device semantics: integer sums and products wrap instead of trapping.
pub trait Numeric:
    Num + NumCast + Copy + PartialOrd + Debug + Display + Send + Sync + 'static
{
    /// The smallest value, `-inf` for floats.
    fn lowest() -> Self;
    /// The largest value, `+inf` for floats.
    fn highest() -> Self;
    /// Absolute value, identity for unsigned types.
    fn abs_value(self) -> Self;
    /// Device addition.
    fn device_add(self, rhs: Self) -> Self;
    /// Device multiplication.
    fn device_mul(self, rhs: Self) -> Self;

    /// Converts an element count, saturating to [highest](Numeric::highest).
    fn from_count(count: usize) -> Self {
        <Self as NumCast>::from(count).unwrap_or_else(Self::highest)
    }
}

macro_rules! impl_numeric_float {
    ($($ty:ty),*) => {
        $(impl Numeric for $ty {
            fn lowest() -> Self {
                <$ty>::NEG_INFINITY
            }
            fn highest() -> Self {
                <$ty>::INFINITY
            }
            fn abs_value(self) -> Self {
                self.abs()
            }
            fn device_add(self, rhs: Self) -> Self {
                self + rhs
            }
            fn device_mul(self, rhs: Self) -> Self {
                self * rhs
            }
        })*
    };
}

macro_rules! impl_numeric_int {
    ($($ty:ty),*) => {
        $(impl Numeric for $ty {
            fn lowest() -> Self {
                <$ty>::MIN
            }
            fn highest() -> Self {
                <$ty>::MAX
            }
            fn abs_value(self) -> Self {
                self.wrapping_abs()
            }
            fn device_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            fn device_mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
        })*
    };
}

macro_rules! impl_numeric_uint {
    ($($ty:ty),*) => {
        $(impl Numeric for $ty {
            fn lowest() -> Self {
                <$ty>::MIN
            }
            fn highest() -> Self {
                <$ty>::MAX
            }
            fn abs_value(self) -> Self {
                self
            }
            fn device_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            fn device_mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
        })*
    };
}

impl_numeric_float!(f32, f64);
impl_numeric_int!(i32, i64);
impl_numeric_uint!(u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(i32::MAX.device_add(1), i32::MIN);
        assert_eq!(u32::MAX.device_mul(2), u32::MAX - 1);
        assert_eq!(i32::MIN.abs_value(), i32::MIN);
    }

    #[test]
    fn sentinels() {
        assert_eq!(f32::lowest(), f32::NEG_INFINITY);
        assert_eq!(i64::highest(), i64::MAX);
        assert_eq!(u32::lowest(), 0);
    }

    #[test]
    fn from_count_saturates() {
        assert_eq!(f64::from_count(7), 7.0);
        assert_eq!(i32::from_count(usize::MAX), i32::MAX);
    }
}
