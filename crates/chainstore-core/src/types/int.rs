use derive_more::{Add, AddAssign, Display, From, Sub, SubAssign};
use num_bigint::{BigInt, ParseBigIntError};
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Serialize, Serializer};
use std::{
    iter::Sum,
    ops::{Mul, Neg},
    str::FromStr,
};

///
/// Int
///
/// Arbitrary-precision signed integer. Token amounts, block numbers and
/// integer identifiers all normalize to this type.
///

#[derive(
    Add,
    AddAssign,
    Clone,
    Debug,
    Default,
    Display,
    Eq,
    From,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Sub,
    SubAssign,
)]
pub struct Int(BigInt);

impl Int {
    #[must_use]
    pub const fn from_big(value: BigInt) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_big(&self) -> &BigInt {
        &self.0
    }

    #[must_use]
    pub fn into_big(self) -> BigInt {
        self.0
    }

    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    #[must_use]
    pub fn to_i128(&self) -> Option<i128> {
        self.0.to_i128()
    }

    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        self.0.to_f64()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }
}

impl FromStr for Int {
    type Err = ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigInt::from_str(s.trim()).map(Self)
    }
}

impl Mul for Int {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Neg for Int {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Int {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, x| acc + x)
    }
}

// Decimal text keeps full precision through JSON.
impl Serialize for Int {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

macro_rules! impl_from_primitive {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl From<$ty> for Int {
                fn from(n: $ty) -> Self {
                    Self(BigInt::from(n))
                }
            }
        )*
    };
}

impl_from_primitive!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);
