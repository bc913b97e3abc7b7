//! Scalar payloads carried by `Value` events and value leaves.

use alloc::{string::String, vec::Vec};
use core::fmt;

use bstr::ByteSlice;

/// The literal data of a value event or value leaf.
///
/// # Examples
///
/// ```
/// use nodestream::Scalar;
///
/// assert_eq!(Scalar::from("Ada"), Scalar::String("Ada".into()));
/// assert_eq!(Scalar::from(3_i64).to_string(), "3");
/// assert!(Scalar::default().is_null());
/// ```
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Returns `true` if the scalar is [`Null`](Scalar::Null).
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text if this scalar is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Returns the boolean if this scalar is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Returns the integer if this scalar is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if let Self::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

macro_rules! impl_from_int_for_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(i: $t) -> Self {
                    Scalar::Integer(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int_for_scalar!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Boolean(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
            Scalar::Bytes(b) => write!(f, "{}", b.as_bstr()),
        }
    }
}
