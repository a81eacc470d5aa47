//! Lenient descriptor values.
//!
//! Query descriptors leave most properties unspecified. An unspecified
//! property matches anything; a specified one must compare equal. `Lenient`
//! makes that distinction explicit instead of overloading `Option`.
//!
//! On the wire a `Lenient<T>` is just an optional `T`: `null` or an absent
//! field (with `#[serde(default)]`) is `Any`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A descriptor property that either accepts anything or one exact value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Lenient<T> {
    /// Unspecified: accepts every value.
    Any,
    /// Specified: accepts only values equal to this one.
    Exact(T),
}

impl<T> Lenient<T> {
    /// A specified property.
    pub fn exact(value: impl Into<T>) -> Self {
        Lenient::Exact(value.into())
    }

    /// True if the property is unspecified.
    pub fn is_any(&self) -> bool {
        matches!(self, Lenient::Any)
    }

    /// The specified value, if any.
    pub fn as_exact(&self) -> Option<&T> {
        match self {
            Lenient::Any => None,
            Lenient::Exact(value) => Some(value),
        }
    }

    /// Lenient equality against an actual value.
    pub fn accepts<U>(&self, actual: &U) -> bool
    where
        T: PartialEq<U>,
        U: ?Sized,
    {
        match self {
            Lenient::Any => true,
            Lenient::Exact(expected) => expected == actual,
        }
    }

    /// Lenient comparison with a custom predicate.
    pub fn accepts_by<F>(&self, predicate: F) -> bool
    where
        F: FnOnce(&T) -> bool,
    {
        match self {
            Lenient::Any => true,
            Lenient::Exact(expected) => predicate(expected),
        }
    }
}

impl<T> Default for Lenient<T> {
    fn default() -> Self {
        Lenient::Any
    }
}

impl<T> From<Option<T>> for Lenient<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            None => Lenient::Any,
            Some(v) => Lenient::Exact(v),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Lenient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lenient::Any => write!(f, "*"),
            Lenient::Exact(value) => write!(f, "{:?}", value),
        }
    }
}

impl<T: Serialize> Serialize for Lenient<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Lenient::Any => serializer.serialize_none(),
            Lenient::Exact(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Lenient::from)
    }
}
