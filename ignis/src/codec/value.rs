use uuid::Uuid;

use super::{ComplexObject, Date, Time, Timestamp, TypeCode};

/// A dynamically typed value as carried on the wire.
///
/// There is exactly one variant per [`TypeCode`] in the registry.
///
/// Arrays of string, uuid and temporal values carry individually tagged
/// elements on the wire, thus their elements are nullable.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// utf16 code unit
    Char(u16),
    Bool(bool),
    String(String),
    Uuid(Uuid),
    Date(Date),
    ByteArray(Vec<i8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    CharArray(Vec<u16>),
    BoolArray(Vec<bool>),
    StringArray(Vec<Option<String>>),
    UuidArray(Vec<Option<Uuid>>),
    DateArray(Vec<Option<Date>>),
    Timestamp(Timestamp),
    TimestampArray(Vec<Option<Timestamp>>),
    Time(Time),
    TimeArray(Vec<Option<Time>>),
    Complex(ComplexObject),
    Null,
}

impl WireValue {
    /// Returns the type discriminator of this value.
    pub const fn type_code(&self) -> TypeCode {
        match self {
            Self::Byte(_) => TypeCode::Byte,
            Self::Short(_) => TypeCode::Short,
            Self::Int(_) => TypeCode::Int,
            Self::Long(_) => TypeCode::Long,
            Self::Float(_) => TypeCode::Float,
            Self::Double(_) => TypeCode::Double,
            Self::Char(_) => TypeCode::Char,
            Self::Bool(_) => TypeCode::Bool,
            Self::String(_) => TypeCode::String,
            Self::Uuid(_) => TypeCode::Uuid,
            Self::Date(_) => TypeCode::Date,
            Self::ByteArray(_) => TypeCode::ByteArray,
            Self::ShortArray(_) => TypeCode::ShortArray,
            Self::IntArray(_) => TypeCode::IntArray,
            Self::LongArray(_) => TypeCode::LongArray,
            Self::FloatArray(_) => TypeCode::FloatArray,
            Self::DoubleArray(_) => TypeCode::DoubleArray,
            Self::CharArray(_) => TypeCode::CharArray,
            Self::BoolArray(_) => TypeCode::BoolArray,
            Self::StringArray(_) => TypeCode::StringArray,
            Self::UuidArray(_) => TypeCode::UuidArray,
            Self::DateArray(_) => TypeCode::DateArray,
            Self::Timestamp(_) => TypeCode::Timestamp,
            Self::TimestampArray(_) => TypeCode::TimestampArray,
            Self::Time(_) => TypeCode::Time,
            Self::TimeArray(_) => TypeCode::TimeArray,
            Self::Complex(_) => TypeCode::Complex,
            Self::Null => TypeCode::Null,
        }
    }

    /// Return `true` if value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

macro_rules! from {
    ($ty:ty => $variant:ident) => {
        impl From<$ty> for WireValue {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        }
    };
}

from!(i8 => Byte);
from!(i16 => Short);
from!(i32 => Int);
from!(i64 => Long);
from!(f32 => Float);
from!(f64 => Double);
from!(u16 => Char);
from!(bool => Bool);
from!(String => String);
from!(Uuid => Uuid);
from!(Date => Date);
from!(Time => Time);
from!(Timestamp => Timestamp);
from!(Vec<i8> => ByteArray);
from!(Vec<i16> => ShortArray);
from!(Vec<i32> => IntArray);
from!(Vec<i64> => LongArray);
from!(Vec<f32> => FloatArray);
from!(Vec<f64> => DoubleArray);
from!(Vec<u16> => CharArray);
from!(Vec<bool> => BoolArray);
from!(Vec<Option<String>> => StringArray);
from!(Vec<Option<Uuid>> => UuidArray);
from!(Vec<Option<Date>> => DateArray);
from!(Vec<Option<Timestamp>> => TimestampArray);
from!(Vec<Option<Time>> => TimeArray);
from!(ComplexObject => Complex);

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl<T: Into<WireValue>> From<Option<T>> for WireValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

impl From<()> for WireValue {
    fn from(_: ()) -> Self {
        Self::Null
    }
}
