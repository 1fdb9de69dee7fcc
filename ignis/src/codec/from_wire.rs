use uuid::Uuid;

use super::{ComplexObject, Date, DecodeError, Time, Timestamp, TypeCode, WireValue};

/// A type that can be constructed from [`WireValue`].
///
/// Conversion is strict, `Int` does not convert to [`i64`]. A `Null` value
/// converts only into [`Option`], [`WireValue`] or `()`.
pub trait FromWire: Sized {
    /// Try convert self from a decoded value.
    fn from_wire(value: WireValue) -> Result<Self, DecodeError>;
}

impl FromWire for WireValue {
    fn from_wire(value: WireValue) -> Result<Self, DecodeError> {
        Ok(value)
    }
}

impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(value: WireValue) -> Result<Self, DecodeError> {
        match value {
            WireValue::Null => Ok(None),
            value => T::from_wire(value).map(Some),
        }
    }
}

impl FromWire for () {
    fn from_wire(_: WireValue) -> Result<Self, DecodeError> {
        Ok(())
    }
}

macro_rules! from_wire {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromWire for $ty {
                fn from_wire(value: WireValue) -> Result<Self, DecodeError> {
                    match value {
                        WireValue::$variant(v) => Ok(v),
                        WireValue::Null => Err(DecodeError::Null),
                        other => Err(DecodeError::unexpected(TypeCode::$variant, other.type_code())),
                    }
                }
            }
        )*
    };
}

from_wire! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    u16 => Char,
    bool => Bool,
    String => String,
    Uuid => Uuid,
    Date => Date,
    Time => Time,
    Timestamp => Timestamp,
    Vec<i8> => ByteArray,
    Vec<i16> => ShortArray,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    Vec<f32> => FloatArray,
    Vec<f64> => DoubleArray,
    Vec<u16> => CharArray,
    Vec<bool> => BoolArray,
    Vec<Option<String>> => StringArray,
    Vec<Option<Uuid>> => UuidArray,
    Vec<Option<Date>> => DateArray,
    Vec<Option<Timestamp>> => TimestampArray,
    Vec<Option<Time>> => TimeArray,
    ComplexObject => Complex,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strict_conversion() {
        assert_eq!(i32::from_wire(WireValue::Int(4)).unwrap(), 4);
        assert!(matches!(
            i64::from_wire(WireValue::Int(4)),
            Err(DecodeError::UnexpectedType { expected: TypeCode::Long, found: TypeCode::Int })
        ));
    }

    #[test]
    fn null_handling() {
        assert!(matches!(String::from_wire(WireValue::Null), Err(DecodeError::Null)));
        assert_eq!(Option::<String>::from_wire(WireValue::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_wire(WireValue::from("x")).unwrap().as_deref(),
            Some("x")
        );
    }
}
