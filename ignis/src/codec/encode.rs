use bytes::{BufMut, Bytes, BytesMut};

use super::{EncodeError, TypeCode, WireValue, complex, uuid};
use crate::ext::UsizeExt;

/// Write `value` to `buf`.
///
/// When `tagged` is `false`, the type discriminator is omitted. Untagged form
/// is used for fixed schema fields and array elements, where the type is known
/// by the reader beforehand.
pub fn encode(value: &WireValue, tagged: bool, buf: &mut BytesMut) -> Result<(), EncodeError> {
    use WireValue::*;

    if tagged {
        buf.put_u8(value.type_code().as_u8());
    }

    match value {
        Byte(v) => buf.put_i8(*v),
        Short(v) => buf.put_i16_le(*v),
        Int(v) => buf.put_i32_le(*v),
        Long(v) => buf.put_i64_le(*v),
        Float(v) => buf.put_f32_le(*v),
        Double(v) => buf.put_f64_le(*v),
        Char(v) => buf.put_u16_le(*v),
        Bool(v) => buf.put_u8(u8::from(*v)),
        String(v) => put_str(v, buf)?,
        Uuid(v) => buf.put_slice(&uuid::to_wire(v)),
        Date(v) => buf.put_i64_le(v.millis()),
        Time(v) => buf.put_i64_le(v.millis()),
        Timestamp(v) => {
            buf.put_i64_le(v.millis());
            buf.put_i32_le(v.nanos() as i32);
        }

        ByteArray(v) => put_array(v, buf, |e, buf| buf.put_i8(*e))?,
        ShortArray(v) => put_array(v, buf, |e, buf| buf.put_i16_le(*e))?,
        IntArray(v) => put_array(v, buf, |e, buf| buf.put_i32_le(*e))?,
        LongArray(v) => put_array(v, buf, |e, buf| buf.put_i64_le(*e))?,
        FloatArray(v) => put_array(v, buf, |e, buf| buf.put_f32_le(*e))?,
        DoubleArray(v) => put_array(v, buf, |e, buf| buf.put_f64_le(*e))?,
        CharArray(v) => put_array(v, buf, |e, buf| buf.put_u16_le(*e))?,
        BoolArray(v) => put_array(v, buf, |e, buf| buf.put_u8(u8::from(*e)))?,

        StringArray(v) => put_tagged_array(v, TypeCode::String, buf, |e, buf| put_str(e, buf))?,
        UuidArray(v) => put_tagged_array(v, TypeCode::Uuid, buf, |e, buf| {
            buf.put_slice(&uuid::to_wire(e));
            Ok(())
        })?,
        DateArray(v) => put_tagged_array(v, TypeCode::Date, buf, |e, buf| {
            buf.put_i64_le(e.millis());
            Ok(())
        })?,
        TimestampArray(v) => put_tagged_array(v, TypeCode::Timestamp, buf, |e, buf| {
            buf.put_i64_le(e.millis());
            buf.put_i32_le(e.nanos() as i32);
            Ok(())
        })?,
        TimeArray(v) => put_tagged_array(v, TypeCode::Time, buf, |e, buf| {
            buf.put_i64_le(e.millis());
            Ok(())
        })?,

        Complex(v) => complex::encode_body(v, buf)?,
        Null => { }
    }

    Ok(())
}

/// Encode `value` into a new buffer.
pub fn to_bytes(value: &WireValue, tagged: bool) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::new();
    encode(value, tagged, &mut buf)?;
    Ok(buf.freeze())
}

/// Write a tagged string, or a tagged null.
pub(crate) fn put_nullable_str(
    value: Option<&str>,
    buf: &mut BytesMut,
) -> Result<(), EncodeError> {
    match value {
        Some(value) => {
            buf.put_u8(TypeCode::String.as_u8());
            put_str(value, buf)
        }
        None => {
            buf.put_u8(TypeCode::Null.as_u8());
            Ok(())
        }
    }
}

/// Length is the byte count, not character count.
fn put_str(value: &str, buf: &mut BytesMut) -> Result<(), EncodeError> {
    buf.put_i32_le(value.len().to_wire_len("string")?);
    buf.put_slice(value.as_bytes());
    Ok(())
}

fn put_array<T>(
    items: &[T],
    buf: &mut BytesMut,
    mut put: impl FnMut(&T, &mut BytesMut),
) -> Result<(), EncodeError> {
    buf.put_i32_le(items.len().to_wire_len("array")?);
    for item in items {
        put(item, buf);
    }
    Ok(())
}

fn put_tagged_array<T>(
    items: &[Option<T>],
    code: TypeCode,
    buf: &mut BytesMut,
    mut put: impl FnMut(&T, &mut BytesMut) -> Result<(), EncodeError>,
) -> Result<(), EncodeError> {
    buf.put_i32_le(items.len().to_wire_len("array")?);
    for item in items {
        match item {
            Some(item) => {
                buf.put_u8(code.as_u8());
                put(item, buf)?;
            }
            None => buf.put_u8(TypeCode::Null.as_u8()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::Timestamp;

    #[test]
    fn scalar_layout() {
        assert_eq!(&to_bytes(&WireValue::Int(1), true).unwrap()[..], [3, 1, 0, 0, 0]);
        assert_eq!(&to_bytes(&WireValue::Int(1), false).unwrap()[..], [1, 0, 0, 0]);
        assert_eq!(&to_bytes(&WireValue::Char(0x41), true).unwrap()[..], [7, 0x41, 0]);
        assert_eq!(&to_bytes(&WireValue::Bool(true), true).unwrap()[..], [8, 1]);
        assert_eq!(&to_bytes(&WireValue::Null, true).unwrap()[..], [101]);
    }

    #[test]
    fn string_length_is_byte_count() {
        let bytes = to_bytes(&WireValue::from("é"), true).unwrap();
        assert_eq!(&bytes[..], [9, 2, 0, 0, 0, 0xC3, 0xA9]);
        let empty = to_bytes(&WireValue::from(""), true).unwrap();
        assert_eq!(&empty[..], [9, 0, 0, 0, 0]);
    }

    #[test]
    fn timestamp_layout() {
        let ts = Timestamp::new(2, 5).unwrap();
        let bytes = to_bytes(&WireValue::Timestamp(ts), true).unwrap();
        assert_eq!(&bytes[..], [33, 2, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0]);
    }

    #[test]
    fn primitive_array_elements_untagged() {
        let bytes = to_bytes(&WireValue::ShortArray(vec![1, 2]), true).unwrap();
        assert_eq!(&bytes[..], [13, 2, 0, 0, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn string_array_elements_tagged() {
        let value = WireValue::StringArray(vec![Some("a".into()), None]);
        let bytes = to_bytes(&value, true).unwrap();
        assert_eq!(&bytes[..], [20, 2, 0, 0, 0, 9, 1, 0, 0, 0, b'a', 101]);
    }
}
