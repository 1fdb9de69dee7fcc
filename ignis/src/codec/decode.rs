use bytes::{Buf, Bytes};

use super::{Date, DecodeError, FromWire, Time, Timestamp, TypeCode, WireValue, complex, uuid};
use crate::ext::BytesExt;

/// Read one tagged value from `buf`.
pub fn decode(buf: &mut Bytes) -> Result<WireValue, DecodeError> {
    let code = TypeCode::try_from(buf.try_get_u8()?)?;
    decode_untagged(code, buf)
}

/// Read the body of a value whose discriminator is already known.
pub fn decode_untagged(code: TypeCode, buf: &mut Bytes) -> Result<WireValue, DecodeError> {
    use WireValue as V;

    let value = match code {
        TypeCode::Byte => V::Byte(buf.try_get_i8()?),
        TypeCode::Short => V::Short(buf.try_get_i16_le()?),
        TypeCode::Int => V::Int(buf.try_get_i32_le()?),
        TypeCode::Long => V::Long(buf.try_get_i64_le()?),
        TypeCode::Float => V::Float(buf.try_get_f32_le()?),
        TypeCode::Double => V::Double(buf.try_get_f64_le()?),
        TypeCode::Char => V::Char(buf.try_get_u16_le()?),
        TypeCode::Bool => V::Bool(buf.try_get_u8()? != 0),
        TypeCode::String => V::String(get_str(buf)?),
        TypeCode::Uuid => V::Uuid(get_uuid(buf)?),
        TypeCode::Date => V::Date(Date::from_millis(buf.try_get_i64_le()?)),
        TypeCode::Time => V::Time(Time::from_millis(buf.try_get_i64_le()?)),
        TypeCode::Timestamp => V::Timestamp(get_timestamp(buf)?),

        TypeCode::ByteArray => V::ByteArray(get_array(buf, size_of::<i8>(), |b| b.try_get_i8())?),
        TypeCode::ShortArray => V::ShortArray(get_array(buf, size_of::<i16>(), |b| b.try_get_i16_le())?),
        TypeCode::IntArray => V::IntArray(get_array(buf, size_of::<i32>(), |b| b.try_get_i32_le())?),
        TypeCode::LongArray => V::LongArray(get_array(buf, size_of::<i64>(), |b| b.try_get_i64_le())?),
        TypeCode::FloatArray => V::FloatArray(get_array(buf, size_of::<f32>(), |b| b.try_get_f32_le())?),
        TypeCode::DoubleArray => V::DoubleArray(get_array(buf, size_of::<f64>(), |b| b.try_get_f64_le())?),
        TypeCode::CharArray => V::CharArray(get_array(buf, size_of::<u16>(), |b| b.try_get_u16_le())?),
        TypeCode::BoolArray => V::BoolArray(get_array(buf, 1, |b| b.try_get_u8().map(|e| e != 0))?),

        TypeCode::StringArray => V::StringArray(get_tagged_array(buf, TypeCode::String, get_str)?),
        TypeCode::UuidArray => V::UuidArray(get_tagged_array(buf, TypeCode::Uuid, get_uuid)?),
        TypeCode::DateArray => V::DateArray(get_tagged_array(buf, TypeCode::Date, |b| {
            Ok(Date::from_millis(b.try_get_i64_le()?))
        })?),
        TypeCode::TimestampArray => V::TimestampArray(get_tagged_array(buf, TypeCode::Timestamp, get_timestamp)?),
        TypeCode::TimeArray => V::TimeArray(get_tagged_array(buf, TypeCode::Time, |b| {
            Ok(Time::from_millis(b.try_get_i64_le()?))
        })?),

        TypeCode::Complex => V::Complex(complex::decode_body(buf)?),
        TypeCode::Null => V::Null,
    };

    Ok(value)
}

/// Read one tagged value and convert it with [`FromWire`].
pub fn decode_as<T: FromWire>(buf: &mut Bytes) -> Result<T, DecodeError> {
    T::from_wire(decode(buf)?)
}

/// Read a tagged value which must be of type `expected` or null.
///
/// Unlike [`decode_as`], mismatched discriminator is reported before the value
/// body is consumed.
pub fn decode_expect(expected: TypeCode, buf: &mut Bytes) -> Result<Option<WireValue>, DecodeError> {
    let Some(&found) = buf.chunk().first() else {
        return Err(DecodeError::Truncated { requested: 1, available: 0 });
    };
    let found = TypeCode::try_from(found)?;
    if found == TypeCode::Null {
        buf.advance(1);
        return Ok(None);
    }
    if found != expected {
        return Err(DecodeError::unexpected(expected, found));
    }
    buf.advance(1);
    decode_untagged(found, buf).map(Some)
}

/// Read a tagged string or a tagged null.
pub fn read_string(buf: &mut Bytes) -> Result<Option<String>, DecodeError> {
    match decode_expect(TypeCode::String, buf)? {
        Some(WireValue::String(s)) => Ok(Some(s)),
        Some(_) => Err(DecodeError::Malformed("string decoded as other type")),
        None => Ok(None),
    }
}

fn get_str(buf: &mut Bytes) -> Result<String, DecodeError> {
    let len = buf.try_get_len()?;
    let bytes = buf.try_split_to(len)?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn get_uuid(buf: &mut Bytes) -> Result<::uuid::Uuid, DecodeError> {
    let mut wire = [0u8; 16];
    buf.try_copy_to_slice(&mut wire)?;
    Ok(uuid::from_wire(wire))
}

fn get_timestamp(buf: &mut Bytes) -> Result<Timestamp, DecodeError> {
    let millis = buf.try_get_i64_le()?;
    let nanos = buf.try_get_i32_le()?;
    let nanos = u32::try_from(nanos).map_err(|_| DecodeError::Malformed("negative timestamp nanos"))?;
    Timestamp::new(millis, nanos).map_err(|_| DecodeError::Malformed("timestamp nanos out of range"))
}

/// Elements are untagged, their type is implied by the array.
fn get_array<T, E>(
    buf: &mut Bytes,
    width: usize,
    mut get: impl FnMut(&mut Bytes) -> Result<T, E>,
) -> Result<Vec<T>, DecodeError>
where
    DecodeError: From<E>,
{
    let len = buf.try_get_len()?;
    let needed = len.saturating_mul(width);
    if buf.remaining() < needed {
        return Err(DecodeError::Truncated { requested: needed, available: buf.remaining() });
    }
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(get(buf)?);
    }
    Ok(items)
}

/// Every element carries its own discriminator, `code` or null.
fn get_tagged_array<T>(
    buf: &mut Bytes,
    code: TypeCode,
    mut get: impl FnMut(&mut Bytes) -> Result<T, DecodeError>,
) -> Result<Vec<Option<T>>, DecodeError> {
    let len = buf.try_get_len()?;
    // at least one tag byte per element
    let mut items = Vec::with_capacity(len.min(buf.remaining()));
    for _ in 0..len {
        let found = TypeCode::try_from(buf.try_get_u8()?)?;
        let item = match found {
            TypeCode::Null => None,
            found if found == code => Some(get(buf)?),
            found => return Err(DecodeError::unexpected(code, found)),
        };
        items.push(item);
    }
    Ok(items)
}
