//! Named field record.
//!
//! ```text
//! ┏━━━━━┳━━━━━━━━━┳━━━━━━━┳━━━━━━━━┳━━━━━━┳━━━━━━━━┳━━━━━━━━━━━━━━━┳━━━━━━━┳━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓
//! ┃ Tag ┃ Version ┃ Flags ┃ TypeId ┃ Hash ┃ Length ┃ Type name     ┃ Count ┃ (FieldId, Name, Value) * N ┃
//! ┣━━━━━╋━━━━━━━━━╋━━━━━━━╋━━━━━━━━╋━━━━━━╋━━━━━━━━╋━━━━━━━━━━━━━━━╋━━━━━━━╋━━━━━━━━━━━━━━━━━━━━━━━━━━━━┫
//! ┃ 103 ┃   u8    ┃  u16  ┃  i32   ┃ i32  ┃  i32   ┃ tagged string ┃  i32  ┃ i32, tagged string, tagged ┃
//! ┗━━━━━┻━━━━━━━━━┻━━━━━━━┻━━━━━━━━┻━━━━━━┻━━━━━━━━┻━━━━━━━━━━━━━━━┻━━━━━━━┻━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛
//! ```
//!
//! - `TypeId` and `FieldId` are [`name_id`] of the names.
//! - `Hash` is [`hash_bytes`] over the field section.
//! - `Length` counts every byte from `Version` to the end of the object.
//!
//! The layout carries field names inline so a record round trips between two
//! clients without a metadata registry. It does not reproduce the server
//! native object header (schema id, schema footer, field offsets).
use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{DecodeError, EncodeError, FromWire, WireValue, decode, encode};
use crate::{
    ext::{BytesExt, UsizeExt},
    hash::{hash_bytes, name_id},
};

const VERSION: u8 = 1;

pub const FLAG_USER_TYPE: u16 = 0x0001;
pub const FLAG_HAS_SCHEMA: u16 = 0x0002;

// version + flags + type id + hash + length
const HEADER_LEN: usize = 1 + 2 + 4 + 4 + 4;

/// A type name plus ordered named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexObject {
    type_name: String,
    fields: Vec<(String, WireValue)>,
}

impl ComplexObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), fields: Vec::new() }
    }

    /// Builder style [`ComplexObject::set`].
    pub fn field(mut self, name: impl Into<String>, value: impl Into<WireValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set field value, replacing existing field with the same name in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<WireValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn type_id(&self) -> i32 {
        name_id(&self.type_name)
    }

    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get and convert a field value.
    pub fn try_get<T: FromWire>(&self, name: &str) -> Result<T, DecodeError> {
        match self.get(name) {
            Some(value) => T::from_wire(value.clone()),
            None => Err(DecodeError::ColumnNotFound(String::from(name).into())),
        }
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub(crate) fn encode_body(obj: &ComplexObject, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let offset = buf.len();

    buf.put_u8(VERSION);
    buf.put_u16_le(FLAG_USER_TYPE | FLAG_HAS_SCHEMA);
    buf.put_i32_le(obj.type_id());
    let hash_at = buf.len();
    buf.put_i32_le(0);
    let len_at = buf.len();
    buf.put_i32_le(0);

    super::put_nullable_str(Some(&obj.type_name), buf)?;
    buf.put_i32_le(obj.fields.len().to_wire_len("complex object fields")?);

    let fields_at = buf.len();
    for (name, value) in &obj.fields {
        buf.put_i32_le(name_id(name));
        super::put_nullable_str(Some(name), buf)?;
        encode(value, true, buf)?;
    }

    let hash = hash_bytes(&buf[fields_at..]);
    let len = (buf.len() - offset).to_wire_len("complex object")?;
    buf[hash_at..hash_at + 4].copy_from_slice(&hash.to_le_bytes());
    buf[len_at..len_at + 4].copy_from_slice(&len.to_le_bytes());

    Ok(())
}

pub(crate) fn decode_body(buf: &mut Bytes) -> Result<ComplexObject, DecodeError> {
    let version = buf.try_get_u8()?;
    if version != VERSION {
        return Err(DecodeError::Malformed("unsupported complex object version"));
    }
    let _flags = buf.try_get_u16_le()?;
    let type_id = buf.try_get_i32_le()?;
    let hash = buf.try_get_i32_le()?;
    let len = buf.try_get_len()?;

    let Some(body_len) = len.checked_sub(HEADER_LEN) else {
        return Err(DecodeError::Malformed("complex object length shorter than header"));
    };
    let mut body = buf.try_split_to(body_len)?;

    let type_name = super::read_string(&mut body)?
        .ok_or(DecodeError::Malformed("complex object without type name"))?;
    if name_id(&type_name) != type_id {
        return Err(DecodeError::Malformed("complex object type id mismatch"));
    }

    let count = body.try_get_len()?;
    if hash_bytes(body.chunk()) != hash {
        return Err(DecodeError::Malformed("complex object hash mismatch"));
    }

    let mut fields = Vec::with_capacity(count.min(body.remaining()));
    for _ in 0..count {
        let field_id = body.try_get_i32_le()?;
        let name = super::read_string(&mut body)?
            .ok_or(DecodeError::Malformed("complex object field without name"))?;
        if name_id(&name) != field_id {
            return Err(DecodeError::Malformed("complex object field id mismatch"));
        }
        let value = decode(&mut body)?;
        fields.push((name, value));
    }

    if body.has_remaining() {
        return Err(DecodeError::Malformed("trailing bytes in complex object"));
    }

    Ok(ComplexObject { type_name, fields })
}
