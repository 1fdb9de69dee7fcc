//! Query result row.
//!
//! - [`Row`]
//! - [`FromRow`]
//! - [`Index`]
//! - [`RowNotFound`]
use std::{fmt, sync::Arc};

use crate::codec::{DecodeError, FromWire, WireValue};

/// One decoded result row.
#[derive(Clone, PartialEq)]
pub struct Row {
    /// shared by every row of a cursor, empty when names are not requested
    names: Arc<[String]>,
    values: Vec<WireValue>,
}

impl Row {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<WireValue>) -> Self {
        Self { names, values }
    }

    /// Returns `true` if row contains no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Column names, empty if the query did not request them.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[WireValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<WireValue> {
        self.values
    }

    /// Get column value.
    pub fn get<I: Index>(&self, idx: I) -> Result<&WireValue, DecodeError> {
        let i = idx.position(&self.names, self.values.len())?;
        Ok(&self.values[i])
    }

    /// Try get and convert column.
    pub fn try_get<I: Index, R: FromWire>(&self, idx: I) -> Result<R, DecodeError> {
        R::from_wire(self.get(idx)?.clone())
    }

    /// Try decode type using [`FromRow`] implementation.
    pub fn decode<D: FromRow>(self) -> Result<D, DecodeError> {
        D::from_row(self)
    }
}

impl IntoIterator for Row {
    type Item = WireValue;

    type IntoIter = std::vec::IntoIter<WireValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.names.len() != self.values.len() {
            return f.debug_list().entries(&self.values).finish();
        }
        f.debug_map().entries(self.names.iter().zip(&self.values)).finish()
    }
}

// ===== Traits =====

/// Type that can be constructed from a row.
pub trait FromRow: Sized {
    /// Construct self from row.
    fn from_row(row: Row) -> Result<Self, DecodeError>;
}

impl FromRow for Row {
    fn from_row(row: Row) -> Result<Self, DecodeError> {
        Ok(row)
    }
}

impl FromRow for () {
    fn from_row(_: Row) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl FromRow for Vec<WireValue> {
    fn from_row(row: Row) -> Result<Self, DecodeError> {
        Ok(row.values)
    }
}

macro_rules! from_row_tuple {
    ($($t:ident $i:literal),*) => {
        impl<$($t),*> FromRow for ($($t),*,)
        where
            $($t: FromWire),*
        {
            fn from_row(row: Row) -> Result<Self, DecodeError> {
                let mut values = row.values.into_iter();
                Ok((
                    $($t::from_wire(values.next().ok_or(DecodeError::IndexOutOfBounds($i))?)?),*,
                ))
            }
        }
    };
}

from_row_tuple!(T0 0);
from_row_tuple!(T0 0, T1 1);
from_row_tuple!(T0 0, T1 1, T2 2);
from_row_tuple!(T0 0, T1 1, T2 2, T3 3);
from_row_tuple!(T0 0, T1 1, T2 2, T3 3, T4 4);
from_row_tuple!(T0 0, T1 1, T2 2, T3 3, T4 4, T5 5);

/// Type that can be used for indexing column.
pub trait Index: Sized + sealed::Sealed {
    /// Returns the column position.
    fn position(self, names: &[String], len: usize) -> Result<usize, DecodeError>;
}

impl Index for usize {
    fn position(self, _: &[String], len: usize) -> Result<usize, DecodeError> {
        match self < len {
            true => Ok(self),
            false => Err(DecodeError::IndexOutOfBounds(self)),
        }
    }
}

/// Column names are matched ascii case insensitively, as SQL identifiers
/// are reported upper cased.
impl Index for &str {
    fn position(self, names: &[String], _: usize) -> Result<usize, DecodeError> {
        names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(self))
            .ok_or_else(|| DecodeError::ColumnNotFound(String::from(self).into()))
    }
}

mod sealed {
    pub trait Sealed { }
    impl Sealed for usize { }
    impl Sealed for &str { }
}

/// An error when try to [`fetch_one`][crate::query::Cursor::fetch_one] and not returns any row.
pub struct RowNotFound;

impl std::error::Error for RowNotFound { }

impl fmt::Display for RowNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("row not found")
    }
}

impl fmt::Debug for RowNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row() -> Row {
        Row::new(
            Arc::from(["ID".to_owned(), "NAME".to_owned()]),
            vec![WireValue::Long(1), WireValue::Null],
        )
    }

    #[test]
    fn index_by_position_and_name() {
        let row = row();
        assert_eq!(row.try_get::<_, i64>(0).unwrap(), 1);
        assert_eq!(row.try_get::<_, i64>("id").unwrap(), 1);
        assert_eq!(row.try_get::<_, Option<String>>("name").unwrap(), None);
        assert!(matches!(row.try_get::<_, i64>(2), Err(DecodeError::IndexOutOfBounds(2))));
        assert!(matches!(row.get("age"), Err(DecodeError::ColumnNotFound(_))));
    }

    #[test]
    fn tuple_from_row() {
        let (id, name) = row().decode::<(i64, Option<String>)>().unwrap();
        assert_eq!((id, name), (1, None));
        assert!(matches!(
            row().decode::<(i64, String)>(),
            Err(DecodeError::Null)
        ));
        assert!(matches!(
            row().decode::<(i64, Option<String>, i32)>(),
            Err(DecodeError::IndexOutOfBounds(2))
        ));
    }
}
