//! Primary-key values.

use crate::error::{OrmError, OrmResult};
use crate::metadata::FieldType;
use minorm_driver::{FromValue, Value};
use std::fmt;
use uuid::Uuid;

/// The primary-key value of a persisted record.
///
/// Keys identify a row within its table and a record within the cache.
/// A key is always normalised to the declared primary-key type of its
/// entity (see [`Key::for_type`]), so the same row yields the same key
/// whether it was read from the database or from a live record.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// A database-generated sequential key.
    Integer(i64),
    /// A client-generated UUID key.
    Uuid(Uuid),
    /// Any other client-supplied key.
    Text(String),
}

impl Key {
    /// Normalises `value` to a key of `field_type`.
    ///
    /// Returns `None` for SQL `NULL`, which marks a record as unsaved.
    pub fn for_type(field_type: &FieldType, value: Value) -> OrmResult<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }
        let key = match field_type {
            FieldType::Int | FieldType::Long => Self::Integer(i64::from_value(value)?),
            FieldType::Uuid => Self::Uuid(Uuid::from_value(value)?),
            _ => Self::Text(String::from_value(value)?),
        };
        Ok(Some(key))
    }

    /// Re-normalises this key to `field_type`.
    pub fn coerce(self, field_type: &FieldType) -> OrmResult<Self> {
        let shown = self.to_string();
        Self::for_type(field_type, self.to_value())?
            .ok_or_else(|| OrmError::invalid_operation(format!("key {shown} is null")))
    }

    /// Converts the key into a bindable value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Integer(v) => Value::Integer(*v),
            Self::Uuid(v) => Value::Uuid(*v),
            Self::Text(v) => Value::Text(v.clone()),
        }
    }

    /// Returns the integer key, if this is one.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the UUID key, if this is one.
    #[must_use]
    pub const fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({self})")
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<Uuid> for Key {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        key.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_no_key() {
        assert_eq!(Key::for_type(&FieldType::Long, Value::Null).unwrap(), None);
    }

    #[test]
    fn integers_normalise_from_text() {
        let key = Key::for_type(&FieldType::Int, Value::Text("12".into())).unwrap();
        assert_eq!(key, Some(Key::Integer(12)));
    }

    #[test]
    fn uuid_keys_parse_from_text() {
        let id = Uuid::new_v4();
        let key = Key::for_type(&FieldType::Uuid, Value::Text(id.to_string())).unwrap();
        assert_eq!(key, Some(Key::Uuid(id)));
    }

    #[test]
    fn coerce_text_to_uuid() {
        let id = Uuid::new_v4();
        let key = Key::from(id.to_string()).coerce(&FieldType::Uuid).unwrap();
        assert_eq!(key.as_uuid(), Some(id));
    }

    #[test]
    fn display() {
        assert_eq!(Key::from(7_i64).to_string(), "7");
        assert_eq!(format!("{:?}", Key::from("abc")), "Key(abc)");
    }
}
