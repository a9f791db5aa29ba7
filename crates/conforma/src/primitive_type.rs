use serde_json::Value;
use std::{convert::TryFrom, fmt, ops::BitOrAssign};

/// For faster error handling in "type" keyword validator we have this enum, to match
/// with it instead of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Array => f.write_str("array"),
            PrimitiveType::Boolean => f.write_str("boolean"),
            PrimitiveType::Integer => f.write_str("integer"),
            PrimitiveType::Null => f.write_str("null"),
            PrimitiveType::Number => f.write_str("number"),
            PrimitiveType::Object => f.write_str("object"),
            PrimitiveType::String => f.write_str("string"),
        }
    }
}

impl TryFrom<&str> for PrimitiveType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "array" => Ok(PrimitiveType::Array),
            "boolean" => Ok(PrimitiveType::Boolean),
            "integer" => Ok(PrimitiveType::Integer),
            "null" => Ok(PrimitiveType::Null),
            "number" => Ok(PrimitiveType::Number),
            "object" => Ok(PrimitiveType::Object),
            "string" => Ok(PrimitiveType::String),
            _ => Err(()),
        }
    }
}

impl PrimitiveType {
    pub(crate) fn of(instance: &Value) -> PrimitiveType {
        match instance {
            Value::Null => PrimitiveType::Null,
            Value::Bool(_) => PrimitiveType::Boolean,
            Value::Number(number) => {
                if number.is_f64() {
                    PrimitiveType::Number
                } else {
                    PrimitiveType::Integer
                }
            }
            Value::String(_) => PrimitiveType::String,
            Value::Array(_) => PrimitiveType::Array,
            Value::Object(_) => PrimitiveType::Object,
        }
    }

    const fn to_index(self) -> usize {
        match self {
            PrimitiveType::Array => 0,
            PrimitiveType::Boolean => 1,
            PrimitiveType::Integer => 2,
            PrimitiveType::Null => 3,
            PrimitiveType::Number => 4,
            PrimitiveType::Object => 5,
            PrimitiveType::String => 6,
        }
    }

    const fn from_index(index: usize) -> Option<PrimitiveType> {
        match index {
            0 => Some(PrimitiveType::Array),
            1 => Some(PrimitiveType::Boolean),
            2 => Some(PrimitiveType::Integer),
            3 => Some(PrimitiveType::Null),
            4 => Some(PrimitiveType::Number),
            5 => Some(PrimitiveType::Object),
            6 => Some(PrimitiveType::String),
            _ => None,
        }
    }
}

/// A set of primitive types packed into one byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimitiveTypesBitMap {
    inner: u8,
}

impl PrimitiveTypesBitMap {
    pub(crate) const fn new() -> Self {
        PrimitiveTypesBitMap { inner: 0 }
    }

    #[must_use]
    pub(crate) const fn add_type(mut self, primitive_type: PrimitiveType) -> Self {
        self.inner |= 1 << primitive_type.to_index();
        self
    }

    /// Whether the set contains `primitive_type`.
    #[must_use]
    pub const fn contains_type(self, primitive_type: PrimitiveType) -> bool {
        1 << primitive_type.to_index() & self.inner != 0
    }

    /// The types in the set, in name order.
    pub fn iter(self) -> impl Iterator<Item = PrimitiveType> {
        (0..7).filter_map(move |index| {
            if self.inner & (1 << index) != 0 {
                PrimitiveType::from_index(index)
            } else {
                None
            }
        })
    }

    pub(crate) fn len(self) -> usize {
        self.inner.count_ones() as usize
    }
}

impl BitOrAssign<PrimitiveType> for PrimitiveTypesBitMap {
    fn bitor_assign(&mut self, rhs: PrimitiveType) {
        *self = self.add_type(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::{PrimitiveType, PrimitiveTypesBitMap};
    use std::convert::TryFrom;
    use test_case::test_case;

    #[test]
    fn bit_map_membership() {
        let map = PrimitiveTypesBitMap::new()
            .add_type(PrimitiveType::Integer)
            .add_type(PrimitiveType::String);
        assert!(map.contains_type(PrimitiveType::Integer));
        assert!(map.contains_type(PrimitiveType::String));
        assert!(!map.contains_type(PrimitiveType::Null));
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![PrimitiveType::Integer, PrimitiveType::String]
        );
    }

    #[test_case("array")]
    #[test_case("boolean")]
    #[test_case("integer")]
    #[test_case("null")]
    #[test_case("number")]
    #[test_case("object")]
    #[test_case("string")]
    fn round_trips_names(name: &str) {
        let parsed = PrimitiveType::try_from(name).expect("known type");
        assert_eq!(parsed.to_string(), name);
    }
}
