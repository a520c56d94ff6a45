//! Reading typed values out of a parsed YAML document.
//!
//! Unlike [`serde_yaml::from_value`], errors name the path of the field they happened in, and a
//! plain scalar such as `8080` or `true` can be read as a string, just like it can when reading
//! straight from the YAML text.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! let document: serde_yaml::Value = serde_yaml::from_str("{PORT: 8080, DEBUG: true}")?;
//! let variables: BTreeMap<String, String> = workload_manifest::de::from_value(&document)?;
//! assert_eq!(variables["PORT"], "8080");
//!
//! let document: serde_yaml::Value = serde_yaml::from_str("{retries: [1, many]}")?;
//! let err = workload_manifest::de::from_value::<BTreeMap<String, Vec<u32>>>(&document)
//!     .expect_err("many is not a number");
//! assert_eq!(err.path(), "retries[1]");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
use std::{fmt::Display, iter::Enumerate, slice};

use serde::{
    Deserializer,
    de::{self, DeserializeOwned, DeserializeSeed, MapAccess, SeqAccess, Unexpected, Visitor},
    forward_to_deserialize_any,
};
use serde_yaml::{Value, mapping};
use snafu::Snafu;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// A value that does not fit the type it is read into.
#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
#[snafu(display("{}{message}", prefix(path)))]
pub struct Error {
    /// Innermost segment first
    path: Vec<Segment>,
    message: String,
}

impl Error {
    fn within(mut self, segment: Segment) -> Self {
        self.path.push(segment);
        self
    }

    /// The path of the offending field below the value that was read, e.g. `volumes.data.uid` or
    /// `topics[0]`.
    ///
    /// Empty if the value itself is invalid.
    pub fn path(&self) -> String {
        render(&self.path)
    }

    pub(crate) fn is_nested(&self) -> bool {
        !self.path.is_empty()
    }
}

fn render(path: &[Segment]) -> String {
    let mut rendered = String::new();
    for segment in path.iter().rev() {
        match segment {
            Segment::Key(key) => {
                if !rendered.is_empty() {
                    rendered.push('.');
                }
                rendered.push_str(key);
            }
            Segment::Index(index) => rendered.push_str(&format!("[{index}]")),
        }
    }
    rendered
}

fn prefix(path: &[Segment]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{}: ", render(path))
    }
}

impl de::Error for Error {
    fn custom<T: Display>(message: T) -> Self {
        Self {
            path: Vec::new(),
            message: message.to_string(),
        }
    }
}

/// Reads a `T` out of `value`.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    T::deserialize(ValueDeserializer(value))
}

/// Renders a scalar the way it reads in YAML, and anything else by its kind.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(value) => value.to_string(),
        Value::Number(value) => value.to_string(),
        Value::String(value) => value.clone(),
        Value::Sequence(_) => "a sequence".to_owned(),
        Value::Mapping(_) => "a mapping".to_owned(),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, scalar_to_string(&tagged.value)),
    }
}

struct ValueDeserializer<'a>(&'a Value);

impl<'de> Deserializer<'de> for ValueDeserializer<'_> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Mapping(mapping) => visitor.visit_map(MappingAccess {
                entries: mapping.iter(),
                current: None,
            }),
            Value::Sequence(sequence) => visitor.visit_seq(SequenceAccess {
                items: sequence.iter().enumerate(),
            }),
            scalar => scalar
                .clone()
                .deserialize_any(visitor)
                .map_err(de::Error::custom),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Bool(_) | Value::Number(_) => visitor.visit_string(scalar_to_string(self.0)),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_string(visitor)
    }

    // Keys like `1:` name a field "1", not the field at index 1.
    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_string(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.0
            .clone()
            .deserialize_enum(name, variants, visitor)
            .map_err(de::Error::custom)
    }

    // A struct is always written as a mapping.
    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        match self.0 {
            Value::Sequence(_) => Err(de::Error::invalid_type(Unexpected::Seq, &visitor)),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char bytes byte_buf unit unit_struct
        seq tuple tuple_struct map
    }
}

struct MappingAccess<'a> {
    entries: mapping::Iter<'a>,
    current: Option<(&'a Value, &'a Value)>,
}

impl<'de> MapAccess<'de> for MappingAccess<'_> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        self.current = Some((key, value));
        seed.deserialize(ValueDeserializer(key)).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
        let (key, value) = self
            .current
            .take()
            .ok_or_else(|| de::Error::custom("value requested before its key"))?;
        seed.deserialize(ValueDeserializer(value))
            .map_err(|err| err.within(Segment::Key(scalar_to_string(key))))
    }
}

struct SequenceAccess<'a> {
    items: Enumerate<slice::Iter<'a, Value>>,
}

impl<'de> SeqAccess<'de> for SequenceAccess<'_> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Error> {
        let Some((index, item)) = self.items.next() else {
            return Ok(None);
        };
        seed.deserialize(ValueDeserializer(item))
            .map(Some)
            .map_err(|err| err.within(Segment::Index(index)))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}
