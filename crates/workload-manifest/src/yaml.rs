//! Rendering manifests and effective configurations as YAML
use std::io::Write;

use serde::Serialize;
use serde_yaml::Value;
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered during YAML serialization.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Provides configurable options during YAML serialization.
///
/// The default renders an explicit document without any unset fields, which is what a human
/// reading an effective configuration wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to the output string.
    pub explicit_document: bool,

    /// Leaves out mapping entries that are null, as well as mappings that end up empty.
    pub omit_unset: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            explicit_document: true,
            omit_unset: true,
        }
    }
}

/// Serializes the given data structure and writes it to a [`Writer`](Write).
pub fn serialize<T, W>(value: &T, mut writer: W, options: SerializeOptions) -> Result<()>
where
    T: Serialize,
    W: Write,
{
    if options.explicit_document {
        writer
            .write_all(b"---\n")
            .context(WriteDocumentSeparatorSnafu)?;
    }

    let mut serializer = serde_yaml::Serializer::new(writer);

    if options.omit_unset {
        let mut value = serde_yaml::to_value(value).context(SerializeYamlSnafu)?;
        prune(&mut value);
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    } else {
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    Ok(())
}

/// Serializes `value` into a [`String`] using the default [`SerializeOptions`].
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    serialize(value, &mut buffer, SerializeOptions::default())?;
    String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
}

/// Removes null entries and empty mappings, returns `true` if `value` itself should be removed
fn prune(value: &mut Value) -> bool {
    match value {
        Value::Null => true,
        Value::Mapping(mapping) => {
            mapping.retain(|_, value| !prune(value));
            mapping.is_empty()
        }
        Value::Sequence(sequence) => {
            sequence.iter_mut().for_each(|item| {
                prune(item);
            });
            false
        }
        Value::Tagged(tagged) => prune(&mut tagged.value),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}
