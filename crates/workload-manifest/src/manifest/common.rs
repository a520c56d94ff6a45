use serde::{Deserialize, Serialize};

use crate::{merge::Merge, union::Union};

/// A single string or a list of strings, such as a container command.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(from = "Union<String, Vec<String>>", into = "Union<String, Vec<String>>")]
#[merge(exclusive(string, slice))]
pub struct StringOrSlice {
    pub string: Option<String>,
    pub slice: Option<Vec<String>>,
}

impl From<Union<String, Vec<String>>> for StringOrSlice {
    fn from(value: Union<String, Vec<String>>) -> Self {
        match value {
            Union::Unset => Self::default(),
            Union::Basic(string) => Self::from_string(string),
            Union::Advanced(slice) => Self::from_slice(slice),
        }
    }
}

impl From<StringOrSlice> for Union<String, Vec<String>> {
    fn from(value: StringOrSlice) -> Self {
        match (value.string, value.slice) {
            (Some(string), _) => Self::Basic(string),
            (None, Some(slice)) => Self::Advanced(slice),
            (None, None) => Self::Unset,
        }
    }
}

impl StringOrSlice {
    pub fn from_string(string: impl Into<String>) -> Self {
        Self {
            string: Some(string.into()),
            slice: None,
        }
    }

    pub fn from_slice<I, S>(slice: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            string: None,
            slice: Some(slice.into_iter().map(Into::into).collect()),
        }
    }

    /// The value as a list, a single string counts as a list with one entry
    pub fn to_vec(&self) -> Vec<String> {
        match (&self.string, &self.slice) {
            (Some(string), _) => vec![string.clone()],
            (None, Some(slice)) => slice.clone(),
            (None, None) => Vec::new(),
        }
    }
}

/// Container level health check, run by the container agent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerHealthCheck {
    pub command: Option<Vec<String>>,
    pub interval: Option<String>,
    pub retries: Option<u32>,
    pub timeout: Option<String>,
    pub start_period: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct DeploymentConfig {
    pub rolling: Option<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::StringOrSlice;
    use crate::merge::merge;

    #[rstest]
    #[case::nothing_set(
        StringOrSlice::from_string("serve"),
        StringOrSlice::default(),
        StringOrSlice::from_string("serve")
    )]
    #[case::slice_clears_string(
        StringOrSlice::from_string("serve"),
        StringOrSlice::from_slice(["serve", "--verbose"]),
        StringOrSlice::from_slice(["serve", "--verbose"])
    )]
    #[case::string_clears_slice(
        StringOrSlice::from_slice(["serve", "--verbose"]),
        StringOrSlice::from_string("serve"),
        StringOrSlice::from_string("serve")
    )]
    #[case::empty_slice_is_set(
        StringOrSlice::from_string("serve"),
        StringOrSlice::from_slice(Vec::<String>::new()),
        StringOrSlice::from_slice(Vec::<String>::new())
    )]
    fn merge_string_or_slice(
        #[case] base: StringOrSlice,
        #[case] overrides: StringOrSlice,
        #[case] expected: StringOrSlice,
    ) {
        assert_eq!(merge(&base, &overrides), Ok(expected));
    }

    #[rstest]
    #[case("serve", StringOrSlice::from_string("serve"))]
    #[case("[serve, --verbose]", StringOrSlice::from_slice(["serve", "--verbose"]))]
    #[case("[]", StringOrSlice::from_slice(Vec::<String>::new()))]
    fn deserialize(#[case] input: &str, #[case] expected: StringOrSlice) {
        let value: StringOrSlice = serde_yaml::from_str(input).expect("input is valid");
        assert_eq!(value, expected);
    }

    #[test]
    fn to_vec() {
        assert_eq!(StringOrSlice::from_string("a").to_vec(), ["a"]);
        assert_eq!(StringOrSlice::from_slice(["a", "b"]).to_vec(), ["a", "b"]);
        assert!(StringOrSlice::default().to_vec().is_empty());
    }
}
