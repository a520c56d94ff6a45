use serde::{Deserialize, Serialize};

use crate::{merge::Merge, union::Union};

/// An environment variable, either a plain value or imported from a stack output.
pub type Variable = Union<String, FromCfn>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct FromCfn {
    pub from_cfn: Option<String>,
}

/// A secret injected into the container.
///
/// ```yaml
/// secrets:
///   GITHUB_TOKEN: GH_TOKEN_SECRET     # parameter name or ARN
///   DB_PASSWORD:
///     from_cfn: db-password-export    # imported from a stack output
///   API_KEY:
///     secretsmanager: demo/api-key    # looked up by name
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<Variable, SecretsManagerSecret>",
    into = "Union<Variable, SecretsManagerSecret>"
)]
#[merge(exclusive(from, from_secrets_manager))]
pub struct Secret {
    pub from: Variable,
    pub from_secrets_manager: SecretsManagerSecret,
}

impl From<Union<Variable, SecretsManagerSecret>> for Secret {
    fn from(value: Union<Variable, SecretsManagerSecret>) -> Self {
        match value {
            Union::Unset => Self::default(),
            Union::Basic(from) => Self::from_variable(from),
            Union::Advanced(from_secrets_manager) => Self {
                from: Variable::Unset,
                from_secrets_manager,
            },
        }
    }
}

impl From<Secret> for Union<Variable, SecretsManagerSecret> {
    fn from(value: Secret) -> Self {
        if !value.from.is_zero() {
            Self::Basic(value.from)
        } else if !value.from_secrets_manager.is_zero() {
            Self::Advanced(value.from_secrets_manager)
        } else {
            Self::Unset
        }
    }
}

impl Secret {
    pub const fn from_variable(from: Variable) -> Self {
        Self {
            from,
            from_secrets_manager: SecretsManagerSecret {
                secretsmanager: None,
            },
        }
    }

    pub fn from_name(name: impl Into<String>) -> Self {
        Self::from_variable(Variable::from_basic(name.into()))
    }

    pub fn from_secrets_manager(name: impl Into<String>) -> Self {
        Self {
            from: Variable::Unset,
            from_secrets_manager: SecretsManagerSecret {
                secretsmanager: Some(name.into()),
            },
        }
    }

    /// Returns `true` if the value is looked up from the secrets manager by name
    pub fn is_secrets_manager_name(&self) -> bool {
        self.from_secrets_manager.secretsmanager.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsManagerSecret {
    pub secretsmanager: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use indoc::indoc;
    use rstest::rstest;

    use super::{FromCfn, Secret, Variable};
    use crate::merge::merge;

    fn imported(export: &str) -> Secret {
        Secret::from_variable(Variable::from_advanced(FromCfn {
            from_cfn: Some(export.to_owned()),
        }))
    }

    #[rstest]
    #[case::name_clears_secrets_manager(
        Secret::from_secrets_manager("demo/api-key"),
        Secret::from_name("API_KEY"),
        Secret::from_name("API_KEY")
    )]
    #[case::secrets_manager_clears_name(
        Secret::from_name("API_KEY"),
        Secret::from_secrets_manager("demo/api-key"),
        Secret::from_secrets_manager("demo/api-key")
    )]
    #[case::import_replaces_name(Secret::from_name("API_KEY"), imported("api-key"), imported("api-key"))]
    #[case::nothing_set(imported("api-key"), Secret::default(), imported("api-key"))]
    fn merge_secret(#[case] base: Secret, #[case] overrides: Secret, #[case] expected: Secret) {
        assert_eq!(merge(&base, &overrides), Ok(expected));
    }

    #[test]
    fn deserialize_all_forms() {
        let secrets: BTreeMap<String, Secret> = serde_yaml::from_str(indoc! {"
            GITHUB_TOKEN: GH_TOKEN_SECRET
            DB_PASSWORD:
              from_cfn: db-password-export
            API_KEY:
              secretsmanager: demo/api-key
        "})
        .expect("input is valid");
        assert_eq!(secrets["GITHUB_TOKEN"], Secret::from_name("GH_TOKEN_SECRET"));
        assert_eq!(secrets["DB_PASSWORD"], imported("db-password-export"));
        assert_eq!(
            secrets["API_KEY"],
            Secret::from_secrets_manager("demo/api-key")
        );
        assert!(secrets["API_KEY"].is_secrets_manager_name());
    }

    #[test]
    fn unknown_reference_is_rejected() {
        assert!(serde_yaml::from_str::<Secret>("from_ssm: name").is_err());
    }
}
