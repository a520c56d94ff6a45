use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    manifest::secret::{Secret, Variable},
    merge::Merge,
};

/// Settings of the log router sidecar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub retention: Option<u32>,
    pub image: Option<String>,
    pub destination: BTreeMap<String, String>,
    #[serde(rename = "enableMetadata")]
    pub enable_metadata: Option<bool>,
    #[serde(rename = "secretOptions")]
    pub secret_options: BTreeMap<String, Secret>,
    #[serde(rename = "configFilePath")]
    pub config_file: Option<String>,
    pub variables: BTreeMap<String, Variable>,
    pub secrets: BTreeMap<String, Secret>,
}

impl Logging {
    /// Returns `true` if a log router is requested at all
    pub fn is_enabled(&self) -> bool {
        !self.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::Logging;
    use crate::{manifest::secret::Secret, merge::merge};

    #[test]
    fn destination_options_are_merged_per_key() {
        let base: Logging = serde_yaml::from_str(indoc! {"
            destination:
              Name: cloudwatch
              region: us-west-2
            enableMetadata: true
            secretOptions:
              LOG_TOKEN: LOG_TOKEN_SECRET
        "})
        .expect("input is valid");
        let overrides: Logging = serde_yaml::from_str(indoc! {"
            destination:
              region: eu-west-1
            enableMetadata: false
            secretOptions:
              LOG_TOKEN:
                secretsmanager: logs/token
        "})
        .expect("input is valid");

        let merged = merge(&base, &overrides).expect("merge succeeds");
        assert_eq!(merged.destination["Name"], "cloudwatch");
        assert_eq!(merged.destination["region"], "eu-west-1");
        assert_eq!(merged.enable_metadata, Some(false));
        assert_eq!(
            merged.secret_options["LOG_TOKEN"],
            Secret::from_secrets_manager("logs/token")
        );
    }

    #[test]
    fn logging_is_off_unless_configured() {
        assert!(!Logging::default().is_enabled());
        assert!(
            Logging {
                retention: Some(30),
                ..Logging::default()
            }
            .is_enabled()
        );
    }
}
