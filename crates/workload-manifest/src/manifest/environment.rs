//! Manifest of an environment, the shared infrastructure that workloads are deployed into.
use serde::{Deserialize, Serialize};

use crate::{
    manifest::Manifest,
    merge::Merge,
    union::{Union, union_form},
};

pub type EnvironmentManifest = Manifest<EnvironmentConfig>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub http: EnvironmentHttpConfig,
    pub cdn: CdnConfigOrBool,
    pub observability: ObservabilityConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentHttpConfig {
    pub public: PublicHttpConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct PublicHttpConfig {
    pub certificates: Option<Vec<String>>,
    pub ssl_policy: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct ObservabilityConfig {
    pub container_insights: Option<bool>,
}

/// `cdn: true`, or the distribution settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<bool, AdvancedCdnConfig>",
    into = "Union<bool, AdvancedCdnConfig>"
)]
#[merge(exclusive(enabled, config))]
pub struct CdnConfigOrBool {
    pub enabled: Option<bool>,
    pub config: AdvancedCdnConfig,
}

union_form!(CdnConfigOrBool, enabled: bool, config: AdvancedCdnConfig);

impl CdnConfigOrBool {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or_else(|| !self.config.is_zero())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct AdvancedCdnConfig {
    pub certificate: Option<String>,
    pub terminate_tls: Option<bool>,
    pub static_assets: CdnStaticConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct CdnStaticConfig {
    pub location: Option<String>,
    pub alias: Option<String>,
    pub path: Option<String>,
}
