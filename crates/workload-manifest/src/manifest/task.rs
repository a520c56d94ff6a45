use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    manifest::{
        count::Count,
        secret::{Secret, Variable},
        storage::Storage,
    },
    merge::Merge,
    union::{Union, union_form},
};

/// Settings of the task running the main container, written inline at the top level of every
/// workload manifest.
///
/// Being flattened into the workload, it cannot reject unknown keys itself, decoding checks
/// them against the fields of the workload instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default)]
pub struct TaskConfig {
    pub cpu: Option<u32>,
    pub memory: Option<u32>,
    pub platform: PlatformArgsOrString,
    pub count: Count,
    pub exec: ExecuteCommand,
    pub variables: BTreeMap<String, Variable>,
    pub env_file: Option<String>,
    pub secrets: BTreeMap<String, Secret>,
    pub storage: Storage,
}

/// `platform: linux/arm64`, or the operating system family and architecture spelled out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<String, PlatformArgs>",
    into = "Union<String, PlatformArgs>"
)]
#[merge(exclusive(platform_string, platform_args))]
pub struct PlatformArgsOrString {
    pub platform_string: Option<String>,
    pub platform_args: PlatformArgs,
}

union_form!(PlatformArgsOrString, platform_string: String, platform_args: PlatformArgs);

impl PlatformArgsOrString {
    pub fn from_string(platform: impl Into<String>) -> Self {
        Self {
            platform_string: Some(platform.into()),
            platform_args: PlatformArgs::default(),
        }
    }

    /// The operating system family, e.g. `linux` for `linux/amd64`
    pub fn os(&self) -> Option<&str> {
        match &self.platform_string {
            Some(platform) => platform.split('/').next(),
            None => self.platform_args.osfamily.as_deref(),
        }
    }

    pub fn arch(&self) -> Option<&str> {
        match &self.platform_string {
            Some(platform) => platform.split_once('/').map(|(_, arch)| arch),
            None => self.platform_args.architecture.as_deref(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformArgs {
    pub osfamily: Option<String>,
    pub architecture: Option<String>,
}

/// `exec: true`, or `exec: {enable: true}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<bool, ExecuteCommandConfig>",
    into = "Union<bool, ExecuteCommandConfig>"
)]
#[merge(exclusive(enable, config))]
pub struct ExecuteCommand {
    pub enable: Option<bool>,
    pub config: ExecuteCommandConfig,
}

union_form!(ExecuteCommand, enable: bool, config: ExecuteCommandConfig);

impl ExecuteCommand {
    pub const fn from_bool(enable: bool) -> Self {
        Self {
            enable: Some(enable),
            config: ExecuteCommandConfig { enable: None },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enable.or(self.config.enable).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct ExecuteCommandConfig {
    pub enable: Option<bool>,
}
