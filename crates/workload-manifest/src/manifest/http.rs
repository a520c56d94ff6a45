use serde::{Deserialize, Serialize};

use crate::{
    manifest::common::StringOrSlice,
    merge::Merge,
    union::{Union, union_form},
};

/// `http: false` to turn off the load balancer, or its routing rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<bool, RoutingRuleConfiguration>",
    into = "Union<bool, RoutingRuleConfiguration>"
)]
#[merge(exclusive(enabled, rule))]
pub struct RoutingRuleConfigOrBool {
    pub enabled: Option<bool>,
    pub rule: RoutingRuleConfiguration,
}

union_form!(RoutingRuleConfigOrBool, enabled: bool, rule: RoutingRuleConfiguration);

impl RoutingRuleConfigOrBool {
    pub const fn from_bool(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            rule: RoutingRuleConfiguration::UNSET,
        }
    }

    pub const fn from_rule(rule: RoutingRuleConfiguration) -> Self {
        Self {
            enabled: None,
            rule,
        }
    }

    /// Returns `true` unless the routing rule was explicitly turned off
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingRuleConfiguration {
    pub path: Option<String>,
    pub healthcheck: HealthCheckArgsOrString,
    pub alias: Alias,
    pub target_container: Option<String>,
    pub target_port: Option<u16>,
    pub allowed_source_ips: Option<Vec<String>>,
    pub stickiness: Option<bool>,
    pub deregistration_delay: Option<String>,
    pub redirect_to_https: Option<bool>,
}

impl RoutingRuleConfiguration {
    const UNSET: Self = Self {
        path: None,
        healthcheck: Union::Unset,
        alias: Alias {
            string_slice_or_string: StringOrSlice {
                string: None,
                slice: None,
            },
            advanced_aliases: None,
        },
        target_container: None,
        target_port: None,
        allowed_source_ips: None,
        stickiness: None,
        deregistration_delay: None,
        redirect_to_https: None,
    };
}

/// `healthcheck: /health`, or the target group health check spelled out
pub type HealthCheckArgsOrString = Union<String, HttpHealthCheckArgs>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct HttpHealthCheckArgs {
    pub path: Option<String>,
    pub port: Option<u16>,
    pub success_codes: Option<String>,
    pub healthy_threshold: Option<u32>,
    pub unhealthy_threshold: Option<u32>,
    pub timeout: Option<String>,
    pub interval: Option<String>,
    pub grace_period: Option<String>,
}

/// Domain names the service is reachable under.
///
/// Written either as one name or a list of names, or as a list of [`AdvancedAlias`] when the
/// names live in different hosted zones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<StringOrSlice, Vec<AdvancedAlias>>",
    into = "Union<StringOrSlice, Vec<AdvancedAlias>>"
)]
#[merge(exclusive(string_slice_or_string, advanced_aliases))]
pub struct Alias {
    pub string_slice_or_string: StringOrSlice,
    pub advanced_aliases: Option<Vec<AdvancedAlias>>,
}

impl From<Union<StringOrSlice, Vec<AdvancedAlias>>> for Alias {
    fn from(value: Union<StringOrSlice, Vec<AdvancedAlias>>) -> Self {
        match value {
            Union::Unset => Self::default(),
            Union::Basic(string_slice_or_string) => Self {
                string_slice_or_string,
                advanced_aliases: None,
            },
            Union::Advanced(advanced_aliases) => Self {
                string_slice_or_string: StringOrSlice::default(),
                advanced_aliases: Some(advanced_aliases),
            },
        }
    }
}

impl From<Alias> for Union<StringOrSlice, Vec<AdvancedAlias>> {
    fn from(value: Alias) -> Self {
        match value.advanced_aliases {
            Some(advanced_aliases) => Self::Advanced(advanced_aliases),
            None if value.string_slice_or_string.is_zero() => Self::Unset,
            None => Self::Basic(value.string_slice_or_string),
        }
    }
}

impl Alias {
    /// Every domain name, regardless of how it was written
    pub fn names(&self) -> Vec<String> {
        match &self.advanced_aliases {
            Some(aliases) => aliases.iter().map(|alias| alias.alias.clone()).collect(),
            None => self.string_slice_or_string.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdvancedAlias {
    #[serde(rename = "name")]
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_zone: Option<String>,
}
