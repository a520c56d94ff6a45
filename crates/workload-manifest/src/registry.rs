//! Catalog of the composite types of the manifest tree, and of their exclusive groups.
//!
//! The merge rules of a composite depend on whether a field is part of an exclusive group. The
//! groups are declared next to the type (using `#[merge(exclusive(...))]`) and exposed through
//! [`Composite`], so that they can be listed and checked without running a merge.
use snafu::{Snafu, ensure};

use crate::manifest::{
    backend_service::BackendServiceConfig,
    common::{ContainerHealthCheck, DeploymentConfig, StringOrSlice},
    count::{
        AdvancedCount, AdvancedScalingConfig, Cooldown, Count, QueueScaling, Range, RangeConfig,
        ScalingConfigOrT,
    },
    environment::{
        AdvancedCdnConfig, CdnConfigOrBool, CdnStaticConfig, EnvironmentConfig,
        EnvironmentHttpConfig, ObservabilityConfig, PublicHttpConfig,
    },
    http::{Alias, HttpHealthCheckArgs, RoutingRuleConfigOrBool, RoutingRuleConfiguration},
    image::{BuildArgsOrString, DockerBuildArgs, ImageConfig, ImageLocationOrBuild},
    load_balanced_web_service::LoadBalancedWebServiceConfig,
    logging::Logging,
    messaging::{
        DeadLetterQueue, FifoQueueConfig, FifoQueueConfigOrBool, FifoTopicConfig,
        FifoTopicConfigOrBool, PublishConfig, SqsQueue, SqsQueueOrBool, SubscribeConfig,
    },
    network::{
        NetworkConfig, PlacementArgOrString, PlacementArgs, ServiceConnectArgs,
        ServiceConnectBoolOrArgs, SubnetArgs, SubnetListOrArgs, VpcConfig,
    },
    scheduled_job::{JobTriggerConfig, ScheduledJobConfig},
    secret::{FromCfn, Secret, SecretsManagerSecret},
    sidecar::SidecarConfig,
    storage::{AuthorizationConfig, EfsConfigOrBool, EfsVolumeConfiguration, Storage, Volume},
    task::{ExecuteCommand, ExecuteCommandConfig, PlatformArgs, PlatformArgsOrString, TaskConfig},
    worker_service::WorkerServiceConfig,
};

/// A struct of the manifest tree, as seen by the merge engine.
///
/// This will typically be derived using [`Merge`](derive@crate::merge::Merge), rather than
/// implemented manually.
pub trait Composite {
    /// Name of the type
    const NAME: &'static str;

    /// Every field of the type, in declaration order
    const FIELDS: &'static [&'static str];

    /// Groups of fields of which at most one alternative may be set at a time
    const EXCLUSIVE_GROUPS: &'static [ExclusiveGroup];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExclusiveGroup {
    pub alternatives: &'static [Alternative],
}

impl ExclusiveGroup {
    pub fn contains(&self, field: &str) -> bool {
        self.alternative_of(field).is_some()
    }

    pub fn alternative_of(&self, field: &str) -> Option<&'static Alternative> {
        self.alternatives
            .iter()
            .find(|alternative| alternative.fields.contains(&field))
    }
}

/// One way of writing an exclusive group, made up of one or more fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alternative {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum RegistryError {
    #[snafu(display("exclusive group of {type_name} has {count} alternative(s), at least two are required"))]
    TooFewAlternatives { type_name: &'static str, count: usize },

    #[snafu(display("alternative {alternative:?} of {type_name} has no fields"))]
    EmptyAlternative {
        type_name: &'static str,
        alternative: &'static str,
    },

    #[snafu(display("exclusive group of {type_name} refers to unknown field {field:?}"))]
    UnknownField {
        type_name: &'static str,
        field: &'static str,
    },

    #[snafu(display("field {field:?} of {type_name} is part of more than one alternative"))]
    FieldInSeveralAlternatives {
        type_name: &'static str,
        field: &'static str,
    },
}

/// Type-erased view of a [`Composite`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeInfo {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    pub exclusive_groups: &'static [ExclusiveGroup],
}

impl CompositeInfo {
    pub const fn of<T: Composite>() -> Self {
        Self {
            name: T::NAME,
            fields: T::FIELDS,
            exclusive_groups: T::EXCLUSIVE_GROUPS,
        }
    }

    /// Fields that are not part of any exclusive group, and are always merged recursively
    pub fn transparent_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .copied()
            .filter(|field| self.group_of(field).is_none())
    }

    pub fn group_of(&self, field: &str) -> Option<&'static ExclusiveGroup> {
        self.exclusive_groups
            .iter()
            .find(|group| group.contains(field))
    }

    /// Checks that the exclusive groups are well-formed.
    ///
    /// The derive macro already rejects malformed groups at compile time, this is mostly useful for
    /// hand-written [`Composite`] implementations.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut seen = Vec::new();
        for group in self.exclusive_groups {
            ensure!(group.alternatives.len() >= 2, TooFewAlternativesSnafu {
                type_name: self.name,
                count: group.alternatives.len(),
            });
            for alternative in group.alternatives {
                ensure!(!alternative.fields.is_empty(), EmptyAlternativeSnafu {
                    type_name: self.name,
                    alternative: alternative.name,
                });
                for &field in alternative.fields {
                    ensure!(self.fields.contains(&field), UnknownFieldSnafu {
                        type_name: self.name,
                        field,
                    });
                    ensure!(!seen.contains(&field), FieldInSeveralAlternativesSnafu {
                        type_name: self.name,
                        field,
                    });
                    seen.push(field);
                }
            }
        }
        Ok(())
    }
}

/// Every composite type that can appear in a workload or environment manifest
pub fn catalog() -> Vec<CompositeInfo> {
    vec![
        CompositeInfo::of::<LoadBalancedWebServiceConfig>(),
        CompositeInfo::of::<BackendServiceConfig>(),
        CompositeInfo::of::<WorkerServiceConfig>(),
        CompositeInfo::of::<ScheduledJobConfig>(),
        CompositeInfo::of::<JobTriggerConfig>(),
        CompositeInfo::of::<StringOrSlice>(),
        CompositeInfo::of::<ContainerHealthCheck>(),
        CompositeInfo::of::<DeploymentConfig>(),
        CompositeInfo::of::<ImageConfig>(),
        CompositeInfo::of::<ImageLocationOrBuild>(),
        CompositeInfo::of::<BuildArgsOrString>(),
        CompositeInfo::of::<DockerBuildArgs>(),
        CompositeInfo::of::<TaskConfig>(),
        CompositeInfo::of::<PlatformArgsOrString>(),
        CompositeInfo::of::<PlatformArgs>(),
        CompositeInfo::of::<ExecuteCommand>(),
        CompositeInfo::of::<ExecuteCommandConfig>(),
        CompositeInfo::of::<Count>(),
        CompositeInfo::of::<AdvancedCount>(),
        CompositeInfo::of::<Range>(),
        CompositeInfo::of::<RangeConfig>(),
        CompositeInfo::of::<ScalingConfigOrT<u32>>(),
        CompositeInfo::of::<AdvancedScalingConfig<u32>>(),
        CompositeInfo::of::<Cooldown>(),
        CompositeInfo::of::<QueueScaling>(),
        CompositeInfo::of::<Storage>(),
        CompositeInfo::of::<Volume>(),
        CompositeInfo::of::<EfsConfigOrBool>(),
        CompositeInfo::of::<EfsVolumeConfiguration>(),
        CompositeInfo::of::<AuthorizationConfig>(),
        CompositeInfo::of::<NetworkConfig>(),
        CompositeInfo::of::<VpcConfig>(),
        CompositeInfo::of::<PlacementArgOrString>(),
        CompositeInfo::of::<PlacementArgs>(),
        CompositeInfo::of::<SubnetListOrArgs>(),
        CompositeInfo::of::<SubnetArgs>(),
        CompositeInfo::of::<ServiceConnectBoolOrArgs>(),
        CompositeInfo::of::<ServiceConnectArgs>(),
        CompositeInfo::of::<RoutingRuleConfigOrBool>(),
        CompositeInfo::of::<RoutingRuleConfiguration>(),
        CompositeInfo::of::<HttpHealthCheckArgs>(),
        CompositeInfo::of::<Alias>(),
        CompositeInfo::of::<FromCfn>(),
        CompositeInfo::of::<Secret>(),
        CompositeInfo::of::<SecretsManagerSecret>(),
        CompositeInfo::of::<PublishConfig>(),
        CompositeInfo::of::<FifoTopicConfigOrBool>(),
        CompositeInfo::of::<FifoTopicConfig>(),
        CompositeInfo::of::<SubscribeConfig>(),
        CompositeInfo::of::<SqsQueueOrBool>(),
        CompositeInfo::of::<SqsQueue>(),
        CompositeInfo::of::<DeadLetterQueue>(),
        CompositeInfo::of::<FifoQueueConfigOrBool>(),
        CompositeInfo::of::<FifoQueueConfig>(),
        CompositeInfo::of::<Logging>(),
        CompositeInfo::of::<SidecarConfig>(),
        CompositeInfo::of::<EnvironmentConfig>(),
        CompositeInfo::of::<EnvironmentHttpConfig>(),
        CompositeInfo::of::<PublicHttpConfig>(),
        CompositeInfo::of::<ObservabilityConfig>(),
        CompositeInfo::of::<CdnConfigOrBool>(),
        CompositeInfo::of::<AdvancedCdnConfig>(),
        CompositeInfo::of::<CdnStaticConfig>(),
    ]
}
