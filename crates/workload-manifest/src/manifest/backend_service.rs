use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    manifest::{
        WorkloadKind, WorkloadSchema,
        common::{DeploymentConfig, StringOrSlice},
        http::RoutingRuleConfiguration,
        image::ImageConfig,
        logging::Logging,
        messaging::PublishConfig,
        network::NetworkConfig,
        sidecar::SidecarConfig,
        task::TaskConfig,
    },
    merge::Merge,
};

/// A service that is only reachable from inside the environment, optionally behind an internal
/// load balancer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default)]
pub struct BackendServiceConfig {
    pub image: ImageConfig,
    pub entrypoint: StringOrSlice,
    pub command: StringOrSlice,
    pub http: RoutingRuleConfiguration,
    #[serde(flatten)]
    #[merge(inline)]
    pub task: TaskConfig,
    pub logging: Logging,
    pub sidecars: BTreeMap<String, SidecarConfig>,
    pub network: NetworkConfig,
    pub publish: PublishConfig,
    pub deployment: DeploymentConfig,
}

impl WorkloadSchema for BackendServiceConfig {
    const KIND: WorkloadKind = WorkloadKind::BackendService;

    fn defaults() -> Self {
        Self {
            task: super::default_task(),
            network: super::default_network(),
            ..Self::default()
        }
    }

    fn task(&self) -> &TaskConfig {
        &self.task
    }

    fn task_mut(&mut self) -> &mut TaskConfig {
        &mut self.task
    }

    fn network(&self) -> &NetworkConfig {
        &self.network
    }
}
