use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    manifest::{
        WorkloadKind, WorkloadSchema,
        common::{DeploymentConfig, StringOrSlice},
        http::{RoutingRuleConfigOrBool, RoutingRuleConfiguration},
        image::ImageConfig,
        logging::Logging,
        messaging::PublishConfig,
        network::NetworkConfig,
        sidecar::SidecarConfig,
        task::TaskConfig,
    },
    merge::Merge,
    union::Union,
};

/// An internet-facing service behind an application load balancer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default)]
pub struct LoadBalancedWebServiceConfig {
    pub image: ImageConfig,
    pub entrypoint: StringOrSlice,
    pub command: StringOrSlice,
    pub http: RoutingRuleConfigOrBool,
    #[serde(flatten)]
    #[merge(inline)]
    pub task: TaskConfig,
    pub logging: Logging,
    pub sidecars: BTreeMap<String, SidecarConfig>,
    pub network: NetworkConfig,
    pub publish: PublishConfig,
    pub deployment: DeploymentConfig,
}

impl WorkloadSchema for LoadBalancedWebServiceConfig {
    const KIND: WorkloadKind = WorkloadKind::LoadBalancedWebService;

    fn defaults() -> Self {
        Self {
            http: RoutingRuleConfigOrBool::from_rule(RoutingRuleConfiguration {
                healthcheck: Union::from_basic("/".to_owned()),
                ..RoutingRuleConfiguration::default()
            }),
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
