use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    manifest::{
        WorkloadKind, WorkloadSchema,
        common::{DeploymentConfig, StringOrSlice},
        image::ImageConfig,
        logging::Logging,
        messaging::{PublishConfig, SubscribeConfig},
        network::NetworkConfig,
        sidecar::SidecarConfig,
        task::TaskConfig,
    },
    merge::Merge,
};

/// A service that processes messages from the topics it subscribes to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default)]
pub struct WorkerServiceConfig {
    pub image: ImageConfig,
    pub entrypoint: StringOrSlice,
    pub command: StringOrSlice,
    #[serde(flatten)]
    #[merge(inline)]
    pub task: TaskConfig,
    pub logging: Logging,
    pub sidecars: BTreeMap<String, SidecarConfig>,
    pub network: NetworkConfig,
    pub subscribe: SubscribeConfig,
    pub publish: PublishConfig,
    pub deployment: DeploymentConfig,
}

impl WorkloadSchema for WorkerServiceConfig {
    const KIND: WorkloadKind = WorkloadKind::WorkerService;

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
