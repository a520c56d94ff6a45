use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    manifest::{
        WorkloadKind, WorkloadSchema,
        common::StringOrSlice,
        image::ImageConfig,
        logging::Logging,
        messaging::PublishConfig,
        network::NetworkConfig,
        sidecar::SidecarConfig,
        task::TaskConfig,
    },
    merge::Merge,
};

/// A task that is started on a schedule and runs to completion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default)]
pub struct ScheduledJobConfig {
    pub image: ImageConfig,
    pub entrypoint: StringOrSlice,
    pub command: StringOrSlice,
    pub on: JobTriggerConfig,
    pub timeout: Option<String>,
    pub retries: Option<u32>,
    #[serde(flatten)]
    #[merge(inline)]
    pub task: TaskConfig,
    pub logging: Logging,
    pub sidecars: BTreeMap<String, SidecarConfig>,
    pub network: NetworkConfig,
    pub publish: PublishConfig,
}

/// When the job runs.
///
/// `schedule` is a bare string: an empty schedule in an environment is treated as not set, and
/// leaves the base schedule in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct JobTriggerConfig {
    pub schedule: String,
}

impl WorkloadSchema for ScheduledJobConfig {
    const KIND: WorkloadKind = WorkloadKind::ScheduledJob;

    fn defaults() -> Self {
        let mut task = super::default_task();
        task.count = Default::default();
        Self {
            task,
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
