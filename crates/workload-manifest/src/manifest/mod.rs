//! The workload manifest schema.
//!
//! A manifest describes one workload: its base configuration, plus partial configurations of the
//! same shape for every environment that needs to deviate from it.
//!
//! ```yaml
//! name: api
//! type: Backend Service
//! image:
//!   build: ./Dockerfile
//! count: 1
//! environments:
//!   prod:
//!     count:
//!       range: 2-10
//!       cpu_percentage: 70
//! ```
use std::collections::BTreeMap;

use serde::{Serialize, de::DeserializeOwned};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::{
    manifest::{
        backend_service::BackendServiceConfig,
        count::Count,
        load_balanced_web_service::LoadBalancedWebServiceConfig,
        network::{NetworkConfig, PlacementArgOrString, PlacementString, VpcConfig},
        scheduled_job::ScheduledJobConfig,
        task::{ExecuteCommand, TaskConfig},
        worker_service::WorkerServiceConfig,
    },
    merge::{Merge, MergeError, merge},
    registry::Composite,
};

pub mod backend_service;
pub mod common;
pub mod count;
pub mod environment;
pub mod http;
pub mod image;
pub mod load_balanced_web_service;
pub mod logging;
pub mod messaging;
pub mod network;
pub mod scheduled_job;
pub mod secret;
pub mod sidecar;
pub mod storage;
pub mod task;
pub mod worker_service;

/// The `type` of a workload manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, VariantNames)]
pub enum WorkloadKind {
    #[strum(serialize = "Load Balanced Web Service")]
    LoadBalancedWebService,

    #[strum(serialize = "Backend Service")]
    BackendService,

    #[strum(serialize = "Worker Service")]
    WorkerService,

    #[strum(serialize = "Scheduled Job")]
    ScheduledJob,
}

/// Configuration of one kind of workload.
pub trait WorkloadSchema: Merge + Composite + Clone + Default + DeserializeOwned + Serialize {
    const KIND: WorkloadKind;

    /// Values used for everything that neither the base configuration nor the environment sets
    fn defaults() -> Self;

    fn task(&self) -> &TaskConfig;

    fn task_mut(&mut self) -> &mut TaskConfig;

    fn network(&self) -> &NetworkConfig;
}

fn default_task() -> TaskConfig {
    TaskConfig {
        cpu: Some(256),
        memory: Some(512),
        count: Count::from_value(1),
        exec: ExecuteCommand::from_bool(false),
        ..TaskConfig::default()
    }
}

fn default_network() -> NetworkConfig {
    NetworkConfig {
        vpc: VpcConfig {
            placement: PlacementArgOrString::from_string(PlacementString::Public),
            ..VpcConfig::default()
        },
        ..NetworkConfig::default()
    }
}

/// A decoded manifest: the base configuration and the overrides of each environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Manifest<C> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub config: C,

    /// `None` if the environment is listed without any overrides
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, Option<C>>,
}

impl<C> Manifest<C> {
    pub fn new(name: Option<String>, config: C) -> Self {
        Self {
            name,
            config,
            environments: BTreeMap::new(),
        }
    }

    pub fn with_environment(mut self, name: impl Into<String>, overrides: Option<C>) -> Self {
        self.environments.insert(name.into(), overrides);
        self
    }

    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }
}

impl<C: WorkloadSchema> Manifest<C> {
    /// Lays the base configuration over [`WorkloadSchema::defaults`].
    ///
    /// Environment overrides are kept as they are, they apply on top of the defaulted base.
    pub fn with_defaults(&self) -> Result<Self, MergeError> {
        Ok(Self {
            name: self.name.clone(),
            config: merge(&C::defaults(), &self.config)?,
            environments: self.environments.clone(),
        })
    }
}

/// A decoded workload manifest of any kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Workload {
    LoadBalancedWebService(Manifest<LoadBalancedWebServiceConfig>),
    BackendService(Manifest<BackendServiceConfig>),
    WorkerService(Manifest<WorkerServiceConfig>),
    ScheduledJob(Manifest<ScheduledJobConfig>),
}

/// Runs `$body` with `$manifest` bound to the manifest of whichever kind `$workload` is.
macro_rules! with_manifest {
    ($workload:expr, $manifest:ident => $body:expr) => {
        match $workload {
            Workload::LoadBalancedWebService($manifest) => $body,
            Workload::BackendService($manifest) => $body,
            Workload::WorkerService($manifest) => $body,
            Workload::ScheduledJob($manifest) => $body,
        }
    };
}

impl Workload {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Self::LoadBalancedWebService(_) => WorkloadKind::LoadBalancedWebService,
            Self::BackendService(_) => WorkloadKind::BackendService,
            Self::WorkerService(_) => WorkloadKind::WorkerService,
            Self::ScheduledJob(_) => WorkloadKind::ScheduledJob,
        }
    }

    pub fn name(&self) -> Option<&str> {
        with_manifest!(self, manifest => manifest.name.as_deref())
    }

    pub fn environment_names(&self) -> Vec<&str> {
        with_manifest!(self, manifest => manifest.environment_names().collect())
    }

    /// See [`Manifest::with_defaults`].
    pub fn with_defaults(&self) -> Result<Self, MergeError> {
        Ok(match self {
            Self::LoadBalancedWebService(manifest) => {
                Self::LoadBalancedWebService(manifest.with_defaults()?)
            }
            Self::BackendService(manifest) => Self::BackendService(manifest.with_defaults()?),
            Self::WorkerService(manifest) => Self::WorkerService(manifest.with_defaults()?),
            Self::ScheduledJob(manifest) => Self::ScheduledJob(manifest.with_defaults()?),
        })
    }
}
