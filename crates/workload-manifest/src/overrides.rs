//! Computing the effective configuration of a workload in one environment.
//!
//! The base configuration and the environment overrides are never modified, so a decoded
//! [`Workload`] can be shared between threads that each compute a different environment.
use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    manifest::{
        Manifest, Workload, WorkloadKind, WorkloadSchema,
        backend_service::BackendServiceConfig,
        load_balanced_web_service::LoadBalancedWebServiceConfig,
        network::NetworkConfig,
        scheduled_job::ScheduledJobConfig,
        task::TaskConfig,
        worker_service::WorkerServiceConfig,
    },
    merge::{Merge, MergeError, merge},
};

impl<C: Merge + Clone> Manifest<C> {
    /// Overlays the overrides of `environment` onto the base configuration.
    ///
    /// The base is borrowed as-is if the environment is not listed, or is listed without any
    /// overrides.
    pub fn apply_environment(&self, environment: &str) -> Result<Cow<'_, C>, MergeError> {
        match self.environments.get(environment) {
            Some(Some(overrides)) if !overrides.is_zero() => {
                debug!(environment, "applying environment overrides");
                merge(&self.config, overrides).map(Cow::Owned)
            }
            Some(_) => {
                debug!(environment, "environment has no overrides");
                Ok(Cow::Borrowed(&self.config))
            }
            None => {
                debug!(environment, "environment is not listed in the manifest");
                Ok(Cow::Borrowed(&self.config))
            }
        }
    }
}

/// The configuration of a workload in one environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EffectiveConfig<'a> {
    LoadBalancedWebService(Cow<'a, LoadBalancedWebServiceConfig>),
    BackendService(Cow<'a, BackendServiceConfig>),
    WorkerService(Cow<'a, WorkerServiceConfig>),
    ScheduledJob(Cow<'a, ScheduledJobConfig>),
}

impl Workload {
    /// Computes the effective configuration of the workload in `environment`.
    ///
    /// Defaults are not applied, call [`Workload::with_defaults`] first for that.
    #[instrument(skip(self), fields(kind = %self.kind()))]
    pub fn apply_environment(&self, environment: &str) -> Result<EffectiveConfig<'_>, MergeError> {
        Ok(match self {
            Self::LoadBalancedWebService(manifest) => {
                EffectiveConfig::LoadBalancedWebService(manifest.apply_environment(environment)?)
            }
            Self::BackendService(manifest) => {
                EffectiveConfig::BackendService(manifest.apply_environment(environment)?)
            }
            Self::WorkerService(manifest) => {
                EffectiveConfig::WorkerService(manifest.apply_environment(environment)?)
            }
            Self::ScheduledJob(manifest) => {
                EffectiveConfig::ScheduledJob(manifest.apply_environment(environment)?)
            }
        })
    }
}

/// Runs `$body` with `$config` bound to a reference to the configuration, whatever its kind.
macro_rules! with_config {
    ($effective:expr, $config:ident => $body:expr) => {
        match $effective {
            EffectiveConfig::LoadBalancedWebService(config) => {
                let $config = &**config;
                $body
            }
            EffectiveConfig::BackendService(config) => {
                let $config = &**config;
                $body
            }
            EffectiveConfig::WorkerService(config) => {
                let $config = &**config;
                $body
            }
            EffectiveConfig::ScheduledJob(config) => {
                let $config = &**config;
                $body
            }
        }
    };
}

impl EffectiveConfig<'_> {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Self::LoadBalancedWebService(_) => WorkloadKind::LoadBalancedWebService,
            Self::BackendService(_) => WorkloadKind::BackendService,
            Self::WorkerService(_) => WorkloadKind::WorkerService,
            Self::ScheduledJob(_) => WorkloadKind::ScheduledJob,
        }
    }

    pub fn task(&self) -> &TaskConfig {
        with_config!(self, config => config.task())
    }

    pub fn network(&self) -> &NetworkConfig {
        with_config!(self, config => config.network())
    }

    /// Returns `true` if the environment did not change anything, and the base configuration
    /// is used as it is.
    pub fn is_base(&self) -> bool {
        match self {
            Self::LoadBalancedWebService(config) => matches!(config, Cow::Borrowed(_)),
            Self::BackendService(config) => matches!(config, Cow::Borrowed(_)),
            Self::WorkerService(config) => matches!(config, Cow::Borrowed(_)),
            Self::ScheduledJob(config) => matches!(config, Cow::Borrowed(_)),
        }
    }

    /// Detaches the configuration from the workload it was computed from
    pub fn into_owned(self) -> EffectiveConfig<'static> {
        match self {
            Self::LoadBalancedWebService(config) => {
                EffectiveConfig::LoadBalancedWebService(Cow::Owned(config.into_owned()))
            }
            Self::BackendService(config) => {
                EffectiveConfig::BackendService(Cow::Owned(config.into_owned()))
            }
            Self::WorkerService(config) => {
                EffectiveConfig::WorkerService(Cow::Owned(config.into_owned()))
            }
            Self::ScheduledJob(config) => {
                EffectiveConfig::ScheduledJob(Cow::Owned(config.into_owned()))
            }
        }
    }
}
