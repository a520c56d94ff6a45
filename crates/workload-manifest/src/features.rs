//! Environment features a workload depends on.
//!
//! Some workloads can only be deployed into an environment that provisions shared resources for
//! them, such as NAT gateways for private subnets. Which of those a workload needs follows from its
//! effective configuration.
use strum::{Display, EnumString, IntoStaticStr};

use crate::{manifest::network::PlacementString, merge::Merge, overrides::EffectiveConfig};

/// A feature of the environment, named after the environment stack parameter that enables it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, IntoStaticStr,
)]
pub enum FeatureTag {
    #[strum(serialize = "NATWorkloads")]
    NatWorkloads,

    #[strum(serialize = "ALBWorkloads")]
    AlbWorkloads,

    #[strum(serialize = "InternalALBWorkloads")]
    InternalAlbWorkloads,

    #[strum(serialize = "EFSWorkloads")]
    EfsWorkloads,
}

/// Lists the features that the environment must provide for `config`, sorted and without
/// duplicates.
pub fn list_required_features(config: &EffectiveConfig<'_>) -> Vec<FeatureTag> {
    let mut features = Vec::new();

    if config.network().placement() == Some(PlacementString::Private) {
        features.push(FeatureTag::NatWorkloads);
    }

    match config {
        EffectiveConfig::LoadBalancedWebService(config) if config.http.is_enabled() => {
            features.push(FeatureTag::AlbWorkloads);
        }
        EffectiveConfig::BackendService(config) if !config.http.is_zero() => {
            features.push(FeatureTag::InternalAlbWorkloads);
        }
        _ => {}
    }

    if config.task().storage.uses_managed_fs() {
        features.push(FeatureTag::EfsWorkloads);
    }

    features.sort_unstable();
    features.dedup();
    features
}
