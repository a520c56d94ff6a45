use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    manifest::{
        common::{ContainerHealthCheck, StringOrSlice},
        image::ImageLocationOrBuild,
        secret::{Secret, Variable},
    },
    merge::Merge,
    union::Union,
};

/// An additional container running next to the main one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct SidecarConfig {
    pub port: Option<String>,
    pub image: Union<String, ImageLocationOrBuild>,
    pub essential: Option<bool>,
    pub credentials_parameter: Option<String>,
    pub variables: BTreeMap<String, Variable>,
    pub secrets: BTreeMap<String, Secret>,
    pub mount_points: Option<Vec<SidecarMountPoint>>,
    pub labels: BTreeMap<String, String>,
    pub depends_on: BTreeMap<String, String>,
    pub healthcheck: ContainerHealthCheck,
    pub entrypoint: StringOrSlice,
    pub command: StringOrSlice,
}

impl SidecarConfig {
    /// The image location, if the sidecar is not built from source
    pub fn image_location(&self) -> Option<&str> {
        match &self.image {
            Union::Basic(location) => Some(location),
            Union::Advanced(image) => image.location.as_deref(),
            Union::Unset => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SidecarMountPoint {
    pub source_volume: Option<String>,
    pub path: Option<String>,
    pub read_only: Option<bool>,
}
