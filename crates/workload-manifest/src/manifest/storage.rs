use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    merge::{ExclusivityViolation, Merge},
    registry::{Alternative, Composite, ExclusiveGroup},
    union::{Union, union_form},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct Storage {
    pub ephemeral: Option<u32>,
    pub readonly_fs: Option<bool>,
    pub volumes: BTreeMap<String, Volume>,
}

impl Storage {
    /// Returns `true` if any volume asks for a filesystem that is created along with the
    /// environment
    pub fn uses_managed_fs(&self) -> bool {
        self.volumes.values().any(|volume| volume.efs.uses_managed_fs())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct Volume {
    pub efs: EfsConfigOrBool,
    pub path: Option<String>,
    pub read_only: Option<bool>,
}

/// `efs: true` for a managed filesystem, or an [`EfsVolumeConfiguration`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<bool, EfsVolumeConfiguration>",
    into = "Union<bool, EfsVolumeConfiguration>"
)]
#[merge(exclusive(enabled, advanced))]
pub struct EfsConfigOrBool {
    pub enabled: Option<bool>,
    pub advanced: EfsVolumeConfiguration,
}

union_form!(EfsConfigOrBool, enabled: bool, advanced: EfsVolumeConfiguration);

impl EfsConfigOrBool {
    pub const fn from_bool(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            advanced: EfsVolumeConfiguration::UNSET,
        }
    }

    pub const fn from_advanced(advanced: EfsVolumeConfiguration) -> Self {
        Self {
            enabled: None,
            advanced,
        }
    }

    pub fn uses_managed_fs(&self) -> bool {
        match self.enabled {
            Some(enabled) => enabled,
            None => self.advanced.is_managed(),
        }
    }
}

/// Either an existing filesystem (`id`, `root_dir`, `auth`), or the POSIX identity to use on a
/// managed one (`uid`, `gid`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EfsVolumeConfiguration {
    pub id: Option<String>,
    pub root_dir: Option<String>,
    pub auth: AuthorizationConfig,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl EfsVolumeConfiguration {
    const UNSET: Self = Self {
        id: None,
        root_dir: None,
        auth: AuthorizationConfig {
            iam: None,
            access_point_id: None,
        },
        uid: None,
        gid: None,
    };

    fn is_managed(&self) -> bool {
        self.uid.is_some() || self.gid.is_some()
    }

    fn is_existing(&self) -> bool {
        self.id.is_some() || self.root_dir.is_some() || !self.auth.is_zero()
    }

    fn first_existing_field(&self) -> &'static str {
        match (&self.id, &self.root_dir) {
            (Some(_), _) => "id",
            (None, Some(_)) => "root_dir",
            (None, None) => "auth",
        }
    }
}

impl Merge for EfsVolumeConfiguration {
    fn merge(&mut self, overrides: &Self) {
        if overrides.is_managed() {
            self.id = None;
            self.root_dir = None;
            self.auth = AuthorizationConfig::default();
            self.uid.merge(&overrides.uid);
            self.gid.merge(&overrides.gid);
        }
        if overrides.is_existing() {
            self.uid = None;
            self.gid = None;
            self.id.merge(&overrides.id);
            self.root_dir.merge(&overrides.root_dir);
            self.auth.merge(&overrides.auth);
        }
    }

    fn is_zero(&self) -> bool {
        !self.is_managed() && !self.is_existing()
    }

    fn check_exclusive(&self) -> Result<(), ExclusivityViolation> {
        if self.is_managed() && self.is_existing() {
            let managed = if self.uid.is_some() { "uid" } else { "gid" };
            return Err(ExclusivityViolation::new(
                managed,
                self.first_existing_field(),
            ));
        }
        Ok(())
    }
}

impl Composite for EfsVolumeConfiguration {
    const NAME: &'static str = "EfsVolumeConfiguration";
    const FIELDS: &'static [&'static str] = &["id", "root_dir", "auth", "uid", "gid"];
    const EXCLUSIVE_GROUPS: &'static [ExclusiveGroup] = &[ExclusiveGroup {
        alternatives: &[
            Alternative {
                name: "managed",
                fields: &["uid", "gid"],
            },
            Alternative {
                name: "existing",
                fields: &["id", "root_dir", "auth"],
            },
        ],
    }];
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizationConfig {
    pub iam: Option<bool>,
    pub access_point_id: Option<String>,
}
