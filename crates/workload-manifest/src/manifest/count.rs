//! Number of tasks of a service, either fixed or autoscaled.
//!
//! ```yaml
//! count: 3
//! ---
//! count:
//!   range: 1-10
//!   cpu_percentage: 70
//!   requests:
//!     value: 1000
//!     cooldown:
//!       in: 60s
//! ---
//! count:
//!   spot: 2
//! ```
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    merge::{Atomic, Merge},
    union::{Union, union_form},
};

/// `count: 3`, or an [`AdvancedCount`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(from = "Union<u32, AdvancedCount>", into = "Union<u32, AdvancedCount>")]
#[merge(exclusive(value, advanced))]
pub struct Count {
    pub value: Option<u32>,
    pub advanced: AdvancedCount,
}

union_form!(Count, value: u32, advanced: AdvancedCount);

impl Count {
    pub const fn from_value(value: u32) -> Self {
        Self {
            value: Some(value),
            advanced: AdvancedCount::DEFAULT,
        }
    }

    pub fn from_advanced(advanced: AdvancedCount) -> Self {
        Self {
            value: None,
            advanced,
        }
    }

    /// Number of tasks to start with, if it can be told without looking at any metric
    pub fn desired(&self) -> Option<u32> {
        self.value
            .or(self.advanced.spot)
            .or_else(|| self.advanced.range.bounds().map(|(min, _)| min))
    }
}

/// Autoscaling settings, or a number of tasks to place on spot capacity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
#[merge(exclusive(
    spot,
    autoscaling(
        range,
        cpu_percentage,
        memory_percentage,
        requests,
        response_time,
        queue_delay
    )
))]
pub struct AdvancedCount {
    pub spot: Option<u32>,
    pub range: Range,
    pub cpu_percentage: ScalingConfigOrT<u32>,
    pub memory_percentage: ScalingConfigOrT<u32>,
    pub requests: ScalingConfigOrT<u32>,
    pub response_time: ScalingConfigOrT<String>,
    pub queue_delay: QueueScaling,
}

impl AdvancedCount {
    const DEFAULT: Self = Self {
        spot: None,
        range: Range {
            value: None,
            range_config: RangeConfig {
                min: None,
                max: None,
                spot_from: None,
            },
        },
        cpu_percentage: ScalingConfigOrT::UNSET,
        memory_percentage: ScalingConfigOrT::UNSET,
        requests: ScalingConfigOrT::UNSET,
        response_time: ScalingConfigOrT::UNSET,
        queue_delay: QueueScaling {
            acceptable_latency: None,
            msg_processing_time: None,
            cooldown: Cooldown::UNSET,
        },
    };

    pub fn from_spot(spot: u32) -> Self {
        Self {
            spot: Some(spot),
            ..Self::default()
        }
    }

    /// Returns `true` if any scaling signal is configured
    pub fn has_autoscaling(&self) -> bool {
        !(self.cpu_percentage.is_zero()
            && self.memory_percentage.is_zero()
            && self.requests.is_zero()
            && self.response_time.is_zero()
            && self.queue_delay.is_zero())
    }
}

/// `range: 1-10`, or a [`RangeConfig`] that can also move tasks onto spot capacity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(from = "Union<String, RangeConfig>", into = "Union<String, RangeConfig>")]
#[merge(exclusive(value, range_config))]
pub struct Range {
    pub value: Option<String>,
    pub range_config: RangeConfig,
}

union_form!(Range, value: String, range_config: RangeConfig);

impl Range {
    pub fn from_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            range_config: RangeConfig::default(),
        }
    }

    /// Minimum and maximum number of tasks, `None` if the range is incomplete or malformed
    pub fn bounds(&self) -> Option<(u32, u32)> {
        match &self.value {
            Some(value) => {
                let (min, max) = value.split_once('-')?;
                Some((min.trim().parse().ok()?, max.trim().parse().ok()?))
            }
            None => Some((self.range_config.min?, self.range_config.max?)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct RangeConfig {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub spot_from: Option<u32>,
}

/// A scaling target, either on its own or with scaling cooldowns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<T, AdvancedScalingConfig<T>>",
    into = "Union<T, AdvancedScalingConfig<T>>",
    bound(
        deserialize = "T: DeserializeOwned + Atomic + Default",
        serialize = "T: Serialize + Atomic"
    )
)]
#[merge(bound = "T: Atomic + Default", exclusive(value, scaling_config))]
pub struct ScalingConfigOrT<T> {
    pub value: Option<T>,
    pub scaling_config: AdvancedScalingConfig<T>,
}

impl<T> ScalingConfigOrT<T> {
    const UNSET: Self = Self {
        value: None,
        scaling_config: AdvancedScalingConfig {
            value: None,
            cooldown: Cooldown::UNSET,
        },
    };

    pub const fn from_value(value: T) -> Self {
        Self {
            value: Some(value),
            scaling_config: AdvancedScalingConfig {
                value: None,
                cooldown: Cooldown::UNSET,
            },
        }
    }

    /// The target, whichever form it was written in
    pub fn target(&self) -> Option<&T> {
        self.value.as_ref().or(self.scaling_config.value.as_ref())
    }
}

impl<T: Atomic> From<Union<T, AdvancedScalingConfig<T>>> for ScalingConfigOrT<T> {
    fn from(value: Union<T, AdvancedScalingConfig<T>>) -> Self {
        match value {
            Union::Unset => Self::UNSET,
            Union::Basic(value) => Self::from_value(value),
            Union::Advanced(scaling_config) => Self {
                value: None,
                scaling_config,
            },
        }
    }
}

impl<T: Atomic> From<ScalingConfigOrT<T>> for Union<T, AdvancedScalingConfig<T>> {
    fn from(value: ScalingConfigOrT<T>) -> Self {
        match value.value {
            Some(value) => Self::Basic(value),
            None if value.scaling_config.is_zero() => Self::Unset,
            None => Self::Advanced(value.scaling_config),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    default,
    deny_unknown_fields,
    bound(
        deserialize = "T: DeserializeOwned + Default",
        serialize = "T: Serialize"
    )
)]
#[merge(bound = "T: Atomic")]
pub struct AdvancedScalingConfig<T> {
    pub value: Option<T>,
    pub cooldown: Cooldown,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct Cooldown {
    #[serde(rename = "in")]
    pub scale_in_cooldown: Option<String>,
    #[serde(rename = "out")]
    pub scale_out_cooldown: Option<String>,
}

impl Cooldown {
    const UNSET: Self = Self {
        scale_in_cooldown: None,
        scale_out_cooldown: None,
    };
}

/// Scale on the backlog of the worker's queue.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct QueueScaling {
    pub acceptable_latency: Option<String>,
    pub msg_processing_time: Option<String>,
    pub cooldown: Cooldown,
}
