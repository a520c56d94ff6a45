//! Values that can be written either in a short (basic) or a detailed (advanced) form.
//!
//! For example, a health check can be given as just a path, or as a full set of arguments:
//!
//! ```yaml
//! healthcheck: /health
//! ---
//! healthcheck:
//!   path: /health
//!   interval: 10s
//! ```
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{DeserializeOwned, Error as _},
};
use serde_yaml::Value;

use crate::{
    de,
    merge::{ExclusivityViolation, Merge},
};

/// Holds at most one of a basic or an advanced value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Union<Basic, Advanced> {
    #[default]
    Unset,
    Basic(Basic),
    Advanced(Advanced),
}

impl<B, A> Union<B, A> {
    pub const fn from_basic(basic: B) -> Self {
        Self::Basic(basic)
    }

    pub const fn from_advanced(advanced: A) -> Self {
        Self::Advanced(advanced)
    }

    /// Returns `true` if neither side is set
    pub const fn is_zero(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub const fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    pub const fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced(_))
    }

    pub const fn basic(&self) -> Option<&B> {
        match self {
            Self::Basic(basic) => Some(basic),
            _ => None,
        }
    }

    pub const fn advanced(&self) -> Option<&A> {
        match self {
            Self::Advanced(advanced) => Some(advanced),
            _ => None,
        }
    }
}

/// Overrides of the other form replace the whole value, advanced overrides of an advanced value
/// are merged into it.
impl<B, A> Merge for Union<B, A>
where
    B: Clone,
    A: Merge + Clone,
{
    fn merge(&mut self, overrides: &Self) {
        match (&mut *self, overrides) {
            (_, Self::Unset) => {}
            (Self::Advanced(this), Self::Advanced(advanced)) => this.merge(advanced),
            (this, overrides) => this.clone_from(overrides),
        }
    }

    fn is_zero(&self) -> bool {
        Self::is_zero(self)
    }

    fn check_exclusive(&self) -> Result<(), ExclusivityViolation> {
        match self {
            Self::Advanced(advanced) => advanced.check_exclusive(),
            Self::Unset | Self::Basic(_) => Ok(()),
        }
    }
}

impl<B: DeserializeOwned, A: DeserializeOwned> Union<B, A> {
    /// Reads the basic form if the value fits it, and the advanced form otherwise.
    ///
    /// If neither fits, a scalar is reported against the basic form. For mappings and sequences
    /// the form that failed further inside the value is reported, or both if neither did.
    fn from_yaml(value: &Value) -> Result<Self, de::Error> {
        if value.is_null() {
            return Ok(Self::Unset);
        }
        let basic_err = match de::from_value(value) {
            Ok(basic) => return Ok(Self::Basic(basic)),
            Err(err) => err,
        };
        let advanced_err = match de::from_value(value) {
            Ok(advanced) => return Ok(Self::Advanced(advanced)),
            Err(err) => err,
        };
        Err(match value {
            Value::Mapping(_) | Value::Sequence(_) => {
                match (basic_err.is_nested(), advanced_err.is_nested()) {
                    (true, false) => basic_err,
                    (false, true) => advanced_err,
                    _ => de::Error::custom(format_args!(
                        "matches neither the basic form ({basic_err}) nor the advanced form ({advanced_err})"
                    )),
                }
            }
            _ => basic_err,
        })
    }
}

impl<'de, B: DeserializeOwned, A: DeserializeOwned> Deserialize<'de> for Union<B, A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_yaml(&value).map_err(D::Error::custom)
    }
}

impl<B: Serialize, A: Serialize> Serialize for Union<B, A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset => serializer.serialize_none(),
            Self::Basic(basic) => basic.serialize(serializer),
            Self::Advanced(advanced) => advanced.serialize(serializer),
        }
    }
}

/// Converts an "either/or" struct (one optional basic field, one composite advanced field) to and
/// from [`Union`], so that it can be (de)serialized through it using `#[serde(from, into)]`.
macro_rules! union_form {
    ($ty:ty, $basic:ident: $basic_ty:ty, $advanced:ident: $advanced_ty:ty) => {
        impl From<$crate::union::Union<$basic_ty, $advanced_ty>> for $ty {
            fn from(value: $crate::union::Union<$basic_ty, $advanced_ty>) -> Self {
                match value {
                    $crate::union::Union::Unset => Self::default(),
                    $crate::union::Union::Basic(basic) => Self {
                        $basic: Some(basic),
                        ..Self::default()
                    },
                    $crate::union::Union::Advanced(advanced) => Self {
                        $advanced: advanced,
                        ..Self::default()
                    },
                }
            }
        }

        impl From<$ty> for $crate::union::Union<$basic_ty, $advanced_ty> {
            fn from(value: $ty) -> Self {
                match value.$basic {
                    Some(basic) => Self::Basic(basic),
                    None if $crate::merge::Merge::is_zero(&value.$advanced) => Self::Unset,
                    None => Self::Advanced(value.$advanced),
                }
            }
        }
    };
}
pub(crate) use union_form;
