//! Workload manifests and their per-environment overrides.
//!
//! A manifest describes a containerized workload (a web service, a backend service, a worker or a
//! scheduled job) with a base configuration and, for every environment that needs it, a partial
//! configuration of the same shape. This crate decodes such manifests and computes the effective
//! configuration of a workload in one environment by overlaying the environment's overrides onto
//! the base.
//!
//! ```
//! use workload_manifest::{decode::decode, features::list_required_features};
//!
//! let workload = decode(br#"
//! name: api
//! type: Backend Service
//! image:
//!   location: nginx:latest
//! count: 1
//! environments:
//!   prod:
//!     count: 3
//!     network:
//!       vpc:
//!         placement: private
//! "#)?;
//!
//! let prod = workload.apply_environment("prod")?;
//! assert_eq!(prod.task().count.value, Some(3));
//! assert_eq!(list_required_features(&prod), [workload_manifest::features::FeatureTag::NatWorkloads]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The overlay rules themselves are documented in [`merge`].

// Lets the code generated by `#[derive(Merge)]` refer to this crate by name from inside of it.
extern crate self as workload_manifest;

pub mod de;
pub mod decode;
pub mod features;
pub mod manifest;
pub mod merge;
pub mod overrides;
pub mod registry;
pub mod union;
pub mod yaml;

pub use crate::{
    decode::{DecodeError, decode, decode_environment},
    features::{FeatureTag, list_required_features},
    manifest::{Manifest, Workload, WorkloadKind},
    merge::{Merge, MergeError},
    overrides::EffectiveConfig,
    union::Union,
};
