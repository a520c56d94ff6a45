//! Decoding workload and environment manifests from YAML.
//!
//! The document is first read as a generic YAML mapping, to pick the schema from its `type` and to
//! reject keys that the schema does not know. Every document (the base configuration and the
//! overrides of each environment) is then read into the schema with [`crate::de`], so that errors
//! name the path of the offending field. The task settings, written next to the fields of the
//! workload itself, are read on their own for the same reason.
use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use strum::VariantNames;
use tracing::{debug, instrument};

use crate::{
    de::{self, scalar_to_string},
    manifest::{
        Manifest, Workload, WorkloadKind, WorkloadSchema,
        environment::{EnvironmentConfig, EnvironmentManifest},
        task::TaskConfig,
    },
    merge::{ExclusivityViolation, Merge},
    registry::Composite,
};

const NAME_KEY: &str = "name";
const TYPE_KEY: &str = "type";
const ENVIRONMENTS_KEY: &str = "environments";

/// Field of every workload schema whose keys are written at the top level of the manifest
const TASK_FIELD: &str = "task";

const ENVIRONMENT_KIND: &str = "Environment";

type Result<T, E = DecodeError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum DecodeError {
    #[snafu(display("failed to parse the manifest as YAML"))]
    ParseYaml { source: serde_yaml::Error },

    #[snafu(display("the manifest must be a YAML mapping"))]
    NotAMapping,

    #[snafu(display("the manifest has no {TYPE_KEY:?}"))]
    MissingType,

    #[snafu(display("invalid manifest type {kind:?}, must be one of {valid:?}"))]
    UnknownWorkloadType {
        kind: String,
        valid: Vec<&'static str>,
    },

    #[snafu(display("the {NAME_KEY:?} of the manifest must be a string"))]
    InvalidName,

    #[snafu(display("unknown field {field:?} in {kind} manifest"))]
    UnknownField { kind: String, field: String },

    #[snafu(display("failed to unmarshal {kind}"))]
    DeserializeWorkload { source: de::Error, kind: String },

    #[snafu(display("invalid {kind} manifest"))]
    MutualExclusivity {
        source: ExclusivityViolation,
        kind: String,
    },

    #[snafu(display("{ENVIRONMENTS_KEY:?} must be a mapping of environment names to overrides"))]
    EnvironmentsNotAMapping,

    #[snafu(display("the overrides of environment {environment:?} must be a mapping"))]
    EnvironmentNotAMapping { environment: String },

    #[snafu(display("failed to unmarshal the overrides of environment {environment:?}"))]
    DeserializeEnvironment {
        source: de::Error,
        environment: String,
    },

    #[snafu(display("invalid overrides for environment {environment:?}"))]
    EnvironmentMutualExclusivity {
        source: ExclusivityViolation,
        environment: String,
    },
}

/// Decodes a workload manifest, picking the schema from its `type`.
///
/// Only what the manifest says is decoded, see [`Workload::with_defaults`] for filling in the
/// rest.
#[instrument(skip_all)]
pub fn decode(input: &[u8]) -> Result<Workload> {
    let document = parse_document(input)?;
    let kind = manifest_type(&document)?;
    let kind = kind
        .parse::<WorkloadKind>()
        .ok()
        .context(UnknownWorkloadTypeSnafu {
            kind,
            valid: WorkloadKind::VARIANTS.to_vec(),
        })?;
    debug!(%kind, "decoding workload manifest");

    let workload = match kind {
        WorkloadKind::LoadBalancedWebService => {
            Workload::LoadBalancedWebService(decode_workload(&document)?)
        }
        WorkloadKind::BackendService => Workload::BackendService(decode_workload(&document)?),
        WorkloadKind::WorkerService => Workload::WorkerService(decode_workload(&document)?),
        WorkloadKind::ScheduledJob => Workload::ScheduledJob(decode_workload(&document)?),
    };
    debug!(
        name = workload.name(),
        environments = ?workload.environment_names(),
        "decoded workload manifest"
    );
    Ok(workload)
}

/// Decodes an environment manifest, which must be of type `Environment`.
#[instrument(skip_all)]
pub fn decode_environment(input: &[u8]) -> Result<EnvironmentManifest> {
    let document = parse_document(input)?;
    let kind = manifest_type(&document)?;
    ensure!(kind == ENVIRONMENT_KIND, UnknownWorkloadTypeSnafu {
        kind,
        valid: vec![ENVIRONMENT_KIND],
    });

    check_fields(
        &document,
        EnvironmentConfig::FIELDS.iter().copied(),
        &[NAME_KEY, TYPE_KEY],
        ENVIRONMENT_KIND,
        "",
    )?;
    let config: EnvironmentConfig =
        de::from_value(&Value::Mapping(document.clone())).context(DeserializeWorkloadSnafu {
            kind: ENVIRONMENT_KIND,
        })?;
    config.check_exclusive().context(MutualExclusivitySnafu {
        kind: ENVIRONMENT_KIND,
    })?;

    let manifest = Manifest::new(manifest_name(&document)?, config);
    debug!(name = manifest.name.as_deref(), "decoded environment manifest");
    Ok(manifest)
}

fn decode_workload<C: WorkloadSchema>(document: &Mapping) -> Result<Manifest<C>> {
    let kind = C::KIND.to_string();
    let fields = || {
        C::FIELDS
            .iter()
            .copied()
            .filter(|field| *field != TASK_FIELD)
            .chain(TaskConfig::FIELDS.iter().copied())
    };

    check_fields(document, fields(), &[NAME_KEY, TYPE_KEY, ENVIRONMENTS_KEY], &kind, "")?;
    let environments = match document.get(ENVIRONMENTS_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Mapping(environments)) => Some(environments),
        Some(_) => return EnvironmentsNotAMappingSnafu.fail(),
    };
    for (environment, overrides) in environments.into_iter().flatten() {
        if let Value::Mapping(overrides) = overrides {
            let prefix = format!("{ENVIRONMENTS_KEY}.{}.", scalar_to_string(environment));
            check_fields(overrides, fields(), &[], &kind, &prefix)?;
        }
    }

    let config: C = read_config(document).context(DeserializeWorkloadSnafu { kind: &kind })?;
    config
        .check_exclusive()
        .context(MutualExclusivitySnafu { kind })?;

    let mut overrides_by_environment = BTreeMap::new();
    for (environment, overrides) in environments.into_iter().flatten() {
        let environment = scalar_to_string(environment);
        let overrides = match overrides {
            Value::Null => None,
            Value::Mapping(overrides) => {
                let overrides: C = read_config(overrides).context(DeserializeEnvironmentSnafu {
                    environment: &environment,
                })?;
                overrides
                    .check_exclusive()
                    .context(EnvironmentMutualExclusivitySnafu {
                        environment: &environment,
                    })?;
                Some(overrides)
            }
            _ => return EnvironmentNotAMappingSnafu { environment }.fail(),
        };
        overrides_by_environment.insert(environment, overrides);
    }

    Ok(Manifest {
        name: manifest_name(document)?,
        config,
        environments: overrides_by_environment,
    })
}

/// Reads one document into `C`: the fields of the workload first, then its task settings.
fn read_config<C: WorkloadSchema>(document: &Mapping) -> Result<C, de::Error> {
    let (task, workload): (Mapping, Mapping) = document
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), Some(NAME_KEY | TYPE_KEY | ENVIRONMENTS_KEY)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .partition(|(key, _)| {
            key.as_str()
                .is_some_and(|key| TaskConfig::FIELDS.contains(&key))
        });

    let mut config: C = de::from_value(&Value::Mapping(workload))?;
    *config.task_mut() = de::from_value(&Value::Mapping(task))?;
    Ok(config)
}

fn parse_document(input: &[u8]) -> Result<Mapping> {
    match serde_yaml::from_slice(input).context(ParseYamlSnafu)? {
        Value::Mapping(document) => Ok(document),
        _ => NotAMappingSnafu.fail(),
    }
}

fn manifest_type(document: &Mapping) -> Result<String> {
    match document.get(TYPE_KEY) {
        None | Some(Value::Null) => MissingTypeSnafu.fail(),
        Some(Value::String(kind)) => Ok(kind.clone()),
        Some(other) => UnknownWorkloadTypeSnafu {
            kind: scalar_to_string(other),
            valid: WorkloadKind::VARIANTS.to_vec(),
        }
        .fail(),
    }
}

fn manifest_name(document: &Mapping) -> Result<Option<String>> {
    match document.get(NAME_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(name.clone())),
        Some(_) => InvalidNameSnafu.fail(),
    }
}

/// Fails on the first key of `mapping` that is neither one of `fields` nor one of `extra`
fn check_fields<'a>(
    mapping: &Mapping,
    fields: impl Iterator<Item = &'a str> + Clone,
    extra: &[&str],
    kind: &str,
    prefix: &str,
) -> Result<()> {
    for key in mapping.keys() {
        let known = key
            .as_str()
            .is_some_and(|key| extra.contains(&key) || fields.clone().any(|field| field == key));
        ensure!(known, UnknownFieldSnafu {
            kind,
            field: format!("{prefix}{}", scalar_to_string(key)),
        });
    }
    Ok(())
}
