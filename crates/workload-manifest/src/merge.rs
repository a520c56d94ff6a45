//! Overlaying one configuration value onto another.
//!
//! A workload manifest contains a base configuration and, for each environment, a partial
//! configuration of the same type. The effective configuration for an environment is the base
//! with every field that the override sets laid on top of it. What "sets" means depends on the
//! shape of the field:
//!
//! | Shape | Absent when | Present override |
//! |---|---|---|
//! | `Option<T>` with `T: Atomic` | `None` | replaces, even with a zero value |
//! | `Option<Vec<T>>` | `None` | replaces the whole sequence, even with `[]` |
//! | `BTreeMap<K, V>` | empty | union, overriding keys win |
//! | bare `bool`, integer, `String` | zero value | replaces |
//! | composites (`#[derive(Merge)]`) | all fields absent | merged field by field |
//!
//! Composites can additionally declare exclusive groups, see [`derive@Merge`].
use std::{
    collections::{BTreeMap, btree_map},
    fmt::{Display, Write},
};

use snafu::{ResultExt, Snafu};

pub use workload_manifest_derive::Merge;

/// A type whose values can be overlaid with another value of the same type.
///
/// Most users will want to implement this for custom types using [the associated derive
/// macro](`derive@Merge`).
///
/// # Example
///
/// ```
/// # use workload_manifest::merge::Merge;
/// #[derive(Clone, Debug, Default, PartialEq, Eq, Merge)]
/// struct Task {
///     cpu: Option<u32>,
///     memory: Option<u32>,
/// }
///
/// let mut config = Task {
///     cpu: Some(256),
///     memory: Some(512),
/// };
/// config.merge(&Task {
///     cpu: Some(1024),
///     memory: None,
/// });
/// assert_eq!(config, Task {
///     cpu: Some(1024), // Overridden
///     memory: Some(512), // Inherited
/// });
/// ```
pub trait Merge {
    /// Overlays every field that is set in `overrides` onto `self`.
    fn merge(&mut self, overrides: &Self);

    /// Returns `true` if the value counts as "not set" when it appears in overrides.
    fn is_zero(&self) -> bool;

    /// Overlays a value whose presence is implied by its container, such as a map entry.
    fn merge_entry(&mut self, overrides: &Self) {
        self.merge(overrides);
    }

    /// Makes sure that no exclusive group inside of `self` has more than one alternative set.
    fn check_exclusive(&self) -> Result<(), ExclusivityViolation> {
        Ok(())
    }
}

impl<K, V> Merge for BTreeMap<K, V>
where
    K: Ord + Clone + Display,
    V: Merge + Clone,
{
    fn merge(&mut self, overrides: &Self) {
        for (key, value) in overrides {
            match self.entry(key.clone()) {
                btree_map::Entry::Occupied(mut entry) => {
                    entry.get_mut().merge_entry(value);
                }
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(value.clone());
                }
            }
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn check_exclusive(&self) -> Result<(), ExclusivityViolation> {
        self.iter().try_for_each(|(key, value)| {
            value
                .check_exclusive()
                .map_err(|err| err.within(key.to_string()))
        })
    }
}

/// A marker trait for types that are merged atomically (as one single value) rather than
/// trying to merge each field individually
pub trait Atomic: Clone {}

impl<T: Clone> Atomic for Vec<T> {}

impl<T: Atomic> Merge for Option<T> {
    fn merge(&mut self, overrides: &Self) {
        if overrides.is_some() {
            self.clone_from(overrides);
        }
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

/// Bare values cannot tell "unset" apart from their zero value, so zero never overrides anything.
macro_rules! bare_atomic {
    ($($ty:ty),* $(,)?) => {$(
        impl Atomic for $ty {}

        impl Merge for $ty {
            fn merge(&mut self, overrides: &Self) {
                if !overrides.is_zero() {
                    self.clone_from(overrides);
                }
            }

            fn is_zero(&self) -> bool {
                *self == <$ty>::default()
            }

            fn merge_entry(&mut self, overrides: &Self) {
                self.clone_from(overrides);
            }
        }
    )*};
}

bare_atomic!(u8, u16, u32, u64, i32, i64, bool, String);

/// Overlays `overrides` onto a copy of `base`, leaving both inputs untouched.
///
/// The result is checked for exclusive groups with more than one alternative set. Merging two
/// values that are valid on their own never does that, so an error here means that some `Merge`
/// implementation is broken.
pub fn merge<T: Merge + Clone>(base: &T, overrides: &T) -> Result<T, MergeError> {
    let mut merged = base.clone();
    merged.merge(overrides);
    merged
        .check_exclusive()
        .context(ExclusivityBrokenSnafu {
            type_name: std::any::type_name::<T>(),
        })?;
    Ok(merged)
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum MergeError {
    #[snafu(display("merged {type_name} has more than one alternative of an exclusive group set"))]
    ExclusivityBroken {
        type_name: &'static str,
        source: ExclusivityViolation,
    },
}

/// Dotted path to a field, stored innermost segment first
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct FieldPath {
    idents: Vec<String>,
}

impl FieldPath {
    fn prefix(&self) -> String {
        if self.idents.is_empty() {
            String::new()
        } else {
            format!("{self}: ")
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, ident) in self.idents.iter().rev().enumerate() {
            if i > 0 {
                f.write_char('.')?;
            }
            f.write_str(ident)?;
        }
        Ok(())
    }
}

/// Two alternatives of the same exclusive group are set at once.
///
/// Constructed by [`Merge::check_exclusive`], which prefixes the path of the offending object as
/// the error bubbles up.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display(
    "{}must specify one, not both, of {first:?} and {second:?}",
    path.prefix()
))]
pub struct ExclusivityViolation {
    path: FieldPath,
    first: &'static str,
    second: &'static str,
}

impl ExclusivityViolation {
    pub fn new(first: &'static str, second: &'static str) -> Self {
        Self {
            path: FieldPath::default(),
            first,
            second,
        }
    }

    /// Marks the violation as having happened inside of the field `ident`
    pub fn within(mut self, ident: impl Into<String>) -> Self {
        self.path.idents.push(ident.into());
        self
    }

    pub fn path(&self) -> String {
        self.path.to_string()
    }

    pub fn fields(&self) -> (&'static str, &'static str) {
        (self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::{ExclusivityViolation, Merge, MergeError, merge};

    #[derive(Clone, Debug, Default, PartialEq, Eq, Merge)]
    #[merge(path_overrides(merge = "super", registry = "crate::registry"))]
    struct Task {
        cpu: Option<u32>,
        essential: Option<bool>,
        env_file: Option<String>,
        command: Option<Vec<String>>,
        labels: BTreeMap<String, String>,
        legacy_name: String,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Merge)]
    #[merge(path_overrides(merge = "super", registry = "crate::registry"))]
    #[merge(exclusive(value, autoscaling(min, max)))]
    struct Replicas {
        value: Option<u32>,
        min: Option<u32>,
        max: Option<u32>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Merge)]
    #[merge(path_overrides(merge = "super", registry = "crate::registry"))]
    struct Service {
        task: Task,
        replicas: Replicas,
        sidecars: BTreeMap<String, Task>,
    }

    fn task() -> Task {
        Task {
            cpu: Some(256),
            essential: Some(true),
            env_file: Some("./app.env".to_owned()),
            command: Some(vec!["serve".to_owned(), "--port=80".to_owned()]),
            labels: [("team", "web"), ("tier", "front")]
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .into(),
            legacy_name: "frontend".to_owned(),
        }
    }

    #[test]
    fn absent_overrides_leave_everything_unchanged() {
        assert_eq!(merge(&task(), &Task::default()), Ok(task()));
    }

    #[test]
    fn explicit_zero_values_override() {
        let merged = merge(
            &task(),
            &Task {
                cpu: Some(0),
                essential: Some(false),
                env_file: Some(String::new()),
                ..Task::default()
            },
        )
        .expect("merge succeeds");
        assert_eq!(merged.cpu, Some(0));
        assert_eq!(merged.essential, Some(false));
        assert_eq!(merged.env_file, Some(String::new()));
    }

    #[rstest]
    #[case(None, Some(vec!["serve".to_owned(), "--port=80".to_owned()]))]
    #[case(Some(vec![]), Some(vec![]))]
    #[case(Some(vec!["worker".to_owned()]), Some(vec!["worker".to_owned()]))]
    fn sequences_are_replaced_wholesale(
        #[case] overrides: Option<Vec<String>>,
        #[case] expected: Option<Vec<String>>,
    ) {
        let merged = merge(
            &task(),
            &Task {
                command: overrides,
                ..Task::default()
            },
        )
        .expect("merge succeeds");
        assert_eq!(merged.command, expected);
    }

    #[test]
    fn maps_are_unioned_with_overrides_winning() {
        let merged = merge(
            &task(),
            &Task {
                labels: [("team", "platform"), ("owner", "ops"), ("tier", "")]
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .into(),
                ..Task::default()
            },
        )
        .expect("merge succeeds");
        assert_eq!(
            merged.labels,
            [("owner", "ops"), ("team", "platform"), ("tier", "")]
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .into()
        );
    }

    #[rstest]
    #[case("", "frontend")]
    #[case("backend", "backend")]
    fn bare_values_only_override_when_non_zero(#[case] overrides: &str, #[case] expected: &str) {
        let merged = merge(
            &task(),
            &Task {
                legacy_name: overrides.to_owned(),
                ..Task::default()
            },
        )
        .expect("merge succeeds");
        assert_eq!(merged.legacy_name, expected);
    }

    #[test]
    fn merge_nested_derived_struct() {
        let base = Service {
            task: task(),
            ..Service::default()
        };
        let merged = merge(
            &base,
            &Service {
                task: Task {
                    cpu: Some(512),
                    ..Task::default()
                },
                ..Service::default()
            },
        )
        .expect("merge succeeds");
        assert_eq!(
            merged.task,
            Task {
                cpu: Some(512),
                ..task()
            }
        );
    }

    #[test]
    fn map_values_are_merged_deeply() {
        let base = Service {
            sidecars: [("nginx".to_owned(), task())].into(),
            ..Service::default()
        };
        let merged = merge(
            &base,
            &Service {
                sidecars: [
                    (
                        "nginx".to_owned(),
                        Task {
                            cpu: Some(128),
                            ..Task::default()
                        },
                    ),
                    ("xray".to_owned(), Task::default()),
                ]
                .into(),
                ..Service::default()
            },
        )
        .expect("merge succeeds");
        assert_eq!(merged.sidecars["nginx"], Task {
            cpu: Some(128),
            ..task()
        });
        assert_eq!(merged.sidecars["xray"], Task::default());
    }

    #[rstest]
    #[case::value_replaces_range(
        Replicas { min: Some(1), max: Some(10), ..Replicas::default() },
        Replicas { value: Some(3), ..Replicas::default() },
        Replicas { value: Some(3), ..Replicas::default() },
    )]
    #[case::range_replaces_value(
        Replicas { value: Some(3), ..Replicas::default() },
        Replicas { max: Some(10), ..Replicas::default() },
        Replicas { max: Some(10), ..Replicas::default() },
    )]
    #[case::range_fields_merge_with_each_other(
        Replicas { min: Some(1), max: Some(10), ..Replicas::default() },
        Replicas { max: Some(20), ..Replicas::default() },
        Replicas { min: Some(1), max: Some(20), ..Replicas::default() },
    )]
    #[case::nothing_set(
        Replicas { value: Some(3), ..Replicas::default() },
        Replicas::default(),
        Replicas { value: Some(3), ..Replicas::default() },
    )]
    #[case::last_alternative_wins_when_both_are_set(
        Replicas { value: Some(3), ..Replicas::default() },
        Replicas { value: Some(4), min: Some(2), max: None },
        Replicas { min: Some(2), ..Replicas::default() },
    )]
    fn exclusive_groups(
        #[case] base: Replicas,
        #[case] overrides: Replicas,
        #[case] expected: Replicas,
    ) {
        assert_eq!(merge(&base, &overrides), Ok(expected));
    }

    #[test]
    fn merging_a_value_with_itself_is_a_no_op() {
        let service = Service {
            task: task(),
            replicas: Replicas {
                min: Some(1),
                max: Some(4),
                ..Replicas::default()
            },
            sidecars: [("nginx".to_owned(), task())].into(),
        };
        assert_eq!(merge(&service, &service), Ok(service));
    }

    #[test]
    fn violations_name_the_path() {
        let service = Service {
            sidecars: [("nginx".to_owned(), task())].into(),
            replicas: Replicas {
                value: Some(1),
                max: Some(2),
                ..Replicas::default()
            },
            ..Service::default()
        };
        let err = service.check_exclusive().expect_err("replicas are invalid");
        assert_eq!(err.path(), "replicas");
        assert_eq!(err.fields(), ("value", "max"));
        assert_eq!(
            err.to_string(),
            r#"replicas: must specify one, not both, of "value" and "max""#
        );
    }

    #[test]
    fn invalid_base_is_reported_as_a_broken_merge() {
        let base = Replicas {
            value: Some(1),
            min: Some(2),
            max: None,
        };
        assert!(matches!(
            merge(&base, &Replicas::default()),
            Err(MergeError::ExclusivityBroken { .. })
        ));
    }

    #[test]
    fn root_violations_have_no_path_prefix() {
        assert_eq!(
            ExclusivityViolation::new("build", "location").to_string(),
            r#"must specify one, not both, of "build" and "location""#
        );
        assert_eq!(
            ExclusivityViolation::new("build", "location")
                .within("image")
                .within("sidecars")
                .path(),
            "sidecars.image"
        );
    }
}
