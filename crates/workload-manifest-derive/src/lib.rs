use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod merge;

/// Derives [`Merge`](trait.Merge.html) and [`Composite`](trait.Composite.html) for a struct with
/// named fields.
///
/// Every field is merged recursively using its own `Merge` implementation. Fields can be grouped
/// into exclusive groups, in which at most one alternative may be set at a time:
///
/// ```
/// # use workload_manifest::merge::Merge;
/// #[derive(Clone, Debug, Default, PartialEq, Merge)]
/// #[merge(exclusive(value, autoscaling(min, max)))]
/// struct Replicas {
///     value: Option<u32>,
///     min: Option<u32>,
///     max: Option<u32>,
/// }
/// ```
///
/// When the overrides set an alternative, every other alternative of the same group is cleared
/// before the set one is merged. Alternatives are evaluated in declaration order.
///
/// # Attributes
///
/// - `#[merge(exclusive(...))]`: declares an exclusive group, may be repeated. Each entry is either
///   a field name or `name(field, ...)` for an alternative made up of several fields.
/// - `#[merge(bound = "T: Atomic")]`: extra where-predicates for the generated impls.
/// - `#[merge(path_overrides(merge = "...", registry = "..."))]`: module paths used by the generated
///   code, for use inside of `workload_manifest` itself.
/// - `#[merge(inline)]` on a field: leaves the field name out of error paths, for fields that are
///   flattened into their parent.
#[proc_macro_derive(Merge, attributes(merge))]
pub fn derive_merge(input: TokenStream) -> TokenStream {
    merge::derive(parse_macro_input!(input as DeriveInput)).into()
}
