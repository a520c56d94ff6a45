use std::collections::BTreeMap;

use darling::{
    FromDeriveInput, FromField, FromMeta,
    ast::{Data, NestedMeta},
    util::{Ignored, PathList},
};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DeriveInput, Generics, Meta, Path, WherePredicate, parse_quote};

#[derive(FromMeta)]
struct PathOverrides {
    #[darling(default = "PathOverrides::default_merge")]
    merge: Path,
    #[darling(default = "PathOverrides::default_registry")]
    registry: Path,
}
impl Default for PathOverrides {
    fn default() -> Self {
        Self {
            merge: Self::default_merge(),
            registry: Self::default_registry(),
        }
    }
}
impl PathOverrides {
    fn default_merge() -> Path {
        parse_quote!(::workload_manifest::merge)
    }

    fn default_registry() -> Path {
        parse_quote!(::workload_manifest::registry)
    }
}

/// One `exclusive(...)` declaration
struct ExclusiveGroup {
    alternatives: Vec<Alternative>,
}

struct Alternative {
    name: String,
    fields: Vec<Ident>,
}

impl FromMeta for ExclusiveGroup {
    fn from_list(items: &[NestedMeta]) -> darling::Result<Self> {
        let alternatives = items
            .iter()
            .map(Alternative::from_nested_meta)
            .collect::<darling::Result<Vec<_>>>()?;
        if alternatives.len() < 2 {
            return Err(darling::Error::too_few_items(2));
        }
        Ok(Self { alternatives })
    }
}

impl Alternative {
    fn from_nested_meta(item: &NestedMeta) -> darling::Result<Self> {
        match item {
            // exclusive(field, ...)
            NestedMeta::Meta(Meta::Path(path)) => {
                let field = path.require_ident()?.clone();
                Ok(Self {
                    name: field.to_string(),
                    fields: vec![field],
                })
            }
            // exclusive(name(field, field), ...)
            NestedMeta::Meta(meta @ Meta::List(list)) => {
                let name = list.path.require_ident()?.to_string();
                let fields = PathList::from_meta(meta)?
                    .iter()
                    .map(|path| path.require_ident().cloned())
                    .collect::<syn::Result<Vec<_>>>()?;
                if fields.is_empty() {
                    return Err(darling::Error::too_few_items(1).with_span(meta));
                }
                Ok(Self { name, fields })
            }
            NestedMeta::Meta(meta @ Meta::NameValue(_)) => {
                Err(darling::Error::unsupported_format("name-value").with_span(meta))
            }
            NestedMeta::Lit(lit) => Err(darling::Error::unexpected_lit_type(lit)),
        }
    }
}

#[derive(FromDeriveInput)]
#[darling(attributes(merge), supports(struct_named))]
struct MergeInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, MergeField>,
    #[darling(default)]
    path_overrides: PathOverrides,
    #[darling(default)]
    bound: Option<Vec<WherePredicate>>,
    #[darling(multiple)]
    exclusive: Vec<ExclusiveGroup>,
}

#[derive(FromField)]
#[darling(attributes(merge))]
struct MergeField {
    ident: Option<Ident>,
    #[darling(default)]
    inline: bool,
}

pub fn derive(input: DeriveInput) -> TokenStream {
    let MergeInput {
        ident,
        mut generics,
        data,
        path_overrides:
            PathOverrides {
                merge: merge_mod,
                registry: registry_mod,
            },
        bound,
        exclusive: groups,
    } = match MergeInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };
    let fields = match data {
        Data::Struct(fields) => fields.fields,
        Data::Enum(_) => {
            return quote! {
                compile_error!("`#[derive(Merge)]` does not support enums");
            };
        }
    };
    let fields = fields
        .into_iter()
        .filter_map(|field| field.ident.map(|ident| (ident, field.inline)))
        .collect::<Vec<_>>();

    if let Err(err) = check_groups(&fields, &groups) {
        return err.write_errors();
    }
    let grouped = groups
        .iter()
        .flat_map(|group| &group.alternatives)
        .flat_map(|alternative| &alternative.fields)
        .collect::<Vec<_>>();

    let group_merges = groups
        .iter()
        .map(|group| merge_group(group, &merge_mod))
        .collect::<TokenStream>();
    let transparent_merges = fields
        .iter()
        .filter(|(field, _)| !grouped.contains(&field))
        .map(|(field, _)| {
            quote! {
                #merge_mod::Merge::merge(&mut self.#field, &overrides.#field);
            }
        })
        .collect::<TokenStream>();
    let field_idents = fields.iter().map(|(field, _)| field).collect::<Vec<_>>();
    let field_names = field_idents
        .iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>();

    let group_checks = groups
        .iter()
        .map(|group| check_group(group, &merge_mod))
        .collect::<TokenStream>();
    let field_checks = fields
        .iter()
        .map(|(field, inline)| {
            if *inline {
                quote! {
                    #merge_mod::Merge::check_exclusive(&self.#field)?;
                }
            } else {
                let name = field.to_string();
                quote! {
                    #merge_mod::Merge::check_exclusive(&self.#field)
                        .map_err(|err| err.within(#name))?;
                }
            }
        })
        .collect::<TokenStream>();

    let registry_groups = groups
        .iter()
        .map(|group| {
            let alternatives = group
                .alternatives
                .iter()
                .map(|Alternative { name, fields }| {
                    let fields = fields.iter().map(ToString::to_string);
                    quote! {
                        #registry_mod::Alternative {
                            name: #name,
                            fields: &[#(#fields),*],
                        },
                    }
                })
                .collect::<TokenStream>();
            quote! {
                #registry_mod::ExclusiveGroup {
                    alternatives: &[#alternatives],
                },
            }
        })
        .collect::<TokenStream>();

    if let Some(bound) = bound {
        let where_clause = generics.make_where_clause();
        where_clause.predicates.extend(bound);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let type_name = ident.to_string();
    quote! {
        impl #impl_generics #merge_mod::Merge for #ident #ty_generics #where_clause {
            fn merge(&mut self, overrides: &Self) {
                #group_merges
                #transparent_merges
            }

            fn is_zero(&self) -> bool {
                true #(&& #merge_mod::Merge::is_zero(&self.#field_idents))*
            }

            fn check_exclusive(
                &self,
            ) -> ::core::result::Result<(), #merge_mod::ExclusivityViolation> {
                #group_checks
                #field_checks
                ::core::result::Result::Ok(())
            }
        }

        impl #impl_generics #registry_mod::Composite for #ident #ty_generics #where_clause {
            const NAME: &'static str = #type_name;
            const FIELDS: &'static [&'static str] = &[#(#field_names),*];
            const EXCLUSIVE_GROUPS: &'static [#registry_mod::ExclusiveGroup] = &[#registry_groups];
        }
    }
}

/// Rejects groups that refer to unknown fields, or fields that are part of several groups
fn check_groups(fields: &[(Ident, bool)], groups: &[ExclusiveGroup]) -> darling::Result<()> {
    let mut errors = darling::Error::accumulator();
    let mut seen = BTreeMap::<String, usize>::new();
    for (group_index, group) in groups.iter().enumerate() {
        for field in group.alternatives.iter().flat_map(|alt| &alt.fields) {
            if !fields.iter().any(|(known, _)| known == field) {
                errors.push(darling::Error::unknown_field(&field.to_string()).with_span(field));
                continue;
            }
            match seen.insert(field.to_string(), group_index) {
                Some(previous) if previous != group_index => errors.push(
                    darling::Error::custom(format!(
                        "field `{field}` is part of more than one exclusive group"
                    ))
                    .with_span(field),
                ),
                Some(_) => errors.push(
                    darling::Error::custom(format!(
                        "field `{field}` is listed twice in the same exclusive group"
                    ))
                    .with_span(field),
                ),
                None => {}
            }
        }
    }
    errors.finish()
}

/// Overrides that set an alternative clear all of its siblings before being merged in
fn merge_group(group: &ExclusiveGroup, merge_mod: &Path) -> TokenStream {
    group
        .alternatives
        .iter()
        .enumerate()
        .map(|(index, alternative)| {
            let fields = &alternative.fields;
            let siblings = group
                .alternatives
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .flat_map(|(_, other)| &other.fields);
            quote! {
                if false #(|| !#merge_mod::Merge::is_zero(&overrides.#fields))* {
                    #(self.#siblings = ::core::default::Default::default();)*
                    #(#merge_mod::Merge::merge(&mut self.#fields, &overrides.#fields);)*
                }
            }
        })
        .collect()
}

/// Fails with the first two set alternatives, each represented by its first set field
fn check_group(group: &ExclusiveGroup, merge_mod: &Path) -> TokenStream {
    let set_alternatives = group.alternatives.iter().map(|alternative| {
        let fields = &alternative.fields;
        let names = fields.iter().map(ToString::to_string);
        quote! {
            ::core::option::Option::None
                #(.or_else(|| (!#merge_mod::Merge::is_zero(&self.#fields)).then_some(#names)))*
        }
    });
    quote! {
        {
            let mut set = [#(#set_alternatives),*].into_iter().flatten();
            if let (::core::option::Option::Some(first), ::core::option::Option::Some(second)) =
                (set.next(), set.next())
            {
                return ::core::result::Result::Err(
                    #merge_mod::ExclusivityViolation::new(first, second),
                );
            }
        }
    }
}
