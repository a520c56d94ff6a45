use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    manifest::common::StringOrSlice,
    merge::{Atomic, Merge},
    union::{Union, union_form},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub vpc: VpcConfig,
    pub connect: ServiceConnectBoolOrArgs,
}

impl NetworkConfig {
    /// The placement shorthand, if the subnets were not picked explicitly
    pub fn placement(&self) -> Option<PlacementString> {
        self.vpc.placement.placement_string
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct VpcConfig {
    pub placement: PlacementArgOrString,
    pub security_groups: Option<Vec<String>>,
}

/// Which kind of subnets the tasks are placed in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlacementString {
    Public,
    Private,
}

impl Atomic for PlacementString {}

/// `placement: private`, or the subnets spelled out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<PlacementString, PlacementArgs>",
    into = "Union<PlacementString, PlacementArgs>"
)]
#[merge(exclusive(placement_string, placement_args))]
pub struct PlacementArgOrString {
    pub placement_string: Option<PlacementString>,
    pub placement_args: PlacementArgs,
}

union_form!(PlacementArgOrString, placement_string: PlacementString, placement_args: PlacementArgs);

impl PlacementArgOrString {
    pub const fn from_string(placement: PlacementString) -> Self {
        Self {
            placement_string: Some(placement),
            placement_args: PlacementArgs {
                subnets: SubnetListOrArgs {
                    ids: None,
                    subnet_args: SubnetArgs {
                        from_tags: BTreeMap::new(),
                    },
                },
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementArgs {
    pub subnets: SubnetListOrArgs,
}

/// A list of subnet IDs, or tags to look the subnets up by.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<Vec<String>, SubnetArgs>",
    into = "Union<Vec<String>, SubnetArgs>"
)]
#[merge(exclusive(ids, subnet_args))]
pub struct SubnetListOrArgs {
    pub ids: Option<Vec<String>>,
    pub subnet_args: SubnetArgs,
}

union_form!(SubnetListOrArgs, ids: Vec<String>, subnet_args: SubnetArgs);

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct SubnetArgs {
    pub from_tags: BTreeMap<String, StringOrSlice>,
}

/// `connect: true`, or the alias to register the service under.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<bool, ServiceConnectArgs>",
    into = "Union<bool, ServiceConnectArgs>"
)]
#[merge(exclusive(enable, args))]
pub struct ServiceConnectBoolOrArgs {
    pub enable: Option<bool>,
    pub args: ServiceConnectArgs,
}

union_form!(ServiceConnectBoolOrArgs, enable: bool, args: ServiceConnectArgs);

impl ServiceConnectBoolOrArgs {
    pub fn is_enabled(&self) -> bool {
        self.enable.unwrap_or_else(|| !self.args.is_zero())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConnectArgs {
    pub alias: Option<String>,
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::{
        NetworkConfig, PlacementArgOrString, PlacementArgs, PlacementString, ServiceConnectArgs,
        ServiceConnectBoolOrArgs, SubnetArgs, SubnetListOrArgs,
    };
    use crate::{manifest::common::StringOrSlice, merge::merge};

    fn tagged_subnets() -> PlacementArgOrString {
        PlacementArgOrString {
            placement_string: None,
            placement_args: PlacementArgs {
                subnets: SubnetListOrArgs {
                    ids: None,
                    subnet_args: SubnetArgs {
                        from_tags: [("tier".to_owned(), StringOrSlice::from_string("app"))].into(),
                    },
                },
            },
        }
    }

    fn subnet_ids() -> PlacementArgOrString {
        PlacementArgOrString {
            placement_string: None,
            placement_args: PlacementArgs {
                subnets: SubnetListOrArgs {
                    ids: Some(vec!["subnet-1".to_owned(), "subnet-2".to_owned()]),
                    subnet_args: SubnetArgs::default(),
                },
            },
        }
    }

    #[rstest]
    #[case::args_clear_string(
        PlacementArgOrString::from_string(PlacementString::Public),
        tagged_subnets(),
        tagged_subnets()
    )]
    #[case::string_clears_args(
        tagged_subnets(),
        PlacementArgOrString::from_string(PlacementString::Private),
        PlacementArgOrString::from_string(PlacementString::Private)
    )]
    #[case::ids_clear_tags(tagged_subnets(), subnet_ids(), subnet_ids())]
    #[case::tags_clear_ids(subnet_ids(), tagged_subnets(), tagged_subnets())]
    #[case::nothing_set(subnet_ids(), PlacementArgOrString::default(), subnet_ids())]
    fn merge_placement(
        #[case] base: PlacementArgOrString,
        #[case] overrides: PlacementArgOrString,
        #[case] expected: PlacementArgOrString,
    ) {
        assert_eq!(merge(&base, &overrides), Ok(expected));
    }

    #[rstest]
    #[case::bool_clears_args(
        ServiceConnectBoolOrArgs { enable: None, args: ServiceConnectArgs { alias: Some("api".to_owned()) } },
        ServiceConnectBoolOrArgs { enable: Some(false), args: ServiceConnectArgs::default() },
        ServiceConnectBoolOrArgs { enable: Some(false), args: ServiceConnectArgs::default() },
    )]
    #[case::args_clear_bool(
        ServiceConnectBoolOrArgs { enable: Some(true), args: ServiceConnectArgs::default() },
        ServiceConnectBoolOrArgs { enable: None, args: ServiceConnectArgs { alias: Some("api".to_owned()) } },
        ServiceConnectBoolOrArgs { enable: None, args: ServiceConnectArgs { alias: Some("api".to_owned()) } },
    )]
    fn merge_service_connect(
        #[case] base: ServiceConnectBoolOrArgs,
        #[case] overrides: ServiceConnectBoolOrArgs,
        #[case] expected: ServiceConnectBoolOrArgs,
    ) {
        assert_eq!(merge(&base, &overrides), Ok(expected));
    }

    #[test]
    fn deserialize_network() {
        let network: NetworkConfig = serde_yaml::from_str(indoc! {"
            vpc:
              placement: private
              security_groups: [sg-1]
            connect: true
        "})
        .expect("input is valid");
        assert_eq!(network.placement(), Some(PlacementString::Private));
        assert!(network.connect.is_enabled());

        let network: NetworkConfig = serde_yaml::from_str(indoc! {"
            vpc:
              placement:
                subnets:
                  from_tags:
                    tier: app
        "})
        .expect("input is valid");
        assert_eq!(network.vpc.placement, tagged_subnets());
        assert_eq!(network.placement(), None);
        assert!(!network.connect.is_enabled());
    }

    #[test]
    fn unknown_placement_is_rejected() {
        let err = serde_yaml::from_str::<NetworkConfig>("vpc: {placement: somewhere}")
            .expect_err("placement is invalid");
        assert!(err.to_string().contains("unknown variant `somewhere`"), "{err}");
    }

    #[test]
    fn placement_string_forms() {
        assert_eq!("private".parse(), Ok(PlacementString::Private));
        assert_eq!(PlacementString::Public.to_string(), "public");
    }
}
