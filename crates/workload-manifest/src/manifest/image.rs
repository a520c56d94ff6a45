use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    manifest::common::ContainerHealthCheck,
    merge::Merge,
    union::{Union, union_form},
};

/// The main container image, either built from source or pulled from an existing location.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
#[merge(exclusive(build, location))]
pub struct ImageConfig {
    pub build: BuildArgsOrString,
    pub location: Option<String>,
    pub credentials: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub depends_on: BTreeMap<String, String>,
    pub port: Option<u16>,
    pub healthcheck: ContainerHealthCheck,
}

impl ImageConfig {
    pub fn from_location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn from_dockerfile(dockerfile: impl Into<String>) -> Self {
        Self {
            build: BuildArgsOrString::from_string(dockerfile),
            ..Self::default()
        }
    }
}

/// Sidecar images only carry the location or build instructions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
#[merge(exclusive(build, location))]
pub struct ImageLocationOrBuild {
    pub build: BuildArgsOrString,
    pub location: Option<String>,
}

/// `build: path/to/Dockerfile`, or detailed docker build arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<String, DockerBuildArgs>",
    into = "Union<String, DockerBuildArgs>"
)]
#[merge(exclusive(build_string, build_args))]
pub struct BuildArgsOrString {
    pub build_string: Option<String>,
    pub build_args: DockerBuildArgs,
}

union_form!(BuildArgsOrString, build_string: String, build_args: DockerBuildArgs);

impl BuildArgsOrString {
    pub fn from_string(dockerfile: impl Into<String>) -> Self {
        Self {
            build_string: Some(dockerfile.into()),
            build_args: DockerBuildArgs::default(),
        }
    }

    /// Path to the Dockerfile, whichever form was used
    pub fn dockerfile(&self) -> Option<&str> {
        self.build_string
            .as_deref()
            .or(self.build_args.dockerfile.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct DockerBuildArgs {
    pub context: Option<String>,
    pub dockerfile: Option<String>,
    pub args: BTreeMap<String, String>,
    pub target: Option<String>,
    pub cache_from: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::{BuildArgsOrString, DockerBuildArgs, ImageConfig};
    use crate::merge::{Merge, merge};

    fn build_args() -> BuildArgsOrString {
        BuildArgsOrString {
            build_string: None,
            build_args: DockerBuildArgs {
                context: Some(".".to_owned()),
                dockerfile: Some("./Dockerfile".to_owned()),
                args: [("GO_VERSION".to_owned(), "1.22".to_owned())].into(),
                ..DockerBuildArgs::default()
            },
        }
    }

    #[test]
    fn location_clears_build() {
        let base = ImageConfig {
            port: Some(80),
            ..ImageConfig::from_dockerfile("./Dockerfile")
        };
        let merged = merge(&base, &ImageConfig::from_location("123.dkr.ecr/repo:tag"))
            .expect("merge succeeds");
        assert_eq!(merged, ImageConfig {
            port: Some(80),
            ..ImageConfig::from_location("123.dkr.ecr/repo:tag")
        });
    }

    #[test]
    fn build_clears_location() {
        let merged = merge(
            &ImageConfig::from_location("nginx:latest"),
            &ImageConfig::from_dockerfile("./Dockerfile"),
        )
        .expect("merge succeeds");
        assert_eq!(merged, ImageConfig::from_dockerfile("./Dockerfile"));
    }

    #[test]
    fn unrelated_overrides_keep_the_image_source() {
        let merged = merge(&ImageConfig::from_dockerfile("./Dockerfile"), &ImageConfig {
            credentials: Some("arn:secret".to_owned()),
            ..ImageConfig::default()
        })
        .expect("merge succeeds");
        assert_eq!(merged.build.dockerfile(), Some("./Dockerfile"));
        assert_eq!(merged.credentials.as_deref(), Some("arn:secret"));
    }

    #[rstest]
    #[case::args_clear_string(BuildArgsOrString::from_string("./Dockerfile"), build_args(), build_args())]
    #[case::string_clears_args(
        build_args(),
        BuildArgsOrString::from_string("./other/Dockerfile"),
        BuildArgsOrString::from_string("./other/Dockerfile")
    )]
    #[case::args_merge_into_args(
        build_args(),
        BuildArgsOrString {
            build_string: None,
            build_args: DockerBuildArgs { target: Some("prod".to_owned()), ..DockerBuildArgs::default() },
        },
        BuildArgsOrString {
            build_string: None,
            build_args: DockerBuildArgs { target: Some("prod".to_owned()), ..build_args().build_args },
        },
    )]
    #[case::nothing_set(build_args(), BuildArgsOrString::default(), build_args())]
    fn merge_build_args(
        #[case] base: BuildArgsOrString,
        #[case] overrides: BuildArgsOrString,
        #[case] expected: BuildArgsOrString,
    ) {
        assert_eq!(merge(&base, &overrides), Ok(expected));
    }

    #[test]
    fn deserialize_both_build_forms() {
        let image: ImageConfig = serde_yaml::from_str(indoc! {"
            build:
              context: .
              dockerfile: ./Dockerfile
              args:
                GO_VERSION: '1.22'
            port: 80
        "})
        .expect("input is valid");
        assert_eq!(image.build, build_args());
        assert_eq!(image.port, Some(80));

        let image: ImageConfig =
            serde_yaml::from_str("build: ./Dockerfile").expect("input is valid");
        assert_eq!(image, ImageConfig::from_dockerfile("./Dockerfile"));
    }

    #[test]
    fn both_build_and_location_are_rejected() {
        let image: ImageConfig = serde_yaml::from_str(indoc! {"
            build: ./Dockerfile
            location: nginx
        "})
        .expect("input is syntactically valid");
        let err = image.check_exclusive().expect_err("build and location are exclusive");
        assert_eq!(err.fields(), ("build", "location"));
    }
}
