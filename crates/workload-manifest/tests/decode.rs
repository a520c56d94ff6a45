use indoc::indoc;
use workload_manifest::{
    DecodeError, FeatureTag, Workload, WorkloadKind, decode, list_required_features,
    manifest::network::PlacementString,
};

const FRONTEND: &str = indoc! {"
    # The customer facing web site
    name: frontend
    type: Load Balanced Web Service

    image:
      build:
        context: .
        dockerfile: ./frontend/Dockerfile
        args:
          GIT_SHA: abc123
      port: 8080
      healthcheck:
        command: [CMD-SHELL, 'curl -f http://localhost:8080/ || exit 1']
        retries: 3

    http:
      path: /
      healthcheck:
        path: /healthz
        healthy_threshold: 2
      alias: [www.example.com, example.com]

    cpu: 512
    memory: 1024
    platform: linux/arm64
    count:
      range: 1-4
      cpu_percentage:
        value: 70
        cooldown:
          in: 60s
          out: 30s
    exec: true

    variables:
      LOG_LEVEL: info
      DB_HOST:
        from_cfn: prod-db-host
    secrets:
      GITHUB_TOKEN: GH_TOKEN
      API_KEY:
        secretsmanager: frontend/api-key

    logging:
      retention: 30
      destination:
        Name: cloudwatch
      enableMetadata: true

    sidecars:
      nginx:
        port: '80'
        image: public.ecr.aws/nginx/nginx:latest
        variables:
          WORKERS: '4'

    network:
      connect: true

    environments:
      test:
        count: 1
        exec: false
      prod:
        http:
          alias:
            - name: example.com
              hosted_zone: Z0123456789
        network:
          vpc:
            placement: private
"};

#[test]
fn full_web_service() {
    let workload = decode(FRONTEND.as_bytes()).expect("manifest is valid");
    assert_eq!(workload.kind(), WorkloadKind::LoadBalancedWebService);
    assert_eq!(workload.name(), Some("frontend"));
    assert_eq!(workload.environment_names(), ["prod", "test"]);

    let Workload::LoadBalancedWebService(manifest) = &workload else {
        panic!("expected a Load Balanced Web Service");
    };
    let config = &manifest.config;

    assert_eq!(
        config.image.build.build_args.dockerfile.as_deref(),
        Some("./frontend/Dockerfile")
    );
    assert_eq!(config.image.healthcheck.retries, Some(3));
    assert_eq!(config.http.rule.alias.names(), ["www.example.com", "example.com"]);
    assert_eq!(config.task.platform.os(), Some("linux"));
    assert_eq!(config.task.count.advanced.range.bounds(), Some((1, 4)));
    assert_eq!(config.task.count.advanced.cpu_percentage.target(), Some(&70));
    assert!(config.task.exec.is_enabled());
    assert!(config.task.variables["DB_HOST"].is_advanced());
    assert!(config.task.secrets["API_KEY"].is_secrets_manager_name());
    assert_eq!(config.logging.enable_metadata, Some(true));
    assert_eq!(
        config.sidecars["nginx"].image_location(),
        Some("public.ecr.aws/nginx/nginx:latest")
    );
    assert!(config.network.connect.is_enabled());

    let test = workload.apply_environment("test").expect("merge succeeds");
    assert_eq!(test.task().count.value, Some(1));
    assert!(test.task().count.advanced.range.bounds().is_none());
    assert!(!test.task().exec.is_enabled());
    assert_eq!(list_required_features(&test), [FeatureTag::AlbWorkloads]);

    let prod = workload.apply_environment("prod").expect("merge succeeds");
    assert_eq!(prod.network().placement(), Some(PlacementString::Private));
    assert_eq!(prod.task().count, config.task.count);
    assert_eq!(
        list_required_features(&prod),
        [FeatureTag::NatWorkloads, FeatureTag::AlbWorkloads]
    );
}

#[test]
fn worker_subscribing_to_topics() {
    let workload = decode(indoc! {b"
        name: orders
        type: Worker Service
        image:
          location: orders:latest
        subscribe:
          topics:
            - name: created
              service: api
              queue:
                dead_letter:
                  tries: 5
            - name: cancelled
              service: api
          queue:
            retention: 96h
            fifo: true
        environments:
          prod:
            count:
              queue_delay:
                acceptable_latency: 1m
                msg_processing_time: 250ms
    "})
    .expect("manifest is valid");

    let Workload::WorkerService(manifest) = &workload else {
        panic!("expected a Worker Service");
    };
    let topics = manifest
        .config
        .subscribe
        .topics
        .as_deref()
        .expect("topics are set");
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].queue.advanced.dead_letter.tries, Some(5));
    assert_eq!(manifest.config.subscribe.queue.retention.as_deref(), Some("96h"));

    let prod = workload.apply_environment("prod").expect("merge succeeds");
    assert!(prod.task().count.advanced.has_autoscaling());
}

#[test]
fn scheduled_job() {
    let workload = decode(indoc! {b"
        name: report
        type: Scheduled Job
        image:
          build: ./Dockerfile
        on:
          schedule: '@daily'
        timeout: 1h
        retries: 3
        environments:
          prod:
            on:
              schedule: '0 4 * * *'
    "})
    .expect("manifest is valid");

    let Workload::ScheduledJob(manifest) = &workload else {
        panic!("expected a Scheduled Job");
    };
    assert_eq!(manifest.config.on.schedule, "@daily");
    assert_eq!(manifest.config.retries, Some(3));

    let prod = workload.apply_environment("prod").expect("merge succeeds");
    assert_eq!(prod.kind(), WorkloadKind::ScheduledJob);
    let test = workload.apply_environment("test").expect("merge succeeds");
    assert!(test.is_base());
}

#[test]
fn error_messages_name_the_manifest_type() {
    let err = decode(indoc! {b"
        type: Backend Service
        image:
          build: ./Dockerfile
          location: nginx
    "})
    .expect_err("both image sources are set");

    assert!(matches!(err, DecodeError::MutualExclusivity { .. }));
    assert_eq!(err.to_string(), "invalid Backend Service manifest");
    let source = std::error::Error::source(&err).expect("error has a source");
    assert_eq!(
        source.to_string(),
        r#"image: must specify one, not both, of "build" and "location""#
    );
}

#[test]
fn error_messages_name_the_field_path() {
    let err = decode(indoc! {b"
        name: api
        type: Load Balanced Web Service
        image:
          location: nginx
        variables:
          PORT: 8080
        environments:
          prod:
            platform:
              osfamily: linux
              architecture: [x86_64]
    "})
    .expect_err("architecture is not a string");

    assert!(matches!(err, DecodeError::DeserializeEnvironment { .. }));
    assert_eq!(
        err.to_string(),
        r#"failed to unmarshal the overrides of environment "prod""#
    );
    let source = std::error::Error::source(&err).expect("error has a source");
    assert_eq!(
        source.to_string(),
        "platform: architecture: invalid type: sequence, expected a string"
    );
}
