use serde::{Deserialize, Serialize};

use crate::{
    merge::Merge,
    union::{Union, union_form},
};

/// Topics the service publishes to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    pub topics: Option<Vec<Topic>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Topic {
    pub name: Option<String>,
    pub fifo: FifoTopicConfigOrBool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<bool, FifoTopicConfig>",
    into = "Union<bool, FifoTopicConfig>"
)]
#[merge(exclusive(enable, advanced))]
pub struct FifoTopicConfigOrBool {
    pub enable: Option<bool>,
    pub advanced: FifoTopicConfig,
}

union_form!(FifoTopicConfigOrBool, enable: bool, advanced: FifoTopicConfig);

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct FifoTopicConfig {
    pub content_based_deduplication: Option<bool>,
}

/// Topics a worker subscribes to, and the queue the messages are delivered to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct SubscribeConfig {
    pub topics: Option<Vec<TopicSubscription>>,
    pub queue: SqsQueue,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopicSubscription {
    pub name: Option<String>,
    pub service: Option<String>,
    pub queue: SqsQueueOrBool,
}

/// `queue: true` for a dedicated queue with default settings, or the queue settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(from = "Union<bool, SqsQueue>", into = "Union<bool, SqsQueue>")]
#[merge(exclusive(enabled, advanced))]
pub struct SqsQueueOrBool {
    pub enabled: Option<bool>,
    pub advanced: SqsQueue,
}

union_form!(SqsQueueOrBool, enabled: bool, advanced: SqsQueue);

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct SqsQueue {
    pub retention: Option<String>,
    pub delay: Option<String>,
    pub timeout: Option<String>,
    pub dead_letter: DeadLetterQueue,
    pub fifo: FifoQueueConfigOrBool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct DeadLetterQueue {
    pub tries: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(
    from = "Union<bool, FifoQueueConfig>",
    into = "Union<bool, FifoQueueConfig>"
)]
#[merge(exclusive(enable, advanced))]
pub struct FifoQueueConfigOrBool {
    pub enable: Option<bool>,
    pub advanced: FifoQueueConfig,
}

union_form!(FifoQueueConfigOrBool, enable: bool, advanced: FifoQueueConfig);

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
#[serde(default, deny_unknown_fields)]
pub struct FifoQueueConfig {
    pub content_based_deduplication: Option<bool>,
    pub deduplication_scope: Option<String>,
    pub throughput_limit: Option<String>,
    pub high_throughput: Option<bool>,
}
