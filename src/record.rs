//! Raw records and the record source contract.
//!
//! A record source wraps one opened log container and exposes:
//! - topic metadata (name, declared message type, record count)
//! - a single ordered pass over every record in the container
//!
//! Sources yield raw serialized bytes; interpretation is the decoder's job.

use anyhow::Result;

/// Metadata for one distinct topic in a log container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicMeta {
    /// Topic name (e.g., `/camera/color/image_raw`).
    pub name: String,
    /// Declared message type name (e.g., `sensor_msgs/msg/Image`).
    pub declared_type: String,
    /// Number of records on this topic.
    pub count: u64,
}

/// One record from a log container. Produced once, consumed exactly once.
#[derive(Clone, Debug)]
pub struct RawRecord {
    pub topic: String,
    /// Record timestamp in nanoseconds since epoch.
    pub timestamp_ns: u64,
    pub declared_type: String,
    /// Raw serialized message payload.
    pub bytes: Vec<u8>,
}

/// A readable log container.
///
/// `for_each_record` drives exactly one ordered pass over the full log.
/// An error from the visitor or from the underlying container aborts the
/// pass and propagates to the caller.
pub trait RecordSource {
    /// Metadata for every distinct topic in the container.
    fn topics(&mut self) -> Result<Vec<TopicMeta>>;

    /// Visit every record in original record order.
    fn for_each_record(&mut self, visit: &mut dyn FnMut(RawRecord) -> Result<()>) -> Result<()>;
}
