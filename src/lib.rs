//! bag-frames
//!
//! Extracts camera frames from recorded ROS sensor logs into per-topic
//! directories of JPEG files.
//!
//! # Module structure
//!
//! - `record`: raw records and the `RecordSource` contract
//! - `source`: concrete containers (mcap, rosbag2 sqlite) and format sniffing
//! - `classify`: which topics carry image records
//! - `decode`: the image record binary decoder (the core)
//! - `pipeline`: the extraction pass and per-topic accounting
//! - `sink`: frame persistence (`FrameSink`, JPEG implementation)
//!
//! Data flows strictly one way: raw bytes in, typed frame out, file on disk
//! as the terminal side effect. Decoding is pure; only the pipeline holds
//! state across records (its per-topic counters). Filenames embed the
//! per-topic success counter, so the pass is a single ordered fold — parallel
//! decoding would have to serialize on that counter.

pub mod classify;
pub mod decode;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod source;

pub use classify::classify_image_topics;
pub use decode::{decode_image_record, DecodeError, DecodedFrame, ImageEncoding};
pub use pipeline::{ExtractionPipeline, ExtractionSummary, PipelineOptions, TopicStats};
pub use record::{RawRecord, RecordSource, TopicMeta};
pub use sink::{topic_dir_name, FrameSink, JpegSink};
pub use source::{Db3Source, LogFormat, McapSource};
