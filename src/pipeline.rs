//! Extraction pipeline.
//!
//! Drives one sequential pass over a record source, decoding every record on
//! a classified image topic and handing decoded frames to the sink. The
//! pipeline owns the per-topic counters for the duration of one run; decode
//! and sink failures are local to a record and only show up as the gap
//! between `attempted` and `succeeded`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::decode::decode_image_record;
use crate::record::{RawRecord, RecordSource};
use crate::sink::{topic_dir_name, FrameSink};

/// Per-topic extraction counters for one run.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TopicStats {
    pub topic: String,
    pub attempted: u64,
    pub succeeded: u64,
}

impl TopicStats {
    fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            attempted: 0,
            succeeded: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted as f64 * 100.0
        }
    }
}

/// Pipeline settings.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Root directory; each image topic gets one subdirectory.
    pub output_root: PathBuf,
    /// Stop persisting frames for a topic once it has this many successes.
    pub max_per_topic: Option<u64>,
    /// Report at most this many decode failures per topic verbosely.
    pub failure_log_limit: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("extracted_images"),
            max_per_topic: None,
            failure_log_limit: 5,
        }
    }
}

/// Final accounting for one extraction run.
#[derive(Clone, Debug, Serialize)]
pub struct ExtractionSummary {
    pub topics: Vec<TopicStats>,
    pub total_attempted: u64,
    pub total_succeeded: u64,
}

impl ExtractionSummary {
    pub fn overall_success_rate(&self) -> f64 {
        if self.total_attempted == 0 {
            0.0
        } else {
            self.total_succeeded as f64 / self.total_attempted as f64 * 100.0
        }
    }
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extraction completed:")?;
        writeln!(f, "{}", "-".repeat(50))?;
        for stats in &self.topics {
            writeln!(f, "{}:", stats.topic)?;
            writeln!(f, "  Attempted: {}", stats.attempted)?;
            writeln!(f, "  Successful: {}", stats.succeeded)?;
            writeln!(f, "  Success rate: {:.1}%", stats.success_rate())?;
        }
        writeln!(f)?;
        writeln!(f, "Overall:")?;
        writeln!(f, "  Total attempted: {}", self.total_attempted)?;
        writeln!(f, "  Total extracted: {}", self.total_succeeded)?;
        writeln!(f, "  Overall success rate: {:.1}%", self.overall_success_rate())
    }
}

/// One-shot extraction run over a record source.
pub struct ExtractionPipeline<S: FrameSink> {
    sink: S,
    options: PipelineOptions,
    stats: BTreeMap<String, TopicStats>,
}

impl<S: FrameSink> ExtractionPipeline<S> {
    pub fn new(sink: S, options: PipelineOptions) -> Self {
        Self {
            sink,
            options,
            stats: BTreeMap::new(),
        }
    }

    /// Run the full pass. Records on topics outside `image_topics` are
    /// ignored entirely (not counted). A source error is fatal and
    /// propagates; decode and sink failures are counted and skipped.
    pub fn run(
        &mut self,
        source: &mut dyn RecordSource,
        image_topics: &BTreeSet<String>,
    ) -> Result<ExtractionSummary> {
        // Pre-seed so topics with zero decodable records still appear.
        for topic in image_topics {
            self.stats.insert(topic.clone(), TopicStats::new(topic));
        }
        source.for_each_record(&mut |record| {
            self.process(record);
            Ok(())
        })?;
        Ok(self.summary())
    }

    fn process(&mut self, record: RawRecord) {
        let Some(stats) = self.stats.get_mut(&record.topic) else {
            return;
        };
        if let Some(max) = self.options.max_per_topic {
            if stats.succeeded >= max {
                return;
            }
        }
        stats.attempted += 1;

        let frame = match decode_image_record(&record.bytes) {
            Ok(frame) => frame,
            Err(err) => {
                // Only the first few failures per topic are reported
                // verbosely; the counters carry the rest.
                if stats.attempted - stats.succeeded <= self.options.failure_log_limit {
                    log::warn!(
                        "failed to decode record {} on {}: {}",
                        stats.attempted,
                        record.topic,
                        err
                    );
                }
                return;
            }
        };

        // The sequence number is the success count BEFORE incrementing:
        // gap-free over successes and stable across re-runs.
        let timestamp_sec = record.timestamp_ns as f64 / 1e9;
        let filename = format!("image_{:04}_{:.3}.jpg", stats.succeeded, timestamp_sec);
        let path = self
            .options
            .output_root
            .join(topic_dir_name(&record.topic))
            .join(filename);

        match self.sink.write(&frame, &path) {
            Ok(()) => {
                stats.succeeded += 1;
                if stats.succeeded % 50 == 0 {
                    log::info!("{}: saved {} images", record.topic, stats.succeeded);
                }
            }
            Err(err) => {
                // Decoded fine but not persisted: counted as non-success.
                log::error!("failed to save frame from {}: {:#}", record.topic, err);
            }
        }
    }

    /// Access the sink (e.g., to inspect collected frames in tests).
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn summary(&self) -> ExtractionSummary {
        let topics: Vec<TopicStats> = self.stats.values().cloned().collect();
        let total_attempted = topics.iter().map(|t| t.attempted).sum();
        let total_succeeded = topics.iter().map(|t| t.succeeded).sum();
        ExtractionSummary {
            topics,
            total_attempted,
            total_succeeded,
        }
    }
}
