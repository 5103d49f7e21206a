//! MCAP record source.
//!
//! The whole container is read into memory and streamed with
//! [`mcap::MessageStream`]; chunk decompression is handled by the crate. The
//! declared type of a topic is its channel's schema name.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::record::{RawRecord, RecordSource, TopicMeta};

pub struct McapSource {
    buf: Vec<u8>,
}

impl McapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let buf = std::fs::read(path)
            .with_context(|| format!("read mcap container {}", path.display()))?;
        Ok(Self { buf })
    }
}

fn declared_type(channel: &::mcap::Channel) -> String {
    channel
        .schema
        .as_ref()
        .map(|schema| schema.name.clone())
        .unwrap_or_default()
}

impl RecordSource for McapSource {
    fn topics(&mut self) -> Result<Vec<TopicMeta>> {
        let mut by_topic: BTreeMap<String, (String, u64)> = BTreeMap::new();
        let stream = ::mcap::MessageStream::new(&self.buf).context("open mcap stream")?;
        for message in stream {
            let message = message.context("read mcap message")?;
            let entry = by_topic
                .entry(message.channel.topic.clone())
                .or_insert_with(|| (declared_type(&message.channel), 0));
            entry.1 += 1;
        }
        Ok(by_topic
            .into_iter()
            .map(|(name, (declared_type, count))| TopicMeta {
                name,
                declared_type,
                count,
            })
            .collect())
    }

    fn for_each_record(&mut self, visit: &mut dyn FnMut(RawRecord) -> Result<()>) -> Result<()> {
        let stream = ::mcap::MessageStream::new(&self.buf).context("open mcap stream")?;
        for message in stream {
            let message = message.context("read mcap message")?;
            let record = RawRecord {
                topic: message.channel.topic.clone(),
                timestamp_ns: message.log_time,
                declared_type: declared_type(&message.channel),
                bytes: message.data.into_owned(),
            };
            visit(record)?;
        }
        Ok(())
    }
}
