//! rosbag2 SQLite (`.db3`) record source.
//!
//! The storage schema is two tables: `topics` (id, name, type, ...) and
//! `messages` (topic_id, timestamp, data). Records are visited in insertion
//! order, which is the original recording order.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};

use crate::record::{RawRecord, RecordSource, TopicMeta};

pub struct Db3Source {
    conn: Connection,
}

impl Db3Source {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("open rosbag2 database {}", path.display()))?;
        Ok(Self { conn })
    }
}

impl RecordSource for Db3Source {
    fn topics(&mut self) -> Result<Vec<TopicMeta>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.name, t.type, COUNT(m.id)
                 FROM topics t LEFT JOIN messages m ON m.topic_id = t.id
                 GROUP BY t.id, t.name, t.type
                 ORDER BY t.name",
            )
            .context("prepare topic query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TopicMeta {
                    name: row.get(0)?,
                    declared_type: row.get(1)?,
                    count: row.get::<_, i64>(2)? as u64,
                })
            })
            .context("query topics")?;
        let mut topics = Vec::new();
        for row in rows {
            topics.push(row.context("read topic row")?);
        }
        Ok(topics)
    }

    fn for_each_record(&mut self, visit: &mut dyn FnMut(RawRecord) -> Result<()>) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.name, t.type, m.timestamp, m.data
                 FROM messages m JOIN topics t ON t.id = m.topic_id
                 ORDER BY m.id",
            )
            .context("prepare record query")?;
        let mut rows = stmt.query([]).context("query records")?;
        while let Some(row) = rows.next().context("read record row")? {
            let record = RawRecord {
                topic: row.get(0)?,
                declared_type: row.get(1)?,
                timestamp_ns: row.get::<_, i64>(2)? as u64,
                bytes: row.get(3)?,
            };
            visit(record)?;
        }
        Ok(())
    }
}
