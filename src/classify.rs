//! Topic classification: which topics carry image records.

use std::collections::BTreeSet;

use crate::record::TopicMeta;

/// Return the names of topics that carry image records.
///
/// A topic qualifies if its declared type contains `Image` (case-sensitive,
/// matching the message type convention) or its name contains `image`
/// case-insensitively. An empty result is valid and means the log has no
/// image topics.
pub fn classify_image_topics(topics: &[TopicMeta]) -> BTreeSet<String> {
    topics
        .iter()
        .filter(|t| t.declared_type.contains("Image") || t.name.to_lowercase().contains("image"))
        .map(|t| t.name.clone())
        .collect()
}
