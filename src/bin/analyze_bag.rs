//! analyze_bag - summarize the topics in a recorded sensor log
//!
//! Prints the container format, every topic with its declared type and
//! record count, and which topics would be classified as image-bearing.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use bag_frames::{classify_image_topics, source};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Log container: a .mcap or .db3 file, or a rosbag2 directory.
    bag: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let (format, mut record_source) = source::open(&args.bag)?;
    let topics = record_source.topics()?;

    println!("Analyzing {} ({})", args.bag.display(), format);
    println!("{}", "=".repeat(60));

    let total_records: u64 = topics.iter().map(|t| t.count).sum();
    println!("Topics: {}", topics.len());
    println!("Records: {}", total_records);
    println!();

    println!("Topic information:");
    println!("{}", "-".repeat(40));
    for topic in &topics {
        println!("Topic: {}", topic.name);
        println!("  Type: {}", topic.declared_type);
        println!("  Count: {}", topic.count);
    }

    let image_topics = classify_image_topics(&topics);
    if image_topics.is_empty() {
        println!();
        println!("No image topics found.");
    } else {
        println!();
        println!("Found {} image topics:", image_topics.len());
        for topic in &image_topics {
            println!("  - {}", topic);
        }
    }
    Ok(())
}
