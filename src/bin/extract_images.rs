//! extract_images - extract camera frames from a recorded sensor log
//!
//! Opens the log container, classifies image-bearing topics, decodes every
//! record on them, and writes JPEG files into one directory per topic.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use bag_frames::{classify_image_topics, source, ExtractionPipeline, JpegSink, PipelineOptions};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Log container: a .mcap or .db3 file, or a rosbag2 directory.
    bag: PathBuf,
    /// Output root; one subdirectory per image topic.
    #[arg(long, default_value = "extracted_images", env = "BAG_FRAMES_OUTPUT")]
    output: PathBuf,
    /// Stop after this many saved frames per topic.
    #[arg(long)]
    max_per_topic: Option<u64>,
    /// Report at most this many decode failures per topic verbosely.
    #[arg(long, default_value_t = 5)]
    failure_log_limit: u64,
    /// Also write the extraction summary as JSON to this path.
    #[arg(long)]
    summary_json: Option<PathBuf>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let ui = ui::Ui::new(
        ui::UiMode::from_flag(&args.ui),
        std::io::stderr().is_terminal(),
    );

    let (format, mut record_source) = {
        let _stage = ui.stage("Open log container");
        source::open(&args.bag)?
    };
    log::info!("container format: {}", format);

    let topics = {
        let _stage = ui.stage("Scan topics");
        record_source.topics()?
    };
    let image_topics = classify_image_topics(&topics);
    if image_topics.is_empty() {
        println!("No image topics found.");
        return Ok(());
    }

    println!("Found {} image topics:", image_topics.len());
    for topic in &topics {
        if image_topics.contains(&topic.name) {
            println!(
                "  - {}: {} records ({})",
                topic.name, topic.count, topic.declared_type
            );
        }
    }

    let options = PipelineOptions {
        output_root: args.output.clone(),
        max_per_topic: args.max_per_topic,
        failure_log_limit: args.failure_log_limit,
    };
    let mut pipeline = ExtractionPipeline::new(JpegSink, options);
    let summary = {
        let _stage = ui.stage("Extract frames");
        pipeline.run(record_source.as_mut(), &image_topics)?
    };

    print!("{summary}");
    if let Some(path) = &args.summary_json {
        std::fs::write(path, serde_json::to_vec_pretty(&summary)?)?;
        println!("summary written to {}", path.display());
    }
    Ok(())
}
