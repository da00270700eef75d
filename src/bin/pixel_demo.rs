//! Pixel filter demo
//!
//! Runs a brighten filter, a string conversion, and a 64-bit square over
//! synthetic pixel values, then times sequential against parallel.
//!
//! Run with: cargo run --bin pixel-demo -- --threads 4

use anyhow::{Context, Result};
use clap::Parser;
use parallel_processor::timing::compare;
use parallel_processor::{ParallelConfig, ParallelProcessor, ThreadCount};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pixel-demo", about = "Parallel map over synthetic pixel data")]
struct Args {
    /// Number of pixel values to generate
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    elements: usize,

    /// Worker threads: "auto" or a count (zero or negative means auto)
    ///
    /// Falls back to PARMAP_THREADS, then to auto.
    #[arg(short, long, allow_negative_numbers = true)]
    threads: Option<ThreadCount>,

    /// Print the timing comparison as JSON
    #[arg(long)]
    json: bool,
}

fn brighten(p: &i32) -> i32 {
    (p + 50).clamp(0, 255)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let elements = i32::try_from(args.elements)
        .with_context(|| format!("{} elements do not fit in i32 pixel values", args.elements))?;
    let pixels: Vec<i32> = (0..elements).collect();

    let env = ParallelConfig::from_env().context("reading PARMAP_* environment")?;
    let processor = ParallelProcessor::with_config(env.override_threads(args.threads));

    let comparison = compare(&pixels, brighten, &processor);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    let bright = processor.parallel_map(&pixels, brighten);
    let labels = processor.parallel_map(&pixels, |p| format!("pixel_{}", p));
    let squares = processor.parallel_map(&pixels, |p| i64::from(*p) * i64::from(*p));

    println!("// brightened");
    for i in [0, 1, 100, 999_999] {
        if let Some(v) = bright.get(i) {
            println!("brightened[{}] = {}", i, v);
        }
    }

    println!("\n// labels");
    for i in [0, 1, 100] {
        if let Some(v) = labels.get(i) {
            println!("labels[{}] = {:?}", i, v);
        }
    }

    println!("\n// squared");
    for i in [0, 1, 10] {
        if let Some(v) = squares.get(i) {
            println!("squared[{}] = {}", i, v);
        }
    }

    println!(
        "\nProcessing {} elements with {} threads",
        comparison.elements, comparison.threads
    );
    println!("Sequential time: {:?}", comparison.sequential);
    println!("Parallel time:   {:?}", comparison.parallel);
    println!("Speedup: {:.1}x", comparison.speedup());
    if !comparison.outputs_match {
        anyhow::bail!("parallel output differs from sequential reference");
    }

    Ok(())
}
