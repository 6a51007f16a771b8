mod dataset;

use crptr_core::config::CrptrConfig;
use dataset::{DataSet, encode_records};

use anyhow::Context;
use clap::Parser;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,
    #[clap(short, long)]
    input: Option<PathBuf>,
    #[clap(short, long)]
    output: Option<PathBuf>,
    #[clap(short, long)]
    seed: Option<u64>,
    #[clap(short, long)]
    num_duplicates: Option<usize>,
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from("config.toml"));
    info!(path = ?config_path, "Loading configuration");
    let mut config = CrptrConfig::load_from_file(&config_path)?;

    if let Some(input) = cli.input {
        config.dataset.input = Some(input);
    }
    if let Some(output) = cli.output {
        config.dataset.output = Some(output);
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(num_duplicates) = cli.num_duplicates {
        config.generation.num_duplicates = num_duplicates;
    }

    let input = config
        .dataset
        .input
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No input data set given in config or via --input"))?;
    let output = config
        .dataset
        .output
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No output file given in config or via --output"))?;

    let dataset = DataSet::read(&input, &config.dataset)?;
    let schema = config.dataset.schema(dataset.header.as_deref())?;
    let originals = dataset.records(&schema)?;

    let driver = config
        .build_driver(Arc::clone(&schema))
        .context("Invalid corruption configuration")?;
    let planner = config.build_planner()?;

    info!(
        originals = originals.len(),
        duplicates = config.generation.num_duplicates,
        seed = config.seed,
        "Corrupting data set"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let start_time = Instant::now();
    let records = driver.generate(
        &originals,
        &planner,
        config.generation.num_duplicates,
        &mut rng,
    )?;
    let bytes = encode_records(&config.dataset, &schema, &records)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write output data set {:?}", output))?;

    println!(
        "Wrote {} records ({} originals, {} duplicates) to {:?} in {:.2?}.",
        records.len(),
        originals.len(),
        records.len() - originals.len(),
        output,
        start_time.elapsed()
    );
    println!("Output digest (md5): {:x}", md5::compute(&bytes));

    Ok(())
}
