use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use emosense::config::PipelineConfig;
use emosense::emotion::{dataset, live, model};

fn main() -> Result<()> {
    init_tracing();

    let config = PipelineConfig::default();
    println!("emosense v0.1.0 - speech emotion classifier");
    println!("Archive: {:?}", config.archive_path);
    println!("Dataset dir: {:?}", config.dataset_dir);

    println!("\n1. Materializing dataset...");
    let extracted = dataset::materialize_archive(&config.archive_path, &config.dataset_dir)
        .context("failed to materialize the dataset")?;
    if extracted {
        println!("   Extracted dataset to {:?}", config.dataset_dir);
    } else {
        println!("   Dataset already extracted.");
    }

    println!("\n2. Loading corpus...");
    let (corpus, summary) = dataset::load_corpus(&config.dataset_dir)
        .context("failed to scan the dataset directory")?;
    println!(
        "   Loaded {} valid samples ({} skipped)",
        summary.accepted, summary.skipped
    );

    if corpus.is_empty() {
        println!(
            "\nNo usable audio samples found under {:?}; check the dataset structure.",
            config.dataset_dir
        );
        return Ok(());
    }

    println!("\n3. Training classifier...");
    let trainer = model::TrainerConfig::default();
    let report = model::train(&corpus, &trainer).context("training failed")?;
    println!(
        "   Trained on {} samples, evaluated on {}",
        report.train_size, report.test_size
    );
    println!("   Accuracy: {:.4}", report.accuracy);

    println!("\n4. Live prediction - speak now!");
    let detected =
        live::record_and_predict(&report.model, &config).context("live prediction failed")?;
    println!("   Detected emotion: {}", detected);

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
