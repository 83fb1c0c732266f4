use anyhow::Context;
use circarray::{circarray, Args};
use clap::Parser;
use config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let loaded = Config::load(args.config.as_deref())?;
    if let Some(ref path) = loaded.source {
        println!("config file: {:?}", path);
    }
    let mut cfg = loaded.config.array;
    args.apply(&mut cfg);

    let summary = circarray(&cfg)?;
    println!(
        "lattice: A = {}, B = {}, R = {}",
        cfg.period_x, cfg.period_y, cfg.radius
    );
    println!("placed {} unit cells", summary.placements.len());

    let json = serde_json::to_string_pretty(&summary)
        .with_context(|| "Failed to serialize layout summary.")?;
    config::paths::write(&cfg.output, json)
        .with_context(|| format!("Failed to write layout summary to {:?}.", cfg.output))?;
    println!("output: {:?}", cfg.output);

    Ok(())
}
