use anyhow::Context;
use clap::Parser;
use config::Config;
use dosesteps::{write_tables, Args};
use dosetest::{format, DoseSequence};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let loaded = Config::load(args.config.as_deref())?;
    if let Some(ref path) = loaded.source {
        eprintln!("config file: {:?}", path);
    }
    let mut cfg = loaded.config.dose;
    args.apply(&mut cfg);

    let seq = DoseSequence::generate(
        cfg.params()
            .with_context(|| "Invalid dose parameters.")?,
    );

    if args.json {
        let json = serde_json::to_string_pretty(&seq)
            .with_context(|| "Failed to serialize dose sequence.")?;
        println!("{json}");
    } else {
        print!("{}", format::report(&seq));
    }

    if args.dry_run {
        return Ok(());
    }
    for path in write_tables(&cfg, &seq)? {
        eprintln!("wrote {:?}", path);
    }

    Ok(())
}
