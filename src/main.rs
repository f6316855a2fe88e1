use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use code_analyzer::REGISTRY;

/// Static analyzer producing a structural summary per source file.
#[derive(Parser)]
#[command(name = "code-analyzer", version, about)]
struct Cli {
    /// Source files to analyze (.ts, .tsx, .js, .jsx, .py)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "code_analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Files are independent; rayon's pool also bounds how many bridge
    // interpreters run at once.
    let results: Vec<_> = cli
        .files
        .par_iter()
        .filter_map(|path| match REGISTRY.analyze_file(path) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::error!("skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    let output = if cli.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{}", output);

    Ok(())
}
