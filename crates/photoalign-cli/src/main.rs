//! photoalign CLI — solve and inspect 2-D alignments from the shell.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

use photoalign_core::{recompose, AlignmentEngine, AnchorPairs, DecomposedParams};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "photoalign")]
#[command(about = "Compute before/after photo alignment transforms from anchor correspondences")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an alignment from anchor correspondences (JSON).
    Solve {
        /// Path to the anchors file: {"after": [[x,y],..], "before": [[x,y],..]}.
        #[arg(long)]
        anchors: PathBuf,

        /// Path to write the alignment (JSON); stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Rebuild a transform matrix from edited parameters (JSON).
    Recompose {
        /// Path to the parameters file (DecomposedParams JSON).
        #[arg(long)]
        params: PathBuf,

        /// Path to write the matrix (JSON); stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// On-disk anchor list: parallel after/before point arrays, slot by slot.
#[derive(Deserialize)]
struct AnchorsFile {
    after: Vec<[f64; 2]>,
    before: Vec<[f64; 2]>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { anchors, out } => run_solve(&anchors, out.as_deref()),
        Commands::Recompose { params, out } => run_recompose(&params, out.as_deref()),
    }
}

fn run_solve(anchors_path: &std::path::Path, out_path: Option<&std::path::Path>) -> CliResult<()> {
    let text = std::fs::read_to_string(anchors_path).map_err(|e| -> CliError {
        format!("Failed to read {}: {}", anchors_path.display(), e).into()
    })?;
    let file: AnchorsFile = serde_json::from_str(&text)?;

    if file.after.len() != file.before.len() {
        return Err(format!(
            "anchor lists differ in length: {} after vs {} before",
            file.after.len(),
            file.before.len()
        )
        .into());
    }
    if file.after.len() > photoalign_core::MAX_ANCHORS {
        return Err(format!(
            "too many anchors: {} (maximum {})",
            file.after.len(),
            photoalign_core::MAX_ANCHORS
        )
        .into());
    }

    let mut pairs = AnchorPairs::new();
    for (i, (a, b)) in file.after.iter().zip(&file.before).enumerate() {
        pairs.set_after(i, *a);
        pairs.set_before(i, *b);
    }

    let alignment = AlignmentEngine::new().compute_best(&pairs)?;
    tracing::info!(
        "solved via {:?} ({} anchor pairs), degenerate: {}",
        alignment.method,
        alignment.method.anchor_count(),
        alignment.degenerate
    );

    write_json(&serde_json::to_string_pretty(&alignment)?, out_path)
}

fn run_recompose(
    params_path: &std::path::Path,
    out_path: Option<&std::path::Path>,
) -> CliResult<()> {
    let text = std::fs::read_to_string(params_path).map_err(|e| -> CliError {
        format!("Failed to read {}: {}", params_path.display(), e).into()
    })?;
    let params: DecomposedParams = serde_json::from_str(&text)?;

    let h = recompose(&params);
    write_json(&serde_json::to_string_pretty(&h)?, out_path)
}

fn write_json(json: &str, out_path: Option<&std::path::Path>) -> CliResult<()> {
    match out_path {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
