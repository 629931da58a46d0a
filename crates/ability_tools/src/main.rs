//! Ability framework - development tools

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ability_core::content;
use ability_tools::summary::ContentSummary;
use ability_tools::validate::{self, ToolError};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ability-tools")]
#[command(about = "Development tools for ability content")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate content files
    Validate {
        /// Content file, or directory of .ron files
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },
    /// Summarize a content file, or the built-in content
    Describe {
        /// Content file to describe
        path: Option<PathBuf>,
    },
    /// Write the built-in content as RON
    Export {
        /// Destination file
        path: PathBuf,
    },
}

fn run_validate(path: &Path, json: bool) -> Result<bool, ToolError> {
    tracing::info!("Validating content in: {}", path.display());
    let reports = validate::validate_data_directory(path)?;

    if json {
        let value: Vec<_> = reports
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "problems": r.problems,
                })
            })
            .collect();
        let text =
            serde_json::to_string_pretty(&value).map_err(|e| ToolError::Encode(e.to_string()))?;
        println!("{text}");
    } else {
        for report in &reports {
            for problem in &report.problems {
                tracing::error!("{}: {problem}", report.path.display());
            }
        }
    }
    Ok(reports.iter().all(validate::FileReport::is_valid))
}

fn run_describe(path: Option<&Path>, json: bool) -> Result<(), ToolError> {
    let data = match path {
        Some(path) => validate::load_content_file(path)?,
        None => content::builtin_data(),
    };
    let summary = ContentSummary::of(&data);
    if json {
        println!("{}", summary.to_json()?);
    } else {
        print!("{summary}");
    }
    Ok(())
}

fn run_export(path: &Path) -> Result<(), ToolError> {
    let text = content::builtin_data().to_ron()?;
    std::fs::write(path, text).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Built-in content written to {}", path.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let outcome = match &cli.command {
        Commands::Validate { path } => run_validate(path, cli.json),
        Commands::Describe { path } => run_describe(path.as_deref(), cli.json).map(|()| true),
        Commands::Export { path } => run_export(path).map(|()| true),
    };

    match outcome {
        Ok(true) => {
            tracing::info!("Done");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            tracing::error!("Validation failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
