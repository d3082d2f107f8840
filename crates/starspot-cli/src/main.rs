use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use starspot_core::{ClassifierOptions, LabelTable, Pipeline, TracingReporter};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "starspot", about = "Annotate images with detected celebrity faces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run images through the face pipeline and save annotated copies
    Process {
        /// Input image files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory for annotated output images
        #[arg(short, long, default_value = "annotated")]
        out_dir: PathBuf,
        /// Print a JSON detection report per image
        #[arg(long)]
        json: bool,
    },
    /// Print the score-to-name label table
    Labels,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            inputs,
            out_dir,
            json,
        } => run_process(inputs, out_dir, json),
        Commands::Labels => {
            for bin in LabelTable::celebrities().bins() {
                println!("[{:>4.1}, {:>4.1})  {}", bin.lower, bin.upper, bin.label);
            }
            Ok(())
        }
    }
}

fn run_process(inputs: Vec<PathBuf>, out_dir: PathBuf, json: bool) -> Result<()> {
    let config = Config::from_env();
    let options = ClassifierOptions {
        intra_threads: config.intra_threads,
    };

    let mut pipeline = Pipeline::load(
        &config.cascade_path(),
        &config.classifier_path(),
        &options,
        &TracingReporter,
    )
    .context("failed to initialize face pipeline")?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for input in inputs {
        let frame = image::open(&input)
            .with_context(|| format!("failed to open image {}", input.display()))?
            .to_rgba8();

        let (annotated, reports) = pipeline.process_with_report(frame);

        let file_name = input
            .file_name()
            .unwrap_or_else(|| OsStr::new("frame.png"));
        let out_path = out_dir.join(file_name);
        annotated
            .save(&out_path)
            .with_context(|| format!("failed to save annotated image {}", out_path.display()))?;

        tracing::info!(
            input = %input.display(),
            output = %out_path.display(),
            faces = reports.len(),
            "annotated"
        );

        if json {
            let report = serde_json::json!({
                "input": input.display().to_string(),
                "output": out_path.display().to_string(),
                "faces": reports,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
