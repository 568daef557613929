// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Cellforge CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use cellforge::{Configuration, ExportOrchestrator, MeshScene};

#[derive(Parser)]
#[command(name = "cellforge")]
#[command(about = "Cellforge - parametric battery cell model generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and export cell models from a configuration document
    Generate {
        /// Configuration JSON file; defaults are used when omitted
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Override the number of export iterations
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Override the random seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Write a default configuration document
    InitConfig {
        /// Target path for the configuration JSON
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            output,
            iterations,
            seed,
        } => generate_command(config, output, iterations, seed),
        Commands::InitConfig { path } => init_config_command(&path),
        Commands::Version => {
            println!("Cellforge v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn generate_command(
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    iterations: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = match config_path {
        Some(ref path) => Configuration::from_file(path)?,
        None => Configuration::default(),
    };
    if let Some(output) = output {
        config.path = output;
    }
    if let Some(iterations) = iterations {
        config.num_export = iterations;
    }
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }

    let mut scene = MeshScene::new();
    let orchestrator = ExportOrchestrator::new(config, &mut scene)
        .context("Failed to initialize export session")?;

    let output_dir = orchestrator.session().output_dir.clone();
    println!("Exporting to {}", output_dir.display());

    let bar = ProgressBar::new(orchestrator.iterations() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} iterations {msg}")
            .expect("static progress template"),
    );

    let report = orchestrator
        .run_with(|index, error| {
            bar.inc(1);
            if let Some(error) = error {
                bar.set_message(format!("iteration {} failed", index + 1));
                bar.println(format!(
                    "{} iteration {}: {}",
                    "FAILED".red().bold(),
                    index + 1,
                    error
                ));
            }
        })
        .context("Export run aborted")?;
    bar.finish_and_clear();

    println!(
        "{} {} iteration(s) completed",
        "OK".green().bold(),
        report.completed.len()
    );
    for failure in &report.failures {
        println!(
            "{} iteration {}: {}",
            "FAILED".red().bold(),
            failure.index + 1,
            failure.error
        );
    }
    if report.cancelled {
        println!("{}", "Run cancelled before completion".yellow());
    }

    if report.is_complete() {
        Ok(())
    } else {
        anyhow::bail!("{} iteration(s) failed", report.failures.len())
    }
}

fn init_config_command(path: &PathBuf) -> Result<()> {
    let config = Configuration::default();
    config.save(path)?;
    println!("{} wrote default configuration to {}", "OK".green().bold(), path.display());
    Ok(())
}
