//! fmgcarry
//!
//! Carries source-language text changes into translated FMG files

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use fmg_carry::{inspect, CarryConfig, Roots, Runner};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fmgcarry", version)]
#[command(about = "Carry source-language changes into translated FMG files")]
struct Cli {
    /// Log debug details (per-identifier decisions, codec statistics)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare base/updated source trees against a translation tree
    ///
    /// Without OVERRIDES a review file is written per changed container.
    /// With OVERRIDES the translation files are rewritten in place, taking
    /// filled-in `=` lines from the review files as manual overrides.
    Carry {
        /// Previous source-language directory
        base: PathBuf,

        /// Updated source-language directory
        updated: PathBuf,

        /// Translation directory
        translation: PathBuf,

        /// Directory of reviewed files (selects merge mode)
        overrides: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where review files are written in report mode
        #[arg(short, long)]
        report_dir: Option<PathBuf>,

        /// Container file extension
        #[arg(long)]
        extension: Option<String>,

        /// Continue with the next file after a failure
        #[arg(long)]
        keep_going: bool,

        /// Also apply overrides for identifiers whose source did not change
        #[arg(long)]
        apply_stray_overrides: bool,

        /// Write a JSON run summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Show the header and entry counts of an FMG file
    Inspect {
        /// Path to .fmg file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Commands::Carry {
            base,
            updated,
            translation,
            overrides,
            config,
            report_dir,
            extension,
            keep_going,
            apply_stray_overrides,
            summary,
        } => {
            let mut settings = match &config {
                Some(path) => CarryConfig::load(path)
                    .with_context(|| format!("Failed to load config {:?}", path))?,
                None => CarryConfig::default(),
            };
            if let Some(dir) = report_dir {
                settings.report_dir = dir;
            }
            if let Some(extension) = extension {
                settings.extension = extension;
            }
            settings.keep_going |= keep_going;
            settings.apply_stray_overrides |= apply_stray_overrides;
            settings.validate().context("Invalid configuration")?;

            let mut roots = Roots::new(base, updated, translation);
            if let Some(dir) = overrides {
                roots = roots.with_overrides(dir);
            }

            let runner = Runner::new(roots, settings);
            info!("Starting {:?} run", runner.mode());
            let result = runner.run().context("Carry run aborted")?;

            info!(
                "Finished: {} processed, {} written, {} reports, {} unchanged, {} failed",
                result.processed,
                result.written,
                result.reports,
                result.unchanged,
                result.failed.len()
            );

            if let Some(path) = summary {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create summary {:?}", path))?;
                serde_json::to_writer_pretty(BufWriter::new(file), &result)
                    .context("Failed to write summary")?;
            }

            if !result.is_success() {
                bail!("{} file(s) failed", result.failed.len());
            }
        }
        Commands::Inspect { file, json } => {
            let stats = inspect(&file).with_context(|| format!("Failed to read {:?}", file))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", file.display());
                println!("  version:           {:#x}", stats.version);
                println!("  size:              {} bytes", stats.total_size);
                println!("  ranges:            {}", stats.range_count);
                println!("  offset slots:      {}", stats.string_table_size);
                println!("  offset table at:   {:#x}", stats.strings_offset);
                println!("  entries:           {}", stats.entry_count);
                println!("  null entries:      {}", stats.null_count);
            }
        }
    }

    Ok(())
}
