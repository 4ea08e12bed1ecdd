use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use readclass::aggregate::tally;
use readclass::chimera::{find_chimeras, HostReport};
use readclass::io::{load_blast_json, valid_searches, write_classifications_tsv, write_counts_tsv};
use readclass::{Classifier, ClassifierConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "readclass", about = "Classify BLAST read alignments by strand and fragment pattern")]
struct Cli {
    /// Built-in reference and template set.
    #[arg(long, value_enum, default_value_t = Preset::Cy1, global = true)]
    preset: Preset,

    /// JSON configuration file (overrides --preset).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads (0 = all cores).
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Only log warnings and errors.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// CY1 hits with plus-strand fragment templates.
    Cy1,
    /// CY2 hits with minus-strand fragment templates.
    Cy2,
    /// Rubisco large subunit hits, full-length control template.
    Rubisco,
    /// Any single hit, both template sets.
    Any,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one row per read with its category and quantities.
    Classify {
        /// BLAST JSON output (-outfmt 15).
        report: PathBuf,
    },
    /// Print category counts and percentages.
    Counts {
        /// BLAST JSON output (-outfmt 15).
        report: PathBuf,
    },
    /// Find viral reads that also hit a host database.
    Chimeras {
        /// BLAST JSON output against the viral reference.
        viral: PathBuf,
        /// Host report as `label=path`, e.g. `genome=blast_to_nb_genome.json`.
        #[arg(long = "host", value_parser = parse_host, required = true)]
        hosts: Vec<(String, PathBuf)>,
    },
}

fn parse_host(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((label, path)) if !label.is_empty() && !path.is_empty() => {
            Ok((label.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected label=path, got `{value}`")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => match cli.preset {
            Preset::Cy1 => ClassifierConfig::cy1(),
            Preset::Cy2 => ClassifierConfig::cy2(),
            Preset::Rubisco => ClassifierConfig::rubisco_large(),
            Preset::Any => ClassifierConfig::any_reference(),
        },
    };
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }

    match cli.command {
        Commands::Classify { report } => run_classify(config, &report, false)?,
        Commands::Counts { report } => run_classify(config, &report, true)?,
        Commands::Chimeras { viral, hosts } => run_chimeras(config, &viral, &hosts)?,
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<ClassifierConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid config {}", path.display()))
}

fn run_classify(config: ClassifierConfig, report: &Path, counts_only: bool) -> Result<()> {
    let items = load_blast_json(report)?;
    let classifier = Classifier::new(config).context("failed to initialize classifier")?;
    let batch = classifier.classify_batch(&items);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if counts_only {
        write_counts_tsv(&mut out, &batch.counts(), batch.processed())?;
        let strands = tally(&batch.classifications);
        tracing::info!(
            plus = strands.plus,
            minus = strands.minus,
            hybrid = strands.hybrid,
            foldback = strands.foldback,
            unclassified = strands.unclassified,
            "strand tally"
        );
    } else {
        write_classifications_tsv(&mut out, &batch.classifications)?;
    }
    Ok(())
}

fn run_chimeras(config: ClassifierConfig, viral: &Path, hosts: &[(String, PathBuf)]) -> Result<()> {
    let viral_searches = valid_searches(&load_blast_json(viral)?);
    let host_searches = hosts
        .iter()
        .map(|(label, path)| Ok((label.as_str(), valid_searches(&load_blast_json(path)?))))
        .collect::<Result<Vec<_>>>()?;
    let host_reports: Vec<HostReport<'_>> = host_searches
        .iter()
        .map(|(label, searches)| HostReport { label, searches })
        .collect();

    let report = find_chimeras(&viral_searches, &config.references, &host_reports);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "viral_reads\t{}", report.viral_reads)?;
    for host in &report.hosts {
        writeln!(out, "{}\t{}", host.label, host.read_ids.len())?;
    }
    let unique = report.unique_read_ids();
    writeln!(out, "unique_chimeric\t{}", unique.len())?;
    for (read_id, sources) in report.sources_by_read() {
        writeln!(out, "{read_id}\t{}", sources.join(","))?;
    }
    Ok(())
}
