use std::num::NonZeroUsize;
use std::process;
use std::thread;

use anyhow::{bail, Context, Result};
use bubble_ist::render::{PathListing, TreeListing};
use bubble_ist::{
    ConstructionConfig, ConstructionReport, IstBuilder, ParentRule, Permutation,
};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Largest dimension whose codec table is printed.
const CODEC_TABLE_MAX: usize = 4;
/// Largest dimension whose trees are listed without `--show-trees`.
const LISTING_MAX: usize = 3;
/// Start vertex of the example paths printed for B_4.
const EXAMPLE_VERTEX: &str = "4231";

#[derive(Parser, Debug)]
#[command(
    name = "bubble-ist",
    version,
    about = "Independent spanning trees on the bubble-sort network B_n"
)]
struct Cli {
    /// Dimension n of B_n (3..=12).
    dimension: usize,
    /// Distributed workers; enables the hybrid constructor.
    #[arg(long)]
    workers: Option<usize>,
    /// Threads per worker; enables the hybrid constructor.
    #[arg(long)]
    threads: Option<usize>,
    /// Decision table used to pick parents.
    #[arg(long, value_enum, default_value_t = RuleArg::Recursive)]
    rule: RuleArg,
    /// Skip validity and independence checks.
    #[arg(long)]
    skip_verify: bool,
    /// List every tree edge regardless of dimension.
    #[arg(long)]
    show_trees: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RuleArg {
    Recursive,
    Published,
}

impl From<RuleArg> for ParentRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Recursive => ParentRule::Recursive,
            RuleArg::Published => ParentRule::Published,
        }
    }
}

impl Cli {
    fn config(&self) -> ConstructionConfig {
        let config = match (self.workers, self.threads) {
            (None, None) => ConstructionConfig::sequential(self.dimension),
            (workers, threads) => ConstructionConfig::hybrid(
                self.dimension,
                workers.unwrap_or(1),
                threads.unwrap_or_else(default_threads),
            ),
        };
        config
            .with_rule(self.rule.into())
            .with_verification(!self.skip_verify)
    }
}

fn default_threads() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            // clap formats its own usage line
            let _ = err.print();
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    if let Err(err) = config.validate() {
        usage_error(err);
    }

    let vertex_count = config
        .vertex_count()
        .context("failed to size the network")?;
    println!(
        "Creating bubble-sort network B_{} with {} vertices...",
        config.dimension, vertex_count
    );

    let report = IstBuilder::new(config.clone())
        .run()
        .with_context(|| format!("construction of B_{} failed", config.dimension))?;

    print_report(&cli, &report)
}

fn usage_error(err: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", err);
    eprintln!("Usage: bubble-ist <dimension> [--workers W] [--threads T] [--rule recursive|published] [--skip-verify] [--show-trees]");
    process::exit(1);
}

fn print_report(cli: &Cli, report: &ConstructionReport) -> Result<()> {
    let dimension = report.network.dimension();
    println!(
        "Network created in {:.6} seconds",
        report.network_elapsed.as_secs_f64()
    );

    if dimension <= CODEC_TABLE_MAX {
        print_codec_table(dimension)?;
    }

    println!(
        "Constructed {} independent spanning trees in {:.6} seconds",
        report.forest.tree_count(),
        report.construction_elapsed.as_secs_f64()
    );

    if cli.show_trees || dimension <= LISTING_MAX {
        for tree in report.forest.trees() {
            print!("{}", TreeListing::new(tree, dimension));
        }
    }

    if dimension == 4 {
        print_example_paths(report)?;
    }

    println!("Forest fingerprint: {}", report.forest.fingerprint());

    match &report.verification {
        None => println!("Verification skipped"),
        Some(Ok(())) => println!(
            "All {} trees are valid spanning trees and pairwise independent (verified in {:.6} seconds)",
            report.forest.tree_count(),
            report.verification_elapsed.as_secs_f64()
        ),
        Some(Err(violation)) => {
            println!("Verification failed: {}", violation);
            bail!("forest for B_{} failed verification", dimension);
        }
    }

    Ok(())
}

fn print_codec_table(dimension: usize) -> Result<()> {
    println!("Permutation codec:");
    let count = bubble_ist::util::factorial(dimension)?;
    for index in 0..count {
        let permutation = Permutation::unrank(index, dimension)?;
        println!("Index {} -> {} -> Index {}", index, permutation, permutation.rank());
    }
    Ok(())
}

fn print_example_paths(report: &ConstructionReport) -> Result<()> {
    let dimension = report.network.dimension();
    let start: Permutation = EXAMPLE_VERTEX.parse()?;
    let vertex = report.network.vertex_of(&start)?;

    println!("Example paths from vertex {} to root in each tree:", EXAMPLE_VERTEX);
    for tree in report.forest.trees() {
        match tree.path_to_root(vertex) {
            Some(path) => println!(
                "Tree T_{}: {}",
                tree.index(),
                PathListing::new(&path, dimension)
            ),
            None => println!("Tree T_{}: no path to root", tree.index()),
        }
    }
    Ok(())
}
