use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use zt_workflow::data::loader::{read_expt_xy_csv, write_csv};
use zt_workflow::data::sources::{read_amset, AmsetOptions};
use zt_workflow::{
    dataset_to_2d, get_zt_max, zt_dataset_from_files, MatchMode, MatchResult, MatchTarget,
    Matcher, RowBounds,
};

#[derive(Debug, Parser)]
#[command(name = "zt-workflow", version, about = "AMSET + Phono3py ZT workflow")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Combine AMSET and Phono3py outputs into a ZT dataset (CSV).
    Zt {
        #[command(flatten)]
        inputs: ZtInputs,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Print the row with the largest ZT (JSON).
    ZtMax {
        #[command(flatten)]
        inputs: ZtInputs,
        #[arg(long)]
        n_min: Option<f64>,
        #[arg(long)]
        n_max: Option<f64>,
        #[arg(long)]
        t_min: Option<f64>,
        #[arg(long)]
        t_max: Option<f64>,
    },
    /// Match an AMSET column against digitised (T, value) measurements.
    Match(MatchArgs),
}

#[derive(Debug, Args)]
struct ZtInputs {
    /// AMSET transport CSV.
    #[arg(long)]
    amset: PathBuf,
    /// Phono3py kappa CSV.
    #[arg(long)]
    kappa: PathBuf,
}

#[derive(Debug, Args)]
struct MatchArgs {
    /// AMSET transport CSV.
    #[arg(long)]
    amset: PathBuf,
    /// Calculated column to match, e.g. `sigma_ave` or `s_ave`.
    #[arg(long)]
    column: String,
    /// Header-less two-column CSV of (T, value).
    #[arg(long)]
    expt: PathBuf,
    /// Nominal carrier concentration of the sample.
    #[arg(long)]
    n: Option<f64>,
    /// same, same_t, same_n or best_match.
    #[arg(long, default_value = "same_t")]
    mode: MatchMode,
    #[arg(long, default_value_t = 1)]
    seeds: usize,
    /// Take the reciprocal of the measured values (resistivity -> conductivity).
    #[arg(long)]
    invert: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Zt { inputs, output } => {
            let zt_data = zt_dataset_from_files(&inputs.amset, &inputs.kappa)
                .context("building ZT dataset")?;
            write_csv(&zt_data, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            log::info!("Wrote {} rows to {}", zt_data.len(), output.display());
        }
        Command::ZtMax {
            inputs,
            n_min,
            n_max,
            t_min,
            t_max,
        } => {
            let zt_data = zt_dataset_from_files(&inputs.amset, &inputs.kappa)
                .context("building ZT dataset")?;
            let bounds = RowBounds {
                n_min,
                n_max,
                t_min,
                t_max,
            };
            let record = get_zt_max(&zt_data, &bounds)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Match(args) => run_match(&args)?,
    }
    Ok(())
}

fn run_match(args: &MatchArgs) -> Result<()> {
    let mode = args.mode;
    let data = read_amset(&args.amset, AmsetOptions::default())
        .with_context(|| format!("reading {}", args.amset.display()))?;
    let grid = dataset_to_2d(&data)?;
    let matcher = Matcher::new(&grid.n, &grid.t, grid.get(&args.column)?.view())?;

    let targets: Vec<MatchTarget> = read_expt_xy_csv(&args.expt)
        .with_context(|| format!("reading {}", args.expt.display()))?
        .into_iter()
        .map(|(t, v)| MatchTarget::new(args.n, Some(t), if args.invert { 1.0 / v } else { v }))
        .collect();

    let results = matcher.match_all(&targets, mode, args.seeds)?;
    print_comparison(&format!("Data: '{}', Mode: '{mode}'", args.column), &targets, &results);
    Ok(())
}

fn print_comparison(header: &str, targets: &[MatchTarget], results: &[MatchResult]) {
    println!("{header}");
    println!("{}", "-".repeat(header.len()));
    println!();
    println!(
        "{:<10} | {:<10} | {:<10} | {:<10} | {:<10} | {:<10} | {:<10}",
        "n", "T", "Expt.", "n", "T", "Calc.", "Diff."
    );
    println!("{}", "-".repeat(7 * 10 + 6 * 3));

    for (e, c) in targets.iter().zip(results) {
        let e_n = e.n.map_or_else(|| "-".to_string(), |n| format!("{n:.2e}"));
        let e_t = e.t.map_or_else(|| "-".to_string(), |t| format!("{t:.0}"));
        println!(
            "{:>10} | {:>10} | {:>10.2} | {:>10.2e} | {:>10.0} | {:>10.2} | {:>10.2e}",
            e_n,
            e_t,
            e.value,
            c.n,
            c.t,
            c.value,
            c.value - e.value
        );
    }
    println!();
}
