//! EdgeLab CLI — run, sweep, and evolve commands.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config file, print a summary,
//!   optionally export the trade ledger (CSV) and equity curve (JSON)
//! - `sweep` — grid-search engine parameters around the config file's base
//! - `evolve` — seeded genetic parameter search

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use edgelab_runner::{
    evolve, load_bars, run_single_backtest, run_sweep, write_equity_json, write_trades_csv,
    BacktestConfig, EvolutionConfig, ParamGrid,
};

#[derive(Parser)]
#[command(
    name = "edgelab",
    about = "EdgeLab CLI — intraday mean-reversion backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Write the trade ledger as CSV.
        #[arg(long)]
        trades_out: Option<PathBuf>,

        /// Write the per-trade equity curve as JSON.
        #[arg(long)]
        equity_out: Option<PathBuf>,

        /// Print the full result as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Grid-search engine parameters around the config file's base values.
    Sweep {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// How many of the top outcomes to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Genetic parameter search with a fixed seed.
    Evolve {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        #[arg(long, default_value_t = 10)]
        population: usize,

        #[arg(long, default_value_t = 20)]
        generations: usize,

        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            trades_out,
            equity_out,
            json,
        } => cmd_run(&config, trades_out.as_deref(), equity_out.as_deref(), json),
        Commands::Sweep { config, top } => cmd_sweep(&config, top),
        Commands::Evolve {
            config,
            population,
            generations,
            seed,
        } => cmd_evolve(&config, population, generations, seed),
    }
}

fn cmd_run(
    config_path: &std::path::Path,
    trades_out: Option<&std::path::Path>,
    equity_out: Option<&std::path::Path>,
    json: bool,
) -> Result<()> {
    let config = BacktestConfig::from_toml_file(config_path)?;
    let result = run_single_backtest(&config).context("backtest failed")?;

    if let Some(path) = trades_out {
        write_trades_csv(path, &result.trades, result.initial_balance)?;
        println!("Trades written to {}", path.display());
    }
    if let Some(path) = equity_out {
        write_equity_json(path, &result.trades, result.initial_balance)?;
        println!("Equity curve written to {}", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Run {}", result.run_id);
    println!("  bars processed:   {}", result.bar_count);
    println!("  signals:          {}", result.signal_count);
    println!("  trades:           {}", result.metrics.trade_count);
    println!(
        "  win rate:         {:.1}% ({}/{})",
        result.metrics.win_rate * 100.0,
        result.metrics.wins,
        result.metrics.trade_count
    );
    println!("  total P&L:        {:.2}", result.metrics.total_pnl);
    println!("  profit factor:    {:.2}", result.metrics.profit_factor);
    println!(
        "  max drawdown:     {:.2}%",
        result.metrics.max_drawdown * 100.0
    );
    println!("  final equity:     {:.2}", result.final_equity);
    if result.stopped_out {
        println!("  margin stop-out was triggered during this run");
    }
    Ok(())
}

fn cmd_sweep(config_path: &std::path::Path, top: usize) -> Result<()> {
    let config = BacktestConfig::from_toml_file(config_path)?;
    let series = load_bars(&config.data_path)?;
    let outcomes = run_sweep(&series, &ParamGrid::standard(), &config.engine)?;

    println!(
        "Swept {} configurations over {} bars",
        outcomes.len(),
        series.len()
    );
    for (rank, outcome) in outcomes.iter().take(top).enumerate() {
        println!(
            "#{:<3} equity {:>10.2}  trades {:>4}  win rate {:>5.1}%  \
             ma={} trail={} breakeven={} timeout={}{}",
            rank + 1,
            outcome.final_equity,
            outcome.metrics.trade_count,
            outcome.metrics.win_rate * 100.0,
            outcome.config.ma_period,
            outcome.config.trailing_stop_distance,
            outcome.config.breakeven_trigger_distance,
            outcome.config.loss_timeout_bars,
            if outcome.stopped_out { "  [stop-out]" } else { "" },
        );
    }
    Ok(())
}

fn cmd_evolve(
    config_path: &std::path::Path,
    population: usize,
    generations: usize,
    seed: u64,
) -> Result<()> {
    let config = BacktestConfig::from_toml_file(config_path)?;
    let series = load_bars(&config.data_path)?;
    let evo = EvolutionConfig {
        population_size: population,
        generations,
        seed,
        ..EvolutionConfig::default()
    };
    let result = evolve(&series, &config.engine, &evo)?;

    for (generation, best) in result.history.iter().enumerate() {
        println!("generation {:>3}: best P&L {:.2}", generation + 1, best);
    }
    println!("Best fitness: {:.2}", result.best_fitness);
    println!(
        "Best genome: ma={} trail={:.4} breakeven={:.4} timeout={}",
        result.best_genome.ma_period,
        result.best_genome.trailing_stop_distance,
        result.best_genome.breakeven_trigger_distance,
        result.best_genome.loss_timeout_bars,
    );
    Ok(())
}
