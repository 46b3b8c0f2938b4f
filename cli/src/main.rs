//! Sector Season runner
//!
//! Plays a full season non-interactively with a constant allocation and
//! prints the weekly results and the final scorecard.
//!
//! Usage:
//!   sector-sim [OPTIONS]
//!
//! Example:
//!   sector-sim --seed 42 --weeks 3 --allocation 40,10,10,30,10

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sector_sim_core_rs::orchestrator::{Orchestrator, SeasonConfig, SEASON_WEEKS};
use sector_sim_core_rs::{Allocation, RivalStrategy, Sector, WeekReport};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "sector-sim")]
#[command(version, about = "Run a sector allocation season")]
struct Cli {
    /// RNG seed (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Season length in weeks
    #[arg(short, long, default_value_t = SEASON_WEEKS)]
    weeks: usize,

    /// Player name
    #[arg(short, long, default_value = "Player")]
    player: String,

    /// Percentages for Tech,Energy,Financials,Consumer,Industrials
    #[arg(short, long, default_value = "20,20,20,20,20")]
    allocation: String,

    /// Weekly shock probability
    #[arg(long)]
    shock_probability: Option<f64>,

    /// Rival strategy: momentum, defensive, macro_timer or value
    #[arg(long, default_value = "momentum")]
    rival: String,

    /// Play without a rival
    #[arg(long, conflicts_with = "rival")]
    no_rival: bool,

    /// Print the season record as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Write the season record JSON to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log filter, e.g. "info" or "sector_sim_core_rs=debug" (RUST_LOG wins if set)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_allocation(raw: &str) -> Result<Allocation> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid percentage '{}'", p.trim()))
        })
        .collect::<Result<_>>()?;

    if parts.len() != Sector::COUNT {
        bail!(
            "expected {} percentages (Tech,Energy,Financials,Consumer,Industrials), got {}",
            Sector::COUNT,
            parts.len()
        );
    }

    let mut percentages = [0.0; Sector::COUNT];
    percentages.copy_from_slice(&parts);
    Ok(Allocation::from_percentages(percentages)?)
}

fn print_week(report: &WeekReport) {
    let state = &report.macro_state;
    println!(
        "Week {:>2} | {:<9} {:<7} {:<8} | return {:>+7.2}% | value {:>14.2} | risk {:>2}/10",
        report.week,
        format!("{:?}", state.regime),
        format!("{:?}", state.rate_direction),
        format!("{:?}", state.volatility),
        report.portfolio_return * 100.0,
        report.value,
        report.assessment.risk_score,
    );
    if let Some(shock) = &report.shock {
        println!("        ! {}: {}", shock.name, shock.narrative);
    }
    if let Some(rival) = &report.rival {
        println!(
            "        vs {}: return {:>+7.2}% | value {:>14.2}",
            rival.name,
            rival.portfolio_return * 100.0,
            rival.value,
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let seed = match cli.seed {
        Some(seed) => seed,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock before UNIX epoch")?
            .as_nanos() as u64,
    };
    let allocation = parse_allocation(&cli.allocation)?;

    let mut config = SeasonConfig::new(seed);
    config.weeks = cli.weeks;
    config.player_name = cli.player;
    if let Some(p) = cli.shock_probability {
        config.shock_probability = p;
    }
    config.rival = if cli.no_rival {
        None
    } else {
        Some(cli.rival.parse::<RivalStrategy>().map_err(anyhow::Error::msg)?)
    };

    let mut orchestrator = Orchestrator::new(config).context("failed to start season")?;
    info!(seed, session_id = %orchestrator.session_id(), "season started");

    while !orchestrator.is_complete() {
        let report = orchestrator.play_week(allocation)?;
        if !cli.json {
            print_week(&report);
        }
    }

    let record = orchestrator.season_record();
    let json = serde_json::to_string_pretty(&record)?;

    if let Some(path) = &cli.output {
        std::fs::write(path, &json)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if cli.json {
        println!("{}", json);
        return Ok(());
    }

    let card = orchestrator.scorecard()?;
    println!();
    println!("Season complete for {} (seed {})", record.player_name, seed);
    println!("  Final value:    {:>14.2}", card.final_value);
    println!("  Total return:   {:>+13.2}%", card.total_return * 100.0);
    println!("  CAGR:           {:>+13.2}%", card.cagr * 100.0);
    println!("  Max drawdown:   {:>13.2}%", card.max_drawdown * 100.0);
    println!("  Volatility:     {:>13.2}%", card.annualized_volatility * 100.0);
    println!("  Sharpe ratio:   {:>14.2}", card.sharpe_ratio);
    println!("  Grade:          {:>14}", card.grade.to_string());

    if let Some(rival) = &record.rival {
        let lead = card.final_value - rival.curve.current_value();
        println!();
        println!("Rival {} ({})", rival.name, rival.strategy);
        println!("  Final value:    {:>14.2}", rival.curve.current_value());
        if let Some(rival_card) = &rival.scorecard {
            println!("  Sharpe ratio:   {:>14.2}", rival_card.sharpe_ratio);
            println!("  Grade:          {:>14}", rival_card.grade.to_string());
        }
        if lead >= 0.0 {
            println!("  You lead by {:.2}", lead);
        } else {
            println!("  You trail by {:.2}", -lead);
        }
    }

    Ok(())
}
