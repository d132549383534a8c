//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::cached_price_adapter::CachedPriceAdapter;
use crate::adapters::csv_feed_adapter::CsvFeedAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_snapshot_adapter::JsonSnapshotAdapter;
use crate::adapters::run_state_adapter::FileRunState;
use crate::domain::analysis::StatusFilter;
use crate::domain::config_validation::validate_recalculation_config;
use crate::domain::error::PicktrackError;
use crate::domain::orchestrator::{run_recalculation, RecalculationConfig};
use crate::domain::simulator::{SimulationPolicy, DEFAULT_BASE_VALUE};
use crate::domain::snapshot::PerformanceSnapshot;
use crate::ports::config_port::ConfigPort;
use crate::ports::snapshot_port::SnapshotPort;

#[derive(Parser, Debug)]
#[command(name = "picktrack", about = "Analyst pick performance tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recalculate all pick performance and write a snapshot
    Recalculate {
        #[arg(short, long)]
        config: PathBuf,
        /// Calculation date (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Override the configured simulation policy
        #[arg(long)]
        policy: Option<String>,
        /// Run even if the scheduled interval has not elapsed
        #[arg(long)]
        force: bool,
        /// Only report whether a scheduled run is due
        #[arg(long)]
        check_only: bool,
    },
    /// Print analyst rankings
    Analysts {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        date: Option<String>,
        /// Rank by annualized returns where holdings allow
        #[arg(long)]
        annualized: bool,
        /// Status filter: approved_only, approved_neutral or all_stock
        #[arg(long)]
        status: Option<String>,
    },
    /// Simulate the club portfolio of board-approved picks
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        policy: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show price data ranges for tracked entities
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        entity: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Recalculate {
            config,
            date,
            policy,
            force,
            check_only,
        } => run_recalculate(&config, date.as_deref(), policy.as_deref(), force, check_only),
        Command::Analysts {
            config,
            date,
            annualized,
            status,
        } => run_analysts(&config, date.as_deref(), annualized, status.as_deref()),
        Command::Portfolio {
            config,
            date,
            policy,
        } => run_portfolio(&config, date.as_deref(), policy.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, entity } => run_info(&config, entity.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PicktrackError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolve the calculation date: an explicit `--date`, or today.
pub fn resolve_calculation_date(date: Option<&str>) -> Result<NaiveDate, PicktrackError> {
    match date {
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| PicktrackError::ConfigInvalid {
                section: "cli".into(),
                key: "date".into(),
                reason: "invalid date format (expected YYYY-MM-DD)".into(),
            })
        }
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Benchmark tickers from config, falling back to the standard set.
pub fn resolve_benchmarks(config: &dyn ConfigPort) -> Vec<String> {
    match config.get_string("recalculation", "benchmarks") {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect(),
        None => vec!["SPY".to_string(), "VT".to_string(), "EEMS".to_string()],
    }
}

pub fn build_recalculation_config(
    config: &dyn ConfigPort,
    calculation_date: NaiveDate,
    policy_override: Option<&str>,
    status_override: Option<&str>,
    annualized_override: Option<bool>,
) -> Result<RecalculationConfig, PicktrackError> {
    let policy_str = policy_override
        .map(str::to_string)
        .or_else(|| config.get_string("recalculation", "policy"))
        .unwrap_or_else(|| "incremental".to_string());
    let policy: SimulationPolicy = policy_str.parse()?;

    let status_str = status_override
        .map(str::to_string)
        .or_else(|| config.get_string("recalculation", "status_filter"))
        .unwrap_or_else(|| "approved_only".to_string());
    let status_filter: StatusFilter =
        status_str
            .parse()
            .map_err(|reason| PicktrackError::ConfigInvalid {
                section: "recalculation".into(),
                key: "status_filter".into(),
                reason,
            })?;

    Ok(RecalculationConfig {
        calculation_date,
        status_filter,
        policy,
        base_value: config.get_double("recalculation", "base_value", DEFAULT_BASE_VALUE),
        benchmark_tickers: resolve_benchmarks(config),
        annualized: annualized_override
            .unwrap_or_else(|| config.get_bool("recalculation", "annualized", false)),
    })
}

struct DataPaths {
    prices_dir: PathBuf,
    analyses_file: PathBuf,
    output_dir: PathBuf,
}

fn data_paths(config: &dyn ConfigPort) -> Result<DataPaths, PicktrackError> {
    let prices_dir = config
        .get_string("data", "prices_dir")
        .ok_or_else(|| PicktrackError::ConfigMissing {
            section: "data".into(),
            key: "prices_dir".into(),
        })?;
    let analyses_file =
        config
            .get_string("data", "analyses_file")
            .ok_or_else(|| PicktrackError::ConfigMissing {
                section: "data".into(),
                key: "analyses_file".into(),
            })?;
    let output_dir = config
        .get_string("snapshot", "output_dir")
        .unwrap_or_else(|| "snapshots".to_string());

    Ok(DataPaths {
        prices_dir: PathBuf::from(prices_dir),
        analyses_file: PathBuf::from(analyses_file),
        output_dir: PathBuf::from(output_dir),
    })
}

/// Shared pipeline: load config, wire adapters, run the engine.
fn run_engine(
    config_path: &PathBuf,
    date: Option<&str>,
    policy_override: Option<&str>,
    status_override: Option<&str>,
    annualized_override: Option<bool>,
) -> Result<(PerformanceSnapshot, DataPaths), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    if let Err(e) = validate_recalculation_config(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }

    let calculation_date = match resolve_calculation_date(date) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return Err((&e).into());
        }
    };

    let recalc_config = match build_recalculation_config(
        &adapter,
        calculation_date,
        policy_override,
        status_override,
        annualized_override,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return Err((&e).into());
        }
    };

    let paths = match data_paths(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return Err((&e).into());
        }
    };

    let prices = CachedPriceAdapter::new(CsvPriceAdapter::new(paths.prices_dir.clone()));
    prices.invalidate();
    let benchmarks = CsvPriceAdapter::new(paths.prices_dir.clone());
    let feed = CsvFeedAdapter::new(paths.analyses_file.clone());

    eprintln!(
        "Recalculating as of {} (policy: {:?}, filter: {:?})",
        recalc_config.calculation_date, recalc_config.policy, recalc_config.status_filter,
    );

    let snapshot = match run_recalculation(&feed, &prices, &benchmarks, &recalc_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return Err((&e).into());
        }
    };

    Ok((snapshot, paths))
}

fn run_recalculate(
    config_path: &PathBuf,
    date: Option<&str>,
    policy: Option<&str>,
    force: bool,
    check_only: bool,
) -> ExitCode {
    // The due check needs config and date before the engine runs.
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let paths = match data_paths(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let calculation_date = match resolve_calculation_date(date) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let interval_days = adapter.get_int("recalculation", "interval_days", 7);
    let run_state = FileRunState::new(paths.output_dir.join("last_run"));

    let due = match run_state.is_due(calculation_date, interval_days) {
        Ok(due) => due,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if check_only {
        match run_state.last_run() {
            Ok(Some(last)) => eprintln!(
                "Last recalculation: {} ({} days ago)",
                last,
                (calculation_date - last).num_days()
            ),
            Ok(None) => eprintln!("No previous recalculation found"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
        eprintln!("Should run: {}", due);
        return if due {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        };
    }

    if !due && !force {
        eprintln!("Recalculation not due yet (interval: {interval_days} days); use --force to run anyway");
        return ExitCode::SUCCESS;
    }

    let (snapshot, paths) = match run_engine(config_path, date, policy, None, None) {
        Ok(result) => result,
        Err(code) => return code,
    };

    print_summary(&snapshot);

    match JsonSnapshotAdapter.write(&snapshot, &paths.output_dir) {
        Ok(path) => eprintln!("\nSnapshot written to: {}", path.display()),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    if let Err(e) = run_state.record_run(snapshot.calculation_date) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    ExitCode::SUCCESS
}

fn print_summary(snapshot: &PerformanceSnapshot) {
    let stats = &snapshot.run_stats;
    eprintln!("\n=== Recalculation Summary ===");
    eprintln!("Analyses processed: {}", stats.total_records);
    eprintln!("Calculated:         {}", stats.calculated);
    eprintln!(
        "Skipped:            {} (entry price {}, current price {}, bad entry {})",
        stats.skipped_no_entry_price + stats.skipped_no_current_price + stats.skipped_bad_entry_price,
        stats.skipped_no_entry_price,
        stats.skipped_no_current_price,
        stats.skipped_bad_entry_price,
    );

    if let Some(overall) = &snapshot.overall_stats {
        eprintln!("\n=== Overall ===");
        eprintln!("Positions:  {}", overall.count);
        eprintln!("Mean:       {:+.2}%", overall.mean);
        eprintln!("Median:     {:+.2}%", overall.median);
        eprintln!("Win rate:   {:.1}%", overall.win_rate);
        eprintln!("Std dev:    {:.2}", overall.std_dev);
    }

    if let Some(portfolio) = &snapshot.portfolio {
        eprintln!("\n=== Club Portfolio ({:?}) ===", portfolio.policy);
        eprintln!("Return:     {:+.2}%", portfolio.final_return_pct);
        eprintln!(
            "Value:      {:.2} (from {:.2})",
            portfolio.final_value, portfolio.base_value
        );
    }

    for benchmark in &snapshot.benchmarks {
        match (benchmark.return_pct, benchmark.alpha_pct) {
            (Some(ret), Some(alpha)) => eprintln!(
                "{}: {:+.2}% (alpha {:+.2}%)",
                benchmark.ticker, ret, alpha
            ),
            (Some(ret), None) => eprintln!("{}: {:+.2}%", benchmark.ticker, ret),
            _ => eprintln!("{}: no data for the comparison window", benchmark.ticker),
        }
    }

    if !snapshot.warnings.is_empty() {
        eprintln!("\nWarnings ({}):", snapshot.warnings.len());
        for warning in &snapshot.warnings {
            eprintln!("  - {}", warning);
        }
    }
}

fn run_analysts(
    config_path: &PathBuf,
    date: Option<&str>,
    annualized: bool,
    status: Option<&str>,
) -> ExitCode {
    let (snapshot, _) = match run_engine(config_path, date, None, status, Some(annualized)) {
        Ok(result) => result,
        Err(code) => return code,
    };

    if snapshot.analyst_stats.is_empty() {
        eprintln!("No analysts with calculable picks");
        return ExitCode::from(5);
    }

    // Ranked by mean return, best first; data rows to stdout.
    let mut ranked: Vec<_> = snapshot.analyst_stats.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.mean
            .partial_cmp(&a.1.mean)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("analyst,count,mean,median,win_rate,std_dev,best,worst");
    for (analyst, stats) in ranked {
        println!(
            "{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            analyst,
            stats.count,
            stats.mean,
            stats.median,
            stats.win_rate,
            stats.std_dev,
            stats.best,
            stats.worst,
        );
    }

    ExitCode::SUCCESS
}

fn run_portfolio(config_path: &PathBuf, date: Option<&str>, policy: Option<&str>) -> ExitCode {
    let (snapshot, _) = match run_engine(config_path, date, policy, None, None) {
        Ok(result) => result,
        Err(code) => return code,
    };

    let Some(portfolio) = &snapshot.portfolio else {
        eprintln!("No board-approved positions with resolvable prices");
        return ExitCode::from(5);
    };

    eprintln!(
        "Club portfolio, {:?}: {:+.2}% ({:.2} from {:.2})",
        portfolio.policy, portfolio.final_return_pct, portfolio.final_value, portfolio.base_value
    );
    for benchmark in &snapshot.benchmarks {
        if let (Some(ret), Some(alpha)) = (benchmark.return_pct, benchmark.alpha_pct) {
            eprintln!("  vs {}: {:+.2}% (alpha {:+.2}%)", benchmark.ticker, ret, alpha);
        }
    }

    println!("date,cumulative_return_pct");
    for point in &portfolio.points {
        println!("{},{:.4}", point.date, point.cumulative_return_pct);
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_recalculation_config(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(config_path: &PathBuf, entity: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let paths = match data_paths(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let prices = CsvPriceAdapter::new(paths.prices_dir);

    let entities = match entity {
        Some(e) => vec![e.to_string()],
        None => match prices.list_entities() {
            Ok(list) => list,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    if entities.is_empty() {
        eprintln!("No price data found");
        return ExitCode::from(5);
    }

    for entity_id in &entities {
        match prices.data_range(entity_id) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} observations, {} to {}", entity_id, count, first, last);
            }
            Ok(None) => eprintln!("{}: no data found", entity_id),
            Err(e) => eprintln!("error querying {}: {}", entity_id, e),
        }
    }

    ExitCode::SUCCESS
}
