use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use disparity::prelude::*;
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "disparity")]
#[command(about = "A Rust-based disparity index strategy backtester for stocks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a single backtest
    Run {
        //path to a json configuration file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        //path to csv data file
        #[arg(long)]
        data: Option<PathBuf>,

        //symbol to backtest (eg RELIANCE, TCS)
        #[arg(long)]
        symbol: Option<String>,

        //baseline ema length
        #[arg(long)]
        length: Option<usize>,

        //short smoothing period
        #[arg(long)]
        short: Option<usize>,

        //long smoothing period
        #[arg(long)]
        long: Option<usize>,

        //initial capital
        #[arg(long)]
        capital: Option<f64>,

        //output path for the indicator series csv
        #[arg(long)]
        output_indicator_csv: Option<PathBuf>,

        //output path for the trade ledger csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,
    },

    //run every parameter combination of a grid, in parallel
    Sweep {
        //path to csv data file
        #[arg(long)]
        data: PathBuf,

        //symbol to backtest
        #[arg(long)]
        symbol: String,

        //initial capital
        #[arg(long, default_value = "100000")]
        capital: f64,

        //baseline ema lengths, comma separated
        #[arg(long, value_delimiter = ',')]
        lengths: Vec<usize>,

        //short smoothing periods, comma separated
        #[arg(long, value_delimiter = ',')]
        shorts: Vec<usize>,

        //long smoothing periods, comma separated
        #[arg(long, value_delimiter = ',')]
        longs: Vec<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            symbol,
            length,
            short,
            long,
            capital,
            output_indicator_csv,
            output_trades_csv,
        } => {
            let mut configuration = match config {
                Some(path) => BacktestConfiguration::from_json_file(&path)
                    .context(format!("Failed to load configuration from {:?}", path))?,
                None => BacktestConfiguration::default(),
            };

            //cli flags override the configuration file
            if let Some(data) = data {
                configuration.data_path = data;
            }
            if let Some(symbol) = symbol {
                configuration.symbol = symbol;
            }
            if let Some(length) = length {
                configuration.params.length = length;
            }
            if let Some(short) = short {
                configuration.params.short_period = short;
            }
            if let Some(long) = long {
                configuration.params.long_period = long;
            }
            if let Some(capital) = capital {
                configuration.initial_capital = capital;
            }
            if output_indicator_csv.is_some() {
                configuration.output_indicator_csv = output_indicator_csv;
            }
            if output_trades_csv.is_some() {
                configuration.output_trades_csv = output_trades_csv;
            }

            run_backtest(configuration)?;
        }
        Commands::Sweep {
            data,
            symbol,
            capital,
            lengths,
            shorts,
            longs,
        } => {
            run_sweep(data, symbol, capital, lengths, shorts, longs)?;
        }
    }

    Ok(())
}

fn load_series(data_path: &PathBuf, symbol: &str) -> Result<Vec<Bar>> {
    println!("Loading data from {:?}...", data_path);
    let all_bars =
        load_csv(data_path).context(format!("Failed to load data from {:?}", data_path))?;

    //filter by symbol
    let bars = filter_by_symbol(&all_bars, symbol);

    if bars.is_empty() {
        anyhow::bail!("No data found for symbol {}", symbol);
    }

    validate_series(&bars)?;

    println!("Loaded {} bars for {}", bars.len(), symbol);
    println!(
        "Date range: {} to {}\n",
        bars.first().unwrap().timestamp,
        bars.last().unwrap().timestamp
    );

    Ok(bars)
}

fn run_backtest(configuration: BacktestConfiguration) -> Result<()> {
    println!("Disparity Index Backtester");
    println!("==========================\n");

    let bars = load_series(&configuration.data_path, &configuration.symbol)?;

    let params = configuration.params;
    if configuration.initial_capital <= 0.0 {
        anyhow::bail!(
            "Initial capital must be positive, got {}",
            configuration.initial_capital
        );
    }
    if params.length == 0 || params.short_period == 0 || params.long_period == 0 {
        anyhow::bail!("Smoothing periods must be at least 1");
    }

    println!(
        "Strategy: Disparity Index (length={}, short={}, long={})",
        params.length, params.short_period, params.long_period
    );
    println!("Initial capital: {:.2}\n", configuration.initial_capital);

    //explicit pipeline: load -> compute -> run -> render
    let rows = compute(&bars, params.length, params.short_period, params.long_period);

    let engine = BacktestEngine::new(
        params.short_period,
        params.long_period,
        configuration.initial_capital,
    )?;

    println!("Running backtest...\n");
    let result = engine.run(&rows);

    //replay the buy/sell notifications from the simulation
    for event in &result.events {
        match event {
            TradeEvent::Buy {
                date,
                price,
                shares,
            } => {
                println!(
                    "BUY  {} @ {:.2} ({:.2} shares)",
                    date.format("%Y-%m-%d"),
                    price,
                    shares
                );
            }
            TradeEvent::Sell {
                date,
                price,
                profit_loss,
            } => {
                println!(
                    "SELL {} @ {:.2} (P/L: {:.2})",
                    date.format("%Y-%m-%d"),
                    price,
                    profit_loss
                );
            }
        }
    }
    if !result.events.is_empty() {
        println!();
    }

    //display results
    println!("Backtest Results");
    println!("================\n");
    let summary = SummaryMetrics::from_backtest(&result);
    summary.pretty_print_table();

    if result.trades.is_empty() {
        println!("\nNo trades for this strategy.");
    } else {
        println!("\nTrade History");
        pretty_print_trades(&result.trades);
    }

    //save outputs if requested
    if let Some(indicator_path) = &configuration.output_indicator_csv {
        save_indicator_csv(&rows, indicator_path)?;
        println!("\nIndicator series saved to {:?}", indicator_path);
    }

    if let Some(trades_path) = &configuration.output_trades_csv {
        save_trades_csv(&result.trades, trades_path)?;
        println!("Trades saved to {:?}", trades_path);
    }

    Ok(())
}

fn run_sweep(
    data: PathBuf,
    symbol: String,
    capital: f64,
    lengths: Vec<usize>,
    shorts: Vec<usize>,
    longs: Vec<usize>,
) -> Result<()> {
    println!("Disparity Index Parameter Sweep");
    println!("===============================\n");

    if capital <= 0.0 {
        anyhow::bail!("Initial capital must be positive, got {}", capital);
    }

    let bars = load_series(&data, &symbol)?;

    let grid = SweepGrid {
        lengths,
        short_periods: shorts,
        long_periods: longs,
    };

    if grid
        .lengths
        .iter()
        .chain(&grid.short_periods)
        .chain(&grid.long_periods)
        .any(|&value| value == 0)
    {
        anyhow::bail!("Smoothing periods must be at least 1");
    }

    let combos = grid.combinations();
    if combos.is_empty() {
        anyhow::bail!("Parameter grid has no valid combination (short must be < long)");
    }

    println!("Running {} parameter combinations...\n", combos.len());

    //each run owns its state, so the combinations are embarrassingly parallel
    let outcomes: Vec<(DisparityParams, BacktestResult)> = combos
        .par_iter()
        .map(|&params| {
            let rows = compute(&bars, params.length, params.short_period, params.long_period);
            let engine = BacktestEngine::new(params.short_period, params.long_period, capital)
                .expect("grid expansion only yields valid period pairs");
            (params, engine.run(&rows))
        })
        .collect();

    //keyed by parameter label, insertion order follows the grid
    let mut by_label: IndexMap<String, (DisparityParams, BacktestResult)> = IndexMap::new();
    for (params, result) in outcomes {
        by_label.insert(params.label(), (params, result));
    }

    let mut ranked: Vec<&(DisparityParams, BacktestResult)> = by_label.values().collect();
    ranked.sort_by(|a, b| {
        b.1.total_return_pct
            .partial_cmp(&a.1.total_return_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Parameters"),
        Cell::new("Total Return"),
        Cell::new("Final Value"),
        Cell::new("Trades"),
    ]));

    for (params, result) in ranked {
        table.add_row(Row::new(vec![
            Cell::new(&params.label()),
            Cell::new(&format!("{:.2}%", result.total_return_pct)),
            Cell::new(&format!("{:.2}", result.final_value)),
            Cell::new(&format!("{}", result.trades.len())),
        ]));
    }

    table.printstd();

    Ok(())
}

fn save_indicator_csv(rows: &[IndicatorRow], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "timestamp,close,short_smoothed,long_smoothed")?;

    for row in rows {
        writeln!(
            file,
            "{},{},{},{}",
            row.timestamp.to_rfc3339(),
            row.close,
            row.short_smoothed,
            row.long_smoothed
        )?;
    }

    Ok(())
}

fn save_trades_csv(trades: &[TradeRecord], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "entry_date,entry_price,exit_date,exit_price,profit_loss")?;

    for trade in trades {
        writeln!(
            file,
            "{},{},{},{},{}",
            trade.entry_date.to_rfc3339(),
            trade.entry_price,
            trade.exit_date.to_rfc3339(),
            trade.exit_price,
            trade.profit_loss
        )?;
    }

    Ok(())
}
