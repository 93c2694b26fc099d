//! Command-line driver running a multi-day rolling simulation.

use clap::Parser;
use log::info;
use prodsched_ga::config::Config;
use prodsched_ga::order::{Order, OrderPool};
use prodsched_ga::rolling::RollingScheduler;
use prodsched_ga::utils::{format_duration, save_simulation_json, simulation_report};
use std::path::PathBuf;
use std::time::Instant;

/// Rolling-horizon production scheduling with a genetic algorithm.
#[derive(Parser, Debug)]
#[command(name = "prodsched", version, about)]
struct Args {
    /// Order CSV file (order_id,product,quantity[,release_slot],due_slot,unit_price)
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Number of days to simulate
    #[arg(long, default_value_t = 3)]
    days: u32,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of islands; more than one enables the island engine
    #[arg(long)]
    islands: Option<usize>,

    /// Use the risk-guided local search
    #[arg(long)]
    risk_ls: bool,

    /// Idle a day whose planned production would lose money
    #[arg(long)]
    stoploss: bool,

    /// Keep due slots from the CSV as they are
    #[arg(long)]
    no_adjust_due: bool,

    /// Write the simulation result as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Nine orders arriving over three days, three per product family.
fn demo_orders() -> Vec<Order> {
    vec![
        Order::new(1, 1, 100, 1, 6, 50.0),
        Order::new(2, 2, 120, 1, 12, 60.0),
        Order::new(3, 3, 90, 1, 18, 55.0),
        Order::new(4, 1, 150, 7, 12, 50.0),
        Order::new(5, 2, 130, 7, 18, 60.0),
        Order::new(6, 3, 110, 7, 24, 55.0),
        Order::new(7, 1, 140, 13, 18, 50.0),
        Order::new(8, 2, 160, 13, 24, 60.0),
        Order::new(9, 3, 120, 13, 30, 55.0),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::new(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(islands) = args.islands {
        config = config.with_islands(islands);
    }
    if args.risk_ls {
        config = config.with_risk_guided_ls(true);
    }
    if args.stoploss {
        config = config.with_stoploss(true);
    }
    config.validate()?;

    let pool = match &args.orders {
        Some(path) => {
            info!("Loading orders from: {}", path.display());
            OrderPool::from_csv(path, config.slots_per_day, !args.no_adjust_due)?
        }
        None => {
            info!("Using the built-in demo orders");
            OrderPool::with_orders(config.slots_per_day, demo_orders())
        }
    };
    info!(
        "{} orders, {} lines, {} products, {} days",
        pool.len(),
        config.num_lines,
        config.num_products,
        args.days
    );

    let start_time = Instant::now();
    let mut scheduler = RollingScheduler::new(config, pool);
    let result = scheduler.run_simulation(args.days)?;
    let runtime = start_time.elapsed();

    println!("{}", simulation_report(&result));
    println!("Simulation completed in {}", format_duration(runtime));

    if let Some(path) = &args.output {
        save_simulation_json(&result, path)?;
        info!("Saved simulation result to: {}", path.display());
    }

    Ok(())
}
