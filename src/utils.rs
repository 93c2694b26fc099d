//! Reporting helpers: duration formatting, text reports and JSON export.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::order::Order;
use crate::rolling::SimulationResult;
use crate::schedule::Schedule;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Render a schedule as text: metrics, one block per line listing
/// `slot: product (order x quantity, ...)`, then per-order completion.
pub fn schedule_report(schedule: &Schedule, orders: &[Order], config: &Config) -> String {
    let mut out = String::new();
    let stats = schedule.statistics(orders);

    let _ = writeln!(out, "Revenue: {:.2}", schedule.revenue);
    let _ = writeln!(out, "Labor Cost: {:.2}", schedule.cost);
    let _ = writeln!(out, "Penalty: {:.2}", schedule.penalty);
    let _ = writeln!(out, "Profit: {:.2}", schedule.profit);
    let _ = writeln!(
        out,
        "Orders Covered: {}/{} ({:.1}%)",
        stats.completed_orders,
        stats.total_orders,
        stats.on_time_rate * 100.0
    );
    let _ = writeln!(out, "Working Line-Slots: {}", stats.total_working_slots);
    let _ = writeln!(out);

    for line in 1..=config.num_lines {
        let _ = write!(out, "Line #{}:", line);
        let by_slot = schedule.line_schedule(line);
        if by_slot.is_empty() {
            let _ = writeln!(out, " idle");
            continue;
        }
        let _ = writeln!(out);
        for (slot, entries) in &by_slot {
            let product = schedule.slot_product(line, *slot, orders);
            let served: Vec<String> = entries
                .iter()
                .map(|(order_id, qty)| format!("#{} x{}", order_id, qty))
                .collect();
            let _ = writeln!(out, "  slot {:>4}: P{} ({})", slot, product, served.join(", "));
        }
    }
    let _ = writeln!(out);

    for order in orders {
        let (completed, done) = schedule.completion_status(order);
        let _ = writeln!(
            out,
            "Order #{}: P{} {}/{} due {}{}",
            order.order_id,
            order.product,
            completed,
            order.quantity,
            order.due_slot,
            if done { "" } else { " (short)" }
        );
    }

    out
}

/// Render the per-day table and totals of a simulation.
pub fn simulation_report(result: &SimulationResult) -> String {
    let mut out = String::new();
    let stats = &result.statistics;

    let _ = writeln!(
        out,
        "{:>4} {:>6} {:>8} {:>12} {:>12} {:>12} {:>12} {:>9}",
        "Day", "Slot", "Eligible", "Revenue", "Cost", "Penalty", "Profit", "Completed"
    );
    for day in &result.days {
        let d = &day.stats;
        let _ = writeln!(
            out,
            "{:>4} {:>6} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>9}{}",
            d.day,
            d.current_slot,
            d.eligible_orders,
            d.revenue,
            d.cost,
            d.penalty,
            d.profit,
            d.completed_orders,
            if d.stoploss_triggered { " stop-loss" } else { "" }
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Revenue: {:.2}", stats.total_revenue);
    let _ = writeln!(out, "Total Cost: {:.2}", stats.total_cost);
    let _ = writeln!(out, "Total Penalty: {:.2}", stats.total_penalty);
    let _ = writeln!(out, "Total Profit: {:.2}", stats.total_profit);
    let _ = writeln!(
        out,
        "Completed Orders: {}/{} ({} on time, {:.1}%)",
        stats.completed_orders,
        stats.total_orders,
        stats.on_time_orders,
        stats.on_time_rate * 100.0
    );

    out
}

/// Save a schedule report to a file.
pub fn save_schedule<P: AsRef<Path>>(
    schedule: &Schedule,
    orders: &[Order],
    config: &Config,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(schedule_report(schedule, orders, config).as_bytes())?;
    Ok(())
}

/// Write a simulation result as pretty-printed JSON.
pub fn save_simulation_json<P: AsRef<Path>>(result: &SimulationResult, path: P) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.flush()?;
    Ok(())
}
