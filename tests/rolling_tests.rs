//! Integration tests for the rolling scheduler.

use prodsched_ga::config::Config;
use prodsched_ga::order::{Order, OrderPool};
use prodsched_ga::rolling::RollingScheduler;
use prodsched_ga::schedule::{AllocationEntry, DemandBasis};

fn demo_orders() -> Vec<Order> {
    vec![
        Order::new(1, 1, 100, 1, 7, 50.0),
        Order::new(2, 2, 120, 1, 13, 60.0),
        Order::new(3, 3, 90, 1, 19, 55.0),
        Order::new(4, 1, 150, 7, 13, 50.0),
        Order::new(5, 2, 130, 7, 19, 60.0),
        Order::new(6, 3, 110, 7, 25, 55.0),
        Order::new(7, 1, 400, 13, 19, 50.0),
        Order::new(8, 2, 160, 13, 25, 60.0),
        Order::new(9, 3, 120, 13, 31, 55.0),
    ]
}

fn test_config(seed: u64) -> Config {
    Config::new()
        .with_population_size(12)
        .with_elite_size(2)
        .with_max_generations(10)
        .with_max_ls_iterations(10)
        .with_planning_horizon_days(3)
        .with_seed(seed)
}

fn create_scheduler(config: Config, orders: Vec<Order>) -> RollingScheduler {
    let pool = OrderPool::with_orders(config.slots_per_day, orders);
    RollingScheduler::new(config, pool)
}

fn entries_in(entries: &[AllocationEntry], slots: &[u32]) -> Vec<AllocationEntry> {
    entries
        .iter()
        .filter(|e| slots.contains(&e.slot))
        .copied()
        .collect()
}

#[test]
fn test_frozen_slots_are_never_rewritten() {
    let mut scheduler = create_scheduler(test_config(7), demo_orders());

    for day in 0..4 {
        let frozen: Vec<u32> = scheduler.frozen_slots().iter().copied().collect();
        let before = entries_in(&scheduler.current_schedule().entries(), &frozen);

        scheduler.run_daily_schedule(day);

        let after = entries_in(&scheduler.current_schedule().entries(), &frozen);
        assert_eq!(before, after, "frozen allocations changed on day {}", day + 1);

        let current_slot = day * 6 + 1;
        assert!((1..current_slot).all(|s| scheduler.frozen_slots().contains(&s)));
        // Today's slots are executed and frozen as well
        assert!((current_slot..current_slot + 6).all(|s| scheduler.frozen_slots().contains(&s)));
    }
}

#[test]
fn test_penalty_charged_once() {
    let config = test_config(11).with_max_generations(3);
    let penalty_rate = config.penalty_rate;
    let mut scheduler = create_scheduler(config, demo_orders());

    let result = scheduler.run_simulation(6).unwrap();

    let charged: f64 = result.statistics.daily.iter().map(|d| d.penalty).sum();
    let expected: f64 = scheduler
        .order_pool()
        .orders()
        .filter(|o| o.penalized)
        .map(|o| o.penalty_amount(penalty_rate))
        .sum();
    assert!((charged - expected).abs() < 1e-6);

    for order in scheduler.order_pool().orders() {
        if order.penalized {
            assert!(order.due_slot <= 6 * 5 + 1);
        }
    }
}

#[test]
fn test_commit_updates_orders() {
    let mut scheduler = create_scheduler(test_config(3), demo_orders());

    let result = scheduler.run_simulation(4).unwrap();

    let revenue: f64 = scheduler
        .order_pool()
        .orders()
        .map(|o| o.completed_quantity() as f64 * o.unit_price)
        .sum();
    assert!((result.statistics.total_revenue - revenue).abs() < 1e-6);

    for order in scheduler.order_pool().orders() {
        let history = result.order_history(order.order_id);
        assert_eq!(history.len(), 4);
        let produced: u32 = history.iter().map(|(_, p)| p.produced_today).sum();
        assert_eq!(produced, order.completed_quantity());

        let (_, last) = history.last().unwrap();
        assert_eq!(last.remaining, order.remaining);
        assert_eq!(last.is_finished, order.is_completed());
        if let Some(slot) = order.completed_slot {
            assert!(order.is_completed());
            assert!(slot >= order.release_slot);
        }
    }
}

#[test]
fn test_cumulative_statistics_consistent() {
    let mut scheduler = create_scheduler(test_config(5), demo_orders());
    scheduler.run_simulation(3).unwrap();

    let stats = scheduler.cumulative_statistics().unwrap();
    let daily_profit: f64 = stats.daily.iter().map(|d| d.profit).sum();

    assert_eq!(stats.daily.len(), 3);
    assert!((stats.total_profit - daily_profit).abs() < 0.01);
    assert!(
        (stats.total_profit - (stats.total_revenue - stats.total_cost - stats.total_penalty)).abs() < 1e-9
    );
    assert_eq!(stats.total_orders, 9);
    assert!(stats.on_time_orders <= stats.completed_orders);
}

#[test]
fn test_idle_days() {
    let orders = vec![Order::new(1, 1, 100, 13, 19, 50.0)];
    let mut scheduler = create_scheduler(test_config(1), orders);

    assert!(scheduler.run_daily_schedule(0).is_none());
    assert!(scheduler.frozen_slots().is_empty());
    assert!(scheduler.run_daily_schedule(1).is_none());
    assert_eq!(scheduler.frozen_slots().len(), 6);

    let stats = scheduler.daily_stats();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|d| d.profit == 0.0 && d.revenue == 0.0 && d.eligible_orders == 0));

    let window = scheduler.run_daily_schedule(2);
    assert!(window.is_some());
    assert!(scheduler.current_schedule().entries().iter().all(|e| e.slot >= 13));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let first = create_scheduler(test_config(42), demo_orders())
        .run_simulation(3)
        .unwrap();
    let second = create_scheduler(test_config(42), demo_orders())
        .run_simulation(3)
        .unwrap();

    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first.final_schedule.entries(), second.final_schedule.entries());
}

fn overdue_backlog() -> Vec<Order> {
    // Far more than one day can produce, due in the first slot
    vec![Order::new(1, 1, 100_000, 1, 1, 50.0)]
}

#[test]
fn test_overdue_backlog_is_produced_without_stoploss() {
    let mut scheduler = create_scheduler(test_config(9), overdue_backlog());

    scheduler.run_daily_schedule(0).unwrap();
    let stats = &scheduler.daily_stats()[0];

    assert!(!stats.stoploss_triggered);
    assert!(stats.revenue > 0.0);
    assert!((stats.penalty - 500_000.0).abs() < 1e-6);
}

#[test]
fn test_stoploss_idles_only_today() {
    let config = test_config(9).with_stoploss(true);
    let mut scheduler = create_scheduler(config.clone(), overdue_backlog());
    let today: Vec<u32> = (1..=6).collect();

    let window = scheduler.run_daily_schedule(0).unwrap();
    let stats = scheduler.daily_stats()[0].clone();

    // Today's revenue cannot cover the penalty charged today
    assert!(stats.stoploss_triggered);
    assert_eq!(stats.revenue, 0.0);
    assert_eq!(stats.cost, 0.0);
    assert!((stats.penalty - 500_000.0).abs() < 1e-6);
    assert!((stats.profit + 500_000.0).abs() < 1e-6);

    let window_entries = window.entries();
    assert!(entries_in(&window_entries, &today).is_empty());
    assert!(window_entries.iter().any(|e| e.slot > 6));

    let global_entries = scheduler.current_schedule().entries();
    assert!(entries_in(&global_entries, &today).is_empty());
    assert!(global_entries.iter().any(|e| e.slot > 6));
    assert_eq!(scheduler.order_pool().get(1).unwrap().remaining, 100_000);

    // The returned window reports the metrics of what is left after idling
    let orders: Vec<Order> = scheduler.order_pool().orders().cloned().collect();
    let mut recomputed = window.clone();
    recomputed.calculate_metrics(&orders, &config, DemandBasis::Remaining);
    assert!(window.completed_quantity(1) > 0);
    assert!((window.revenue - recomputed.revenue).abs() < 1e-6);
    assert!((window.cost - recomputed.cost).abs() < 1e-6);
    assert!((window.penalty - recomputed.penalty).abs() < 1e-6);
    assert!((window.profit - recomputed.profit).abs() < 1e-6);
    let labor: f64 = window
        .working_line_slots()
        .iter()
        .map(|&(_, slot)| config.labor_cost(slot))
        .sum();
    assert!((window.cost - labor).abs() < 1e-6);
}
