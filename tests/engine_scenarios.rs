//! Integration tests for the simulation engine against hand-computed runs.

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDateTime};

use meter_sim::sim::battery::{BatteryState, OverchargePolicy};
use meter_sim::sim::engine::Engine;
use meter_sim::sim::tariff::{TariffPeriod, TariffSchedule};
use meter_sim::sim::types::Sample;

fn period(start: &str, daily: f64, kwh: f64, feed_in: f64) -> TariffPeriod {
    TariffPeriod {
        start: start.parse().unwrap(),
        daily,
        kwh,
        feed_in,
    }
}

/// 10 kWh battery, 5 kWh/h rate, 90% recharge efficiency.
fn battery(initial: f64) -> BatteryState {
    BatteryState::new(10.0, initial, 5.0, 90.0, OverchargePolicy::Warn)
}

fn engine_with(battery: BatteryState, periods: Vec<TariffPeriod>, max_minutes: i64) -> Engine {
    Engine::new(
        TariffSchedule::new(periods),
        battery,
        Duration::minutes(max_minutes),
    )
}

fn sample(ts: &str, import: &str, export: &str, generation: &str) -> Sample {
    Sample {
        timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
        import: import.to_string(),
        export: export.to_string(),
        generation: generation.to_string(),
    }
}

#[test]
fn first_sample_only_seeds_the_timeline() {
    let mut engine = engine_with(
        battery(5.0),
        vec![period("2021-07-01", 100.0, 30.0, 10.0)],
        10,
    );
    engine.observe(&sample("2023-06-01 00:00", "100.0", "50.0", "200.0"));

    assert_eq!(engine.no_solar().cost_cents, 0.0);
    assert_eq!(engine.solar().cost_cents, 0.0);
    assert_eq!(engine.solar_battery().cost_cents, 0.0);
    assert_eq!(engine.run_totals().consumption_kwh, 0.0);
    assert_eq!(
        engine.last_timestamp(),
        Some(NaiveDateTime::parse_from_str("2023-06-01 00:00", "%Y-%m-%d %H:%M").unwrap())
    );
}

#[test]
fn valid_intervals_update_all_three_scenarios() {
    let mut engine = engine_with(
        battery(5.0),
        vec![period("2021-07-01", 100.0, 30.0, 10.0)],
        10,
    );
    engine.observe(&sample("2023-06-01 00:00", "100.0", "50.0", "200.0"));
    // Import rises 0.3, generation 0.5: 0.8 kWh consumed, battery covers
    // the whole import (cap is 0.5 kWh for 6 minutes at 5 kWh/h).
    engine.observe(&sample("2023-06-01 00:06", "100.3", "50.0", "200.5"));
    // Export rises 0.4, generation 0.9: the battery absorbs all export.
    engine.observe(&sample("2023-06-01 00:12", "100.3", "50.4", "201.4"));

    let no_solar = engine.no_solar();
    assert_relative_eq!(no_solar.imported_kwh, 1.3, epsilon = 1e-9);
    assert_relative_eq!(no_solar.cost_cents, 39.0, epsilon = 1e-9);

    let solar = engine.solar();
    assert_relative_eq!(solar.imported_kwh, 0.3, epsilon = 1e-9);
    assert_relative_eq!(solar.exported_kwh, 0.4, epsilon = 1e-9);
    assert_relative_eq!(solar.cost_cents, 5.0, epsilon = 1e-9);

    let with_battery = engine.solar_battery();
    assert_relative_eq!(with_battery.imported_kwh, 0.0, epsilon = 1e-9);
    assert_relative_eq!(with_battery.exported_kwh, 0.0, epsilon = 1e-9);
    assert_relative_eq!(with_battery.cost_cents, 0.0, epsilon = 1e-9);

    let run = engine.run_totals();
    assert_relative_eq!(run.consumption_kwh, 1.3, epsilon = 1e-9);
    assert_relative_eq!(run.discharge_kwh, 0.3, epsilon = 1e-9);
    assert_relative_eq!(run.charge_kwh, 0.4, epsilon = 1e-9);
    // 5.0 - 0.3 discharged + 0.4 * 0.9 stored
    assert_relative_eq!(engine.battery().charge_level(), 5.06, epsilon = 1e-9);
}

#[test]
fn gap_excludes_interval_but_advances_the_timeline() {
    let mut engine = engine_with(
        battery(5.0),
        vec![period("2021-07-01", 100.0, 30.0, 10.0)],
        10,
    );
    engine.observe(&sample("2023-06-01 00:00", "100.0", "50.0", "200.0"));
    // 25 minutes with a 10-minute maximum: the interval is discarded and
    // the accumulators re-base.
    engine.observe(&sample("2023-06-01 00:25", "102.0", "51.0", "203.0"));

    assert_eq!(engine.no_solar().cost_cents, 0.0);
    assert_eq!(engine.run_totals().consumption_kwh, 0.0);
    assert_eq!(
        engine.last_timestamp(),
        Some(NaiveDateTime::parse_from_str("2023-06-01 00:25", "%Y-%m-%d %H:%M").unwrap())
    );

    // The next sample is a valid interval, but it re-bases the discarded
    // baselines, so it still contributes nothing.
    engine.observe(&sample("2023-06-01 00:30", "102.5", "51.0", "203.5"));
    assert_eq!(engine.run_totals().consumption_kwh, 0.0);

    // Only now do deltas flow again.
    engine.observe(&sample("2023-06-01 00:35", "103.0", "51.2", "204.0"));
    assert_relative_eq!(engine.run_totals().consumption_kwh, 0.8, epsilon = 1e-9);
}

#[test]
fn solar_never_imports_more_than_no_solar() {
    let mut engine = engine_with(
        battery(5.0),
        vec![period("2021-07-01", 100.0, 30.0, 10.0)],
        10,
    );
    // Generation always covers export, as it does physically.
    let rows = [
        ("2023-06-01 00:00", "100.0", "50.0", "200.0"),
        ("2023-06-01 00:05", "100.4", "50.1", "200.3"),
        ("2023-06-01 00:10", "100.4", "50.9", "201.5"),
        ("2023-06-01 00:15", "101.2", "50.9", "201.8"),
        ("2023-06-01 00:20", "101.3", "51.4", "202.6"),
    ];
    for (ts, imp, exp, r#gen) in rows {
        engine.observe(&sample(ts, imp, exp, r#gen));
    }
    assert!(engine.solar().imported_kwh <= engine.no_solar().imported_kwh);
}

#[test]
fn battery_covers_import_when_charged() {
    let mut engine = engine_with(
        battery(10.0),
        vec![period("2021-07-01", 100.0, 30.0, 10.0)],
        60,
    );
    engine.observe(&sample("2023-06-01 00:00", "100.0", "", ""));
    // 3 kWh imported over one hour: the 5 kWh/h cap and the full charge
    // both exceed it, so the battery serves everything.
    engine.observe(&sample("2023-06-01 01:00", "103.0", "", ""));

    assert_relative_eq!(engine.battery().charge_level(), 7.0, epsilon = 1e-9);
    assert_relative_eq!(engine.run_totals().discharge_kwh, 3.0, epsilon = 1e-9);
    assert_eq!(engine.solar_battery().imported_kwh, 0.0);
    assert_eq!(engine.solar_battery().cost_cents, 0.0);
    // The no-battery scenario pays for the same import.
    assert_relative_eq!(engine.solar().cost_cents, 90.0, epsilon = 1e-9);
}

#[test]
fn charge_totals_count_grid_side_energy() {
    let mut engine = engine_with(
        battery(0.0),
        vec![period("2021-07-01", 100.0, 30.0, 10.0)],
        60,
    );
    engine.observe(&sample("2023-06-01 00:00", "", "50.0", "200.0"));
    engine.observe(&sample("2023-06-01 01:00", "", "54.0", "204.5"));

    // 4 kWh exported, all absorbed: totals count the grid-side draw while
    // the battery stores the efficiency-adjusted amount.
    assert_relative_eq!(engine.run_totals().charge_kwh, 4.0, epsilon = 1e-9);
    assert_relative_eq!(engine.battery().charge_level(), 3.6, epsilon = 1e-9);
    assert_eq!(engine.solar_battery().exported_kwh, 0.0);
}

#[test]
fn tariff_period_is_resolved_per_interval() {
    let mut engine = engine_with(
        battery(0.0),
        vec![
            period("2021-07-01", 100.0, 30.0, 10.0),
            period("2022-07-01", 120.0, 60.0, 5.0),
        ],
        10,
    );
    engine.observe(&sample("2022-06-30 23:50", "100.0", "", ""));
    // Still 2022-06-30: billed at 30 c/kWh.
    engine.observe(&sample("2022-06-30 23:55", "101.0", "", ""));
    // Crossing midnight into the second period: billed at 60 c/kWh.
    engine.observe(&sample("2022-07-01 00:00", "102.0", "", ""));

    assert_relative_eq!(engine.no_solar().cost_cents, 90.0, epsilon = 1e-9);
}

#[test]
fn end_day_applies_the_daily_charge_to_every_scenario() {
    let mut engine = engine_with(
        battery(5.0),
        vec![
            period("2021-07-01", 100.0, 30.0, 10.0),
            period("2022-07-01", 120.0, 60.0, 5.0),
        ],
        10,
    );

    // No samples yet: the first period's charge applies.
    engine.end_day();
    assert_eq!(engine.no_solar().cost_cents, 100.0);
    assert_eq!(engine.solar().cost_cents, 100.0);
    assert_eq!(engine.solar_battery().cost_cents, 100.0);
    assert_eq!(engine.run_totals().days_processed, 1);

    // After a sample dated in the second period, its daily charge applies.
    engine.observe(&sample("2022-08-01 00:00", "100.0", "", ""));
    engine.end_day();
    assert_eq!(engine.no_solar().cost_cents, 220.0);
    assert_eq!(engine.run_totals().days_processed, 2);
}
