//! End-of-run report derived from the engine totals.

use std::fmt;

use crate::sim::engine::Engine;
use crate::sim::types::{RunTotals, ScenarioTotals};

/// Economic outcome of one scenario, converted to dollars.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioSummary {
    /// Total cost over the run (dollars).
    pub cost_dollars: f64,
    /// Energy imported from the grid (kWh).
    pub imported_kwh: f64,
    /// Energy exported to the grid (kWh).
    pub exported_kwh: f64,
}

/// Head-to-head savings between two scenarios (dollars).
#[derive(Debug, Clone, Copy)]
pub struct Savings {
    pub total: f64,
    pub per_day: f64,
    pub per_year: f64,
}

/// Complete end-of-run report.
///
/// Computed once from the final engine state so that the printed figures and
/// any programmatic consumers see the same numbers.
#[derive(Debug, Clone)]
pub struct Report {
    /// Days processed.
    pub days: u32,
    /// Elapsed-years estimate, `days / 365.25`.
    pub years: f64,
    pub no_solar: ScenarioSummary,
    pub solar: ScenarioSummary,
    pub solar_battery: ScenarioSummary,
    /// No-solar-equivalent consumption across the run (kWh).
    pub consumption_kwh: f64,
    /// Grid-side energy drawn to charge the battery (kWh).
    pub charge_kwh: f64,
    /// Energy the battery supplied in place of imports (kWh).
    pub discharge_kwh: f64,
    pub no_solar_vs_solar: Savings,
    pub no_solar_vs_solar_battery: Savings,
    pub solar_vs_solar_battery: Savings,
}

impl Report {
    /// Builds the report from a finished engine.
    pub fn from_engine(engine: &Engine) -> Self {
        Self::from_totals(
            engine.no_solar(),
            engine.solar(),
            engine.solar_battery(),
            engine.run_totals(),
        )
    }

    fn from_totals(
        no_solar: &ScenarioTotals,
        solar: &ScenarioTotals,
        solar_battery: &ScenarioTotals,
        run: &RunTotals,
    ) -> Self {
        let days = run.days_processed;
        let years = f64::from(days) / 365.25;

        let summarize = |t: &ScenarioTotals| ScenarioSummary {
            cost_dollars: t.cost_cents / 100.0,
            imported_kwh: t.imported_kwh,
            exported_kwh: t.exported_kwh,
        };
        // A run that processed no days has nothing to divide by.
        let diff = |a: &ScenarioTotals, b: &ScenarioTotals| {
            let total = (a.cost_cents - b.cost_cents) / 100.0;
            Savings {
                total,
                per_day: if days > 0 { total / f64::from(days) } else { 0.0 },
                per_year: if days > 0 { total / years } else { 0.0 },
            }
        };

        Self {
            days,
            years,
            no_solar: summarize(no_solar),
            solar: summarize(solar),
            solar_battery: summarize(solar_battery),
            consumption_kwh: run.consumption_kwh,
            charge_kwh: run.charge_kwh,
            discharge_kwh: run.discharge_kwh,
            no_solar_vs_solar: diff(no_solar, solar),
            no_solar_vs_solar_battery: diff(no_solar, solar_battery),
            solar_vs_solar_battery: diff(solar, solar_battery),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, title: &str, s: &ScenarioSummary| {
            let cost = format!("${:.2}", s.cost_dollars);
            let pa = if self.years > 0.0 {
                format!("${:.2}", s.cost_dollars / self.years)
            } else {
                "$0.00".to_string()
            };
            writeln!(
                f,
                "{title:<14}| {cost:>10} | {pa:>9} | {:>8.0} | {:>8.0} |",
                s.imported_kwh, s.exported_kwh
            )
        };
        let savings = |f: &mut fmt::Formatter<'_>, label: &str, s: &Savings| {
            writeln!(
                f,
                "Between {label}: total ${:.2}, per day: ${:.2}, per year: ${:.2}",
                s.total, s.per_day, s.per_year
            )
        };

        writeln!(f, "Days: {}, years: {:.1}", self.days, self.years)?;
        writeln!(f, "              | Total cost |  Cost PA  |  Import  |  Export  |")?;
        row(f, "No solar", &self.no_solar)?;
        row(f, "Solar", &self.solar)?;
        row(f, "Solar+battery", &self.solar_battery)?;
        writeln!(
            f,
            "Total consumption: {:.0}kWh, battery charging {:.0}kWh, battery discharge {:.0}kWh",
            self.consumption_kwh, self.charge_kwh, self.discharge_kwh
        )?;
        savings(f, "no-solar/solar", &self.no_solar_vs_solar)?;
        savings(f, "no-solar/solar+battery", &self.no_solar_vs_solar_battery)?;
        savings(f, "solar/solar+battery", &self.solar_vs_solar_battery)
    }
}
