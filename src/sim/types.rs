//! Core data types: input samples and accumulated totals.

use chrono::NaiveDateTime;

/// One meter reading handed to the engine by ingest.
///
/// The counter fields stay as raw strings: the delta accumulators own
/// numeric parsing so that the blank/zero tolerance lives in one place.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Combined civil date and time of the reading.
    pub timestamp: NaiveDateTime,
    /// Cumulative imported energy counter (kWh).
    pub import: String,
    /// Cumulative exported energy counter (kWh).
    pub export: String,
    /// Cumulative solar generation counter (kWh).
    pub generation: String,
}

/// Cost and energy totals accumulated for one scenario.
///
/// Created once at engine construction and mutated for every valid interval
/// and once per day; never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScenarioTotals {
    /// Accumulated cost in cents.
    pub cost_cents: f64,
    /// Energy imported from the grid (kWh).
    pub imported_kwh: f64,
    /// Energy exported to the grid (kWh).
    pub exported_kwh: f64,
}

/// Counters spanning the whole run, shared across scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTotals {
    /// Days processed, one per ingested day file.
    pub days_processed: u32,
    /// No-solar-equivalent consumption (kWh).
    pub consumption_kwh: f64,
    /// Grid-side energy drawn to charge the battery (kWh).
    pub charge_kwh: f64,
    /// Energy the battery supplied in place of imports (kWh).
    pub discharge_kwh: f64,
}
