//! Scenario simulator stepping three parallel cost models per interval.

use chrono::{Duration, NaiveDateTime};
use tracing::warn;

use super::accumulator::DeltaAccumulator;
use super::battery::BatteryState;
use super::interval::{IntervalCheck, check_interval};
use super::tariff::TariffSchedule;
use super::types::{RunTotals, Sample, ScenarioTotals};

/// The simulation engine: one instance per run, fed samples in time order.
///
/// Holds every piece of state carried between samples: accumulator
/// baselines, the battery charge level, the previous timestamp, and the
/// three scenario totals. Strictly sequential: each sample depends on the
/// state left behind by the previous one.
///
/// Day boundaries are not inferred from timestamps. Ingest owns the
/// one-file-one-day convention and calls [`Engine::end_day`] after each
/// successfully-headed file.
pub struct Engine {
    tariffs: TariffSchedule,
    max_interval: Duration,
    battery: BatteryState,
    import: DeltaAccumulator,
    export: DeltaAccumulator,
    generation: DeltaAccumulator,
    last_timestamp: Option<NaiveDateTime>,
    no_solar: ScenarioTotals,
    solar: ScenarioTotals,
    solar_battery: ScenarioTotals,
    run: RunTotals,
}

impl Engine {
    pub fn new(tariffs: TariffSchedule, battery: BatteryState, max_interval: Duration) -> Self {
        Self {
            tariffs,
            max_interval,
            battery,
            import: DeltaAccumulator::new(),
            export: DeltaAccumulator::new(),
            generation: DeltaAccumulator::new(),
            last_timestamp: None,
            no_solar: ScenarioTotals::default(),
            solar: ScenarioTotals::default(),
            solar_battery: ScenarioTotals::default(),
            run: RunTotals::default(),
        }
    }

    /// Feeds one sample through the accumulators and, when the interval is
    /// usable, through the tariff, battery, and scenario updates.
    ///
    /// The accumulators update for every sample, including the first of the
    /// run and those ending an oversized gap; only the simulation step is
    /// skipped in those cases. A gap re-bases all three accumulators, so the
    /// gap interval contributes to no total, but `last_timestamp` still
    /// advances.
    pub fn observe(&mut self, sample: &Sample) {
        self.import.update(&sample.import);
        self.export.update(&sample.export);
        self.generation.update(&sample.generation);

        let check = check_interval(self.last_timestamp, sample.timestamp, self.max_interval);
        self.last_timestamp = Some(sample.timestamp);
        match check {
            IntervalCheck::First => {}
            IntervalCheck::Gap(elapsed) => {
                warn!(
                    minutes = elapsed.num_minutes(),
                    before = %sample.timestamp,
                    "skipping oversized interval"
                );
                self.import.reset();
                self.export.reset();
                self.generation.reset();
            }
            IntervalCheck::Valid(elapsed) => self.step(sample.timestamp, elapsed),
        }
    }

    /// Applies one valid interval to all three scenarios.
    fn step(&mut self, at: NaiveDateTime, elapsed: Duration) {
        let period = self.tariffs.resolve(at.date());
        let import = self.import.value();
        let export = self.export.value();
        let generation = self.generation.value();

        // Generation offsets consumption directly; only the grid-visible
        // import and export reach the meter.
        let consumption = import + generation - export;
        self.run.consumption_kwh += consumption;

        // No solar: the same net load is drawn entirely from the grid.
        self.no_solar.imported_kwh += consumption;
        self.no_solar.cost_cents += consumption * period.kwh;

        // Solar only: meter flows as recorded.
        self.solar.imported_kwh += import;
        self.solar.exported_kwh += export;
        self.solar.cost_cents += import * period.kwh - export * period.feed_in;

        // Solar + battery: the battery first covers import, then absorbs
        // export; the residuals are billed at the same tariff.
        let hours = elapsed.num_seconds() as f64 / 3600.0;
        let flow = self.battery.step(import, export, hours);
        self.run.discharge_kwh += flow.discharged_kwh;
        self.run.charge_kwh += flow.charge_draw_kwh;
        self.solar_battery.imported_kwh += flow.residual_import_kwh;
        self.solar_battery.exported_kwh += flow.residual_export_kwh;
        self.solar_battery.cost_cents += flow.residual_import_kwh * period.kwh
            - flow.residual_export_kwh * period.feed_in;
    }

    /// Closes out one day file: the daily supply charge is added to every
    /// scenario and the day counter advances.
    ///
    /// The charge uses the tariff period of the last sample seen so far, or
    /// the first period when no sample has been processed yet.
    pub fn end_day(&mut self) {
        let period = match self.last_timestamp {
            Some(ts) => self.tariffs.resolve(ts.date()),
            None => self.tariffs.first(),
        };
        let daily = period.daily;
        self.no_solar.cost_cents += daily;
        self.solar.cost_cents += daily;
        self.solar_battery.cost_cents += daily;
        self.run.days_processed += 1;
    }

    /// Totals for the counterfactual no-solar scenario.
    pub fn no_solar(&self) -> &ScenarioTotals {
        &self.no_solar
    }

    /// Totals for the solar-without-battery scenario.
    pub fn solar(&self) -> &ScenarioTotals {
        &self.solar
    }

    /// Totals for the solar-with-battery scenario.
    pub fn solar_battery(&self) -> &ScenarioTotals {
        &self.solar_battery
    }

    /// Run-wide counters.
    pub fn run_totals(&self) -> &RunTotals {
        &self.run
    }

    /// The battery, for charge-level queries.
    pub fn battery(&self) -> &BatteryState {
        &self.battery
    }

    /// Timestamp of the most recent sample, valid or not.
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.last_timestamp
    }
}
