use serde::Deserialize;
use tracing::warn;

/// What to do when a computed charge level ends up above capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverchargePolicy {
    /// Log the anomaly and keep the out-of-bound level. This is the
    /// historical behavior and the default.
    #[default]
    Warn,
    /// Cap the charge level at capacity.
    Clamp,
}

/// Energy flows produced by one battery step.
///
/// Residual fields are what still crosses the meter after the battery has
/// taken its share: the solar+battery scenario bills `residual_import_kwh`
/// at the import rate and credits `residual_export_kwh` at the feed-in rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatteryFlow {
    /// Energy the battery supplied in place of grid import (kWh).
    pub discharged_kwh: f64,
    /// Import still drawn from the grid after the discharge leg (kWh).
    pub residual_import_kwh: f64,
    /// Grid-side energy absorbed for charging (kWh), before efficiency loss.
    pub charge_draw_kwh: f64,
    /// Export still fed in after the charge leg (kWh).
    pub residual_export_kwh: f64,
}

/// A battery modeled as a single charge level stepped once per valid
/// interval.
///
/// One rate figure limits both the discharge and the charge leg, modeling a
/// symmetric maximum inverter power. Charging is lossy: storing 1 kWh at 90%
/// efficiency draws 10/9 kWh from the grid side.
#[derive(Debug, Clone)]
pub struct BatteryState {
    /// Capacity (kWh).
    size_kwh: f64,
    /// Power limit for both legs (kWh per hour).
    rate_kwh_per_hour: f64,
    /// Fraction of drawn energy actually stored, e.g. 0.9 for 90%.
    recharge_efficiency: f64,
    overcharge: OverchargePolicy,
    /// Current stored energy (kWh).
    charge_level: f64,
}

impl BatteryState {
    /// Creates a battery with an explicit initial charge level.
    ///
    /// Under [`OverchargePolicy::Clamp`] the initial level is capped at
    /// capacity; under [`OverchargePolicy::Warn`] it is taken as given.
    ///
    /// # Panics
    ///
    /// Panics if `size_kwh` or `rate_kwh_per_hour` is not positive, or if
    /// `recharge_efficiency_pct` is outside `(0, 100]`. Config validation
    /// reports these as errors before a battery is ever constructed.
    pub fn new(
        size_kwh: f64,
        initial_charge_kwh: f64,
        rate_kwh_per_hour: f64,
        recharge_efficiency_pct: f64,
        overcharge: OverchargePolicy,
    ) -> Self {
        assert!(size_kwh > 0.0);
        assert!(rate_kwh_per_hour > 0.0);
        assert!(recharge_efficiency_pct > 0.0 && recharge_efficiency_pct <= 100.0);

        let charge_level = match overcharge {
            OverchargePolicy::Warn => initial_charge_kwh,
            OverchargePolicy::Clamp => initial_charge_kwh.min(size_kwh),
        };
        Self {
            size_kwh,
            rate_kwh_per_hour,
            recharge_efficiency: recharge_efficiency_pct / 100.0,
            overcharge,
            charge_level,
        }
    }

    /// Current stored energy (kWh).
    pub fn charge_level(&self) -> f64 {
        self.charge_level
    }

    /// Capacity (kWh).
    pub fn size_kwh(&self) -> f64 {
        self.size_kwh
    }

    /// Applies one interval: discharge toward import first, then charge from
    /// export. Both legs can run in the same interval, since import and
    /// export deltas cover disjoint sub-intervals of the raw data.
    ///
    /// `interval_hours` scales the shared rate limit into a per-interval
    /// energy cap.
    pub fn step(&mut self, import_kwh: f64, export_kwh: f64, interval_hours: f64) -> BatteryFlow {
        let capacity_this_interval = self.rate_kwh_per_hour * interval_hours;
        let mut flow = BatteryFlow {
            residual_import_kwh: import_kwh,
            residual_export_kwh: export_kwh,
            ..BatteryFlow::default()
        };

        if import_kwh > 0.0 {
            let mut used = capacity_this_interval.min(self.charge_level);
            if import_kwh > used {
                // Battery replaces only part of the import.
                flow.residual_import_kwh = import_kwh - used;
            } else {
                // Battery supplies the whole import.
                used = import_kwh;
                flow.residual_import_kwh = 0.0;
            }
            self.charge_level -= used;
            flow.discharged_kwh = used;
        }

        if export_kwh > 0.0 {
            // Grid-side energy needed to fill the remaining capacity, given
            // that only `recharge_efficiency` of the draw is stored.
            let room = (self.size_kwh - self.charge_level) / self.recharge_efficiency;
            let mut draw = room.min(capacity_this_interval);
            if export_kwh > draw {
                // Whatever charging leaves over is fed in.
                flow.residual_export_kwh = export_kwh - draw;
            } else {
                draw = export_kwh;
                flow.residual_export_kwh = 0.0;
            }
            self.charge_level += draw * self.recharge_efficiency;
            flow.charge_draw_kwh = draw;
            if self.charge_level > self.size_kwh {
                match self.overcharge {
                    OverchargePolicy::Warn => warn!(
                        charge_level_kwh = self.charge_level,
                        size_kwh = self.size_kwh,
                        "overcharge: charge level exceeds capacity"
                    ),
                    OverchargePolicy::Clamp => self.charge_level = self.size_kwh,
                }
            }
        }

        flow
    }
}
