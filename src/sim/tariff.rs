use chrono::NaiveDate;
use serde::Deserialize;

/// One tariff period: the rates in force from `start` until the next
/// period's start date. Monetary fields are in cents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffPeriod {
    /// First date this period applies to.
    pub start: NaiveDate,
    /// Daily supply charge (cents), applied once per day regardless of use.
    pub daily: f64,
    /// Import rate (cents per kWh).
    pub kwh: f64,
    /// Feed-in credit (cents per kWh exported).
    pub feed_in: f64,
}

/// Ordered tariff periods, resolved by effective date.
#[derive(Debug, Clone)]
pub struct TariffSchedule {
    periods: Vec<TariffPeriod>,
}

impl TariffSchedule {
    /// Builds a schedule from periods ordered by ascending `start`.
    ///
    /// # Panics
    ///
    /// Panics if `periods` is empty; config validation rejects that earlier.
    pub fn new(periods: Vec<TariffPeriod>) -> Self {
        assert!(!periods.is_empty(), "at least one tariff period is required");
        Self { periods }
    }

    /// Returns the period whose `start` most closely precedes `date`.
    ///
    /// Dates earlier than every configured `start` fall back to the first
    /// period, so a single-period schedule resolves to that period for all
    /// dates.
    pub fn resolve(&self, date: NaiveDate) -> &TariffPeriod {
        self.periods
            .iter()
            .rev()
            .find(|p| p.start <= date)
            .unwrap_or(&self.periods[0])
    }

    /// The earliest configured period.
    pub fn first(&self) -> &TariffPeriod {
        &self.periods[0]
    }
}
