/// Converts a cumulative meter counter into non-negative per-interval deltas.
///
/// Meters report monotonically increasing totals, but a counter can roll back
/// to near zero when the meter resets. The accumulator re-bases on the first
/// reading and on any rollback, yielding a zero delta for that sample instead
/// of a huge negative one.
///
/// A `last_reading` of zero means "no baseline yet"; genuine zero readings
/// never reach [`DeltaAccumulator::update_explicit`] because the raw-field
/// path treats them as missing data.
#[derive(Debug, Clone, Default)]
pub struct DeltaAccumulator {
    /// Prior sample's counter value; 0.0 means unbaselined.
    last_reading: f64,
    /// Delta computed for the most recent usable sample.
    current_delta: f64,
}

impl DeltaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw meter field and updates the delta.
    ///
    /// Blank, unparsable, and exactly-zero fields leave the accumulator
    /// untouched. Source meters emit empty or repeated-zero fields for
    /// quantities that are momentarily unavailable, and those must not be
    /// mistaken for counter resets. Callers should treat the retained delta
    /// as stale rather than fresh after such a no-op.
    pub fn update(&mut self, raw: &str) {
        if let Ok(v) = raw.trim().parse::<f64>() {
            if v != 0.0 {
                self.update_explicit(v);
            }
        }
    }

    /// Updates the delta from an already-parsed counter reading.
    pub fn update_explicit(&mut self, v: f64) {
        if self.last_reading == 0.0 || v < self.last_reading {
            // First reading, or the counter rolled back: re-base here.
            self.last_reading = v;
        }
        self.current_delta = v - self.last_reading;
        self.last_reading = v;
    }

    /// Discards the baseline so the next reading re-bases with a zero delta.
    pub fn reset(&mut self) {
        self.last_reading = 0.0;
    }

    /// Delta between the two most recent readings (kWh). Never negative.
    pub fn value(&self) -> f64 {
        self.current_delta
    }
}
