use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Bar, BarSeries};
use crate::error::{EngineError, EngineResult};

/// Self-organizing frequency counter over small integers `0..domain`.
///
/// Keeps per-value observation counts plus a permutation sorted by
/// descending frequency. The permutation is maintained by a local bubble
/// step on each increment (the incremented value swaps forward past any
/// neighbor it now outranks), so updates are O(1) amortized rather than a
/// full re-sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRank {
    counts: Vec<u64>,
    // Parallel permutation arrays: value_at[position] and position_of[value]
    // stay mutually inverse at all times.
    value_at: Vec<usize>,
    position_of: Vec<usize>,
    total: u64,
}

impl FrequencyRank {
    pub fn new(domain: usize) -> EngineResult<Self> {
        if domain == 0 {
            return Err(EngineError::InvalidArgument(
                "frequency domain must be >= 1".to_owned(),
            ));
        }
        Ok(Self {
            counts: vec![0; domain],
            value_at: (0..domain).collect(),
            position_of: (0..domain).collect(),
            total: 0,
        })
    }

    #[must_use]
    pub fn domain(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn total_observations(&self) -> u64 {
        self.total
    }

    pub fn reset(&mut self) {
        let domain = self.counts.len();
        self.counts.fill(0);
        self.value_at = (0..domain).collect();
        self.position_of = (0..domain).collect();
        self.total = 0;
    }

    /// Records one observation of `value`.
    ///
    /// Out-of-domain values are clamped into `0..domain` when
    /// `clamp_out_of_range` is set, and rejected otherwise.
    pub fn add_observation(&mut self, value: i64, clamp_out_of_range: bool) -> EngineResult<()> {
        let domain = self.counts.len();
        let value = if (0..domain as i64).contains(&value) {
            value as usize
        } else if clamp_out_of_range {
            value.clamp(0, domain as i64 - 1) as usize
        } else {
            return Err(EngineError::OutOfDomain { value, domain });
        };

        self.counts[value] += 1;
        self.total += 1;

        // Bubble the value forward while it outranks its left neighbor.
        let mut position = self.position_of[value];
        while position > 0 {
            let neighbor = self.value_at[position - 1];
            if self.counts[neighbor] >= self.counts[value] {
                break;
            }
            self.value_at.swap(position - 1, position);
            self.position_of[neighbor] = position;
            self.position_of[value] = position - 1;
            position -= 1;
        }

        Ok(())
    }

    /// Walks the descending-frequency order accumulating counts until the
    /// cumulative total reaches `ceil(probability * total)`, and returns the
    /// largest raw value among the values visited.
    ///
    /// The max-so-far policy is deliberate: digit counts needed by the bulk
    /// of the data are never under-reported even when a higher-frequency but
    /// lower-digit value appears later in the walk.
    ///
    /// With zero observations the sentinel `0` is returned.
    pub fn max_value_among_top_frequent(&self, probability: f64) -> EngineResult<usize> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::InvalidProbability(probability));
        }

        if self.total == 0 {
            return Ok(0);
        }

        let threshold = ((probability * self.total as f64).ceil() as u64).max(1);
        let mut cumulative = 0_u64;
        let mut max_seen = 0_usize;
        for &value in &self.value_at {
            cumulative += self.counts[value];
            max_seen = max_seen.max(value);
            if cumulative >= threshold {
                break;
            }
        }

        Ok(max_seen)
    }
}

/// Decides how many fractional digits price labels should carry.
///
/// Feeds the fractional digit count of every valid price observation into a
/// [`FrequencyRank`] and reports the smallest digit count covering the
/// configured probability mass. Observation intake freezes once the cap is
/// reached; the cap keeps live feeds from paying estimator cost forever on
/// an already-stable answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionEstimator {
    rank: FrequencyRank,
    probability: f64,
    observation_cap: u64,
}

impl PrecisionEstimator {
    pub fn new(domain: usize, probability: f64, observation_cap: u64) -> EngineResult<Self> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::InvalidProbability(probability));
        }
        Ok(Self {
            rank: FrequencyRank::new(domain)?,
            probability,
            observation_cap,
        })
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.rank.total_observations() >= self.observation_cap
    }

    /// Records the digit counts of one bar's prices.
    ///
    /// Placeholder bars carry no information and are skipped, as are all
    /// observations after the cap is reached.
    pub fn observe_bar(&mut self, bar: Bar) {
        if bar.is_placeholder() || self.is_frozen() {
            return;
        }

        let max_digits = self.rank.domain() - 1;
        for price in [bar.open, bar.high, bar.low, bar.close] {
            let digits = decimal_digits(price, max_digits) as i64;
            // Digit counts are pre-clamped, so the add cannot fail.
            let _ = self.rank.add_observation(digits, true);
        }
    }

    /// Drops all state and re-observes a series front to back, stopping at
    /// the observation cap. Called when the data source is swapped.
    pub fn reseed(&mut self, series: &BarSeries) {
        self.rank.reset();
        for bar in series.bars() {
            if self.is_frozen() {
                break;
            }
            self.observe_bar(*bar);
        }
        debug!(
            observations = self.rank.total_observations(),
            frozen = self.is_frozen(),
            "reseeded precision estimator"
        );
    }

    /// Current fractional-digit estimate.
    #[must_use]
    pub fn fraction_digits(&self) -> usize {
        // The probability was validated at construction.
        self.rank
            .max_value_among_top_frequent(self.probability)
            .unwrap_or(0)
    }
}

/// Counts the fractional digits a value needs, capped at `max_digits`.
#[must_use]
pub fn decimal_digits(value: f64, max_digits: usize) -> usize {
    if !value.is_finite() {
        return 0;
    }

    let mut scaled = value.abs();
    for digits in 0..max_digits {
        if (scaled - scaled.round()).abs() < 1e-9 {
            return digits;
        }
        scaled *= 10.0;
    }
    max_digits
}
