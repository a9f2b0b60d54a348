use super::band::RhiBand;
use crate::scoring::CompositeScore;
use crate::series::{seeded_unit, Seed};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Longest window the config and CLI accept, ten years of daily points.
pub const MAX_SERIES_DAYS: usize = 3650;

/// Bumps are dropped once this many decay constants have elapsed.
const DECAY_CUTOFF: f64 = 3.0;

/// A named market shock that adds an exponentially decaying bump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEvent {
    pub name: String,
    /// Position of the shock counted back from the last day of the window.
    pub days_before_end: u32,
    pub magnitude: f64,
    pub decay_days: f64,
}

impl VolatilityEvent {
    pub fn new(name: impl Into<String>, days_before_end: u32, magnitude: f64, decay_days: f64) -> Self {
        Self {
            name: name.into(),
            days_before_end,
            magnitude,
            decay_days,
        }
    }

    fn bump(&self, day: i64, event_day: i64) -> f64 {
        let elapsed = (day - event_day) as f64;
        if elapsed < 0.0 || self.decay_days <= 0.0 || !self.decay_days.is_finite() {
            return 0.0;
        }
        if elapsed > DECAY_CUTOFF * self.decay_days {
            return 0.0;
        }
        self.magnitude * (-elapsed / self.decay_days).exp()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub days: usize,
    pub end_date: NaiveDate,
    pub base_level: f64,
    /// Total rise from the first to the last day.
    pub drift: f64,
    pub noise_amplitude: f64,
    pub seed: Seed,
    pub events: Vec<VolatilityEvent>,
}

impl SeriesConfig {
    pub fn standard(end_date: NaiveDate, days: usize) -> Self {
        Self {
            days,
            end_date,
            base_level: 470.0,
            drift: 50.0,
            noise_amplitude: 12.0,
            seed: Seed::from_text("retail-harm-index"),
            events: vec![
                VolatilityEvent::new("Crypto weekend liquidation cascade", 74, 160.0, 5.0),
                VolatilityEvent::new("Meme-stock short squeeze", 52, 110.0, 4.0),
                VolatilityEvent::new("Central bank surprise hike", 30, 90.0, 3.0),
                VolatilityEvent::new("Offshore bonus promotion wave", 12, 70.0, 6.0),
            ],
        }
    }

    pub fn without_noise(mut self) -> Self {
        self.noise_amplitude = 0.0;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RhiPoint {
    pub date: NaiveDate,
    pub rhi: CompositeScore,
    pub band: RhiBand,
}

/// Daily index values for the window ending on `config.end_date`.
pub fn generate_series(config: &SeriesConfig) -> Vec<RhiPoint> {
    let days = config.days;
    if days == 0 {
        return Vec::new();
    }

    let last = i64::try_from(days).unwrap_or(i64::MAX) - 1;
    let span = last.max(1) as f64;
    // Days before the earliest representable date are dropped.
    let reachable = (config.end_date - NaiveDate::MIN).num_days();
    let first = last.saturating_sub(reachable).max(0);

    (first..=last)
        .filter_map(|day| {
            let date = config
                .end_date
                .checked_sub_signed(Duration::days(last - day))?;
            let drift = config.drift * day as f64 / span;
            let spikes: f64 = config
                .events
                .iter()
                .map(|event| event.bump(day, last - i64::from(event.days_before_end)))
                .sum();
            let noise = config.noise_amplitude * seeded_unit(config.seed, day as usize);

            let rhi = CompositeScore::from_raw(config.base_level + drift + spikes + noise);
            Some(RhiPoint {
                date,
                rhi,
                band: RhiBand::from_score(rhi),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 30).expect("valid date")
    }

    fn quiet(days: usize) -> SeriesConfig {
        let mut config = SeriesConfig::standard(end(), days).without_noise();
        config.events.clear();
        config
    }

    #[test]
    fn window_ends_on_end_date_with_consecutive_days() {
        let series = generate_series(&SeriesConfig::standard(end(), 90));
        assert_eq!(series.len(), 90);
        assert_eq!(series.last().map(|p| p.date), Some(end()));
        assert!(series
            .windows(2)
            .all(|pair| pair[1].date - pair[0].date == Duration::days(1)));
    }

    #[test]
    fn drift_is_linear_across_window() {
        let series = generate_series(&quiet(11));
        assert_eq!(series[0].rhi.value(), 470);
        assert_eq!(series[5].rhi.value(), 495);
        assert_eq!(series[10].rhi.value(), 520);
    }

    #[test]
    fn event_bump_decays_and_expires() {
        let mut config = quiet(30);
        config.drift = 0.0;
        config
            .events
            .push(VolatilityEvent::new("shock", 19, 200.0, 2.0));
        let series = generate_series(&config);
        // Event lands on index 10.
        assert_eq!(series[9].rhi.value(), 470);
        assert_eq!(series[10].rhi.value(), 670);
        assert_eq!(series[12].rhi.value(), 544);
        assert!(series[16].rhi.value() > 470);
        assert_eq!(series[17].rhi.value(), 470);
    }

    #[test]
    fn series_is_reproducible() {
        let config = SeriesConfig::standard(end(), 60);
        assert_eq!(generate_series(&config), generate_series(&config));
    }

    #[test]
    fn bands_track_each_point() {
        for point in generate_series(&SeriesConfig::standard(end(), 120)) {
            assert_eq!(point.band, RhiBand::from_score(point.rhi));
        }
    }

    #[test]
    fn zero_days_is_empty() {
        assert!(generate_series(&SeriesConfig::standard(end(), 0)).is_empty());
    }

    #[test]
    fn window_reaching_past_earliest_date_keeps_representable_days() {
        let end = NaiveDate::MIN + Duration::days(5);
        let series = generate_series(&SeriesConfig::standard(end, 10));

        assert_eq!(series.len(), 6);
        assert_eq!(series[0].date, NaiveDate::MIN);
        assert_eq!(series.last().map(|point| point.date), Some(end));
        assert!(series.iter().all(|point| point.rhi <= CompositeScore::MAX));
    }

    #[test]
    fn single_day_window_has_no_drift() {
        let series = generate_series(&quiet(1));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].rhi.value(), 470);
        assert_eq!(series[0].date, end());
    }
}
