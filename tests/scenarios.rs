//! End-to-end scenarios on synthetic volume series.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use prism_spectral::core::{business_day_fill, Resolution, SampleSeries};
use prism_spectral::detection::{standard_tiers, tier_spectrum, FusionConfig, Tier};
use prism_spectral::provider::SampleProvider;
use prism_spectral::{SpectralConfig, SpectralEngine, SpectralError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

fn noise(rng: &mut StdRng, n: usize, amplitude: f64) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-amplitude..amplitude)).collect()
}

#[test]
fn weekly_and_monthly_cycles_are_found() {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 1000;
    let jitter = noise(&mut rng, n, 0.3);
    let series: Vec<f64> = (0..n)
        .map(|t| {
            let t = t as f64;
            (2.0 * PI * t / 7.0).sin() + 0.5 * (2.0 * PI * t / 30.0).sin()
        })
        .zip(jitter)
        .map(|(s, e)| s + e)
        .collect();

    let engine = SpectralEngine::new(SpectralConfig::default()).unwrap();
    let analysis = engine.analyze(&series).unwrap();

    assert!(
        analysis.peaks.iter().any(|p| (p.period - 7.0).abs() < 0.5),
        "no weekly peak in {:?}",
        analysis.peaks
    );
    assert!(
        analysis.peaks.iter().any(|p| (p.period - 30.0).abs() < 1.5),
        "no monthly peak in {:?}",
        analysis.peaks
    );
    assert!(analysis.peaks.len() <= 9);
}

#[test]
fn constant_volume_has_no_peaks() {
    let engine = SpectralEngine::new(SpectralConfig::calendar_days()).unwrap();
    let analysis = engine.analyze(&vec![1_000_000.0; 750]).unwrap();
    assert!(analysis.peaks.is_empty());
}

#[test]
fn business_day_cycle_reported_in_calendar_days() {
    let start = Utc.with_ymd_and_hms(2020, 1, 6, 0, 0, 0).unwrap(); // Monday
    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    let mut trading_day = 0;
    for day in 0..1400 {
        let ts = start + Duration::days(day);
        timestamps.push(ts);
        if matches!(ts.weekday(), Weekday::Sat | Weekday::Sun) {
            values.push(0.0);
        } else {
            values.push(100.0 + 20.0 * (2.0 * PI * trading_day as f64 / 5.0).sin());
            trading_day += 1;
        }
    }
    let calendar = SampleSeries::new(timestamps, values).unwrap();
    let business = business_day_fill(&calendar);
    assert_eq!(business.len(), 1000);

    let engine = SpectralEngine::new(SpectralConfig::calendar_days()).unwrap();
    let analysis = engine.analyze_series(&business).unwrap();
    let weekly = analysis
        .peaks
        .iter()
        .find(|p| (p.scaled_period - 7.0).abs() < 1e-6)
        .expect("weekly peak");
    assert_eq!(weekly.band, "short");
    assert_eq!(engine.label(weekly).to_string(), "7.0 d (1.0 wks)");
}

#[test]
fn fused_peaks_map_to_exactly_one_tier_bin() {
    let mut rng = StdRng::seed_from_u64(7);
    let weekly: Vec<f64> = (0..521)
        .map(|i| 5e6 + 1e6 * (2.0 * PI * i as f64 / 52.0).sin() + rng.gen_range(0.0..2e5))
        .collect();
    let monthly: Vec<f64> = (0..120)
        .map(|i| 2e7 + 4e6 * (2.0 * PI * i as f64 / 12.0).cos() + rng.gen_range(0.0..1e6))
        .collect();
    let tiers = vec![
        Tier::new("WEEK", Resolution::Week, weekly),
        Tier::new("MONTH", Resolution::Month, monthly),
    ];

    let engine = SpectralEngine::new(SpectralConfig::default()).unwrap();
    let fused = engine.fuse(&tiers).unwrap();
    assert!(!fused.peaks.is_empty());

    let config = FusionConfig::default();
    let spectra: Vec<_> = tiers
        .iter()
        .map(|t| tier_spectrum(t, &config).unwrap())
        .collect();

    for peak in &fused.peaks {
        assert_eq!(peak.frequency, spectra[peak.tier].frequencies()[peak.bin]);
        let owners = spectra
            .iter()
            .filter(|s| s.frequencies().contains(&peak.frequency))
            .count();
        assert_eq!(owners, 1, "frequency {} is shared", peak.frequency);
    }

    let global_max = fused.magnitudes.iter().copied().fold(0.0, f64::max);
    assert!(fused.peaks.iter().all(|p| p.magnitude >= 0.1 * global_max));
}

struct SyntheticVolume {
    seed: u64,
}

impl SampleProvider for SyntheticVolume {
    type Error = SpectralError;

    fn fetch(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Result<SampleSeries, SpectralError> {
        if instrument.is_empty() {
            return Err(SpectralError::InvalidInput("missing instrument".to_string()));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let step = match resolution {
            Resolution::Day => Duration::days(1),
            Resolution::Minute => Duration::minutes(1),
            other => {
                return Err(SpectralError::InvalidInput(format!("unsupported {}", other)))
            }
        };
        let mut timestamps = Vec::new();
        let mut values = Vec::new();
        let mut ts = start;
        let mut i = 0.0;
        while ts < end {
            timestamps.push(ts);
            values.push(1e6 + 3e5 * (2.0 * PI * i / 365.25).sin() + rng.gen_range(0.0..1e5));
            ts += step;
            i += 1.0;
        }
        SampleSeries::new(timestamps, values)
    }
}

#[test]
fn provider_feeds_standard_tiers() {
    let provider = SyntheticVolume { seed: 3 };
    let start = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let daily = provider.fetch("AMZN", start, end, Resolution::Day).unwrap();

    let session = Utc.with_ymd_and_hms(2023, 12, 29, 14, 30, 0).unwrap(); // Friday
    let intraday = provider
        .fetch("AMZN", session, session + Duration::minutes(390), Resolution::Minute)
        .unwrap();

    let tiers = standard_tiers(&daily, Some(&intraday)).unwrap();
    let labels: Vec<&str> = tiers.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["DAY", "WEEK", "MONTH", "YEAR", "DECADE"]);
    assert_eq!(tiers[0].values.len(), 390);
    assert_eq!(tiers[2].values.len(), 120);

    let engine = SpectralEngine::new(SpectralConfig::default()).unwrap();
    let fused = engine.fuse(&tiers).unwrap();
    assert_eq!(fused.tier_offsets.len(), 5);
    for peak in &fused.peaks {
        let position = fused.tier_offsets[peak.tier] + peak.bin;
        assert!(fused.tier_range(peak.tier).contains(&position));
        assert_eq!(fused.frequencies[position], peak.frequency);
    }

    assert!(provider.fetch("", start, end, Resolution::Day).is_err());
}
