use compass_heading::{
    DEG_TO_RAD, DirectionSector, HeadingProcessor, HeadingSettings, IngestOutcome, SectorScheme,
    classify_sector, normalize_degrees, shortest_arc,
};
use nalgebra::Vector3;
use rand::prelude::*;
use rand_pcg::Pcg64;

const EPSILON: f32 = 1e-3;

fn processor_with(declination_degrees: f32, smoothing: f32) -> HeadingProcessor {
    HeadingProcessor::with_settings(HeadingSettings {
        declination_degrees,
        smoothing,
        scheme: SectorScheme::Eight,
    })
    .unwrap()
}

/// Horizontal field vector whose raw heading is `degrees`
fn field_at(degrees: f32, magnitude: f32) -> Vector3<f32> {
    let rad = degrees * DEG_TO_RAD;
    Vector3::new(magnitude * rad.cos(), magnitude * rad.sin(), -0.4 * magnitude)
}

/// Feed a constant field until the filter has settled on it
fn settle_at(processor: &mut HeadingProcessor, degrees: f32) {
    for _ in 0..200 {
        processor.ingest(field_at(degrees, 1.0));
    }
    let target = normalize_degrees(degrees + processor.settings().declination_degrees);
    assert!(shortest_arc(processor.heading(), target).abs() < EPSILON);
}

#[test]
fn test_normalization_invariant_under_random_samples() {
    let mut rng = Pcg64::seed_from_u64(0x5eed);
    let mut processor = HeadingProcessor::new();

    for _ in 0..10_000 {
        let sample = Vector3::new(
            rng.random_range(-60.0..60.0),
            rng.random_range(-60.0..60.0),
            rng.random_range(-60.0..60.0),
        );
        processor.ingest(sample);
        let angle = processor.heading();
        assert!((0.0..360.0).contains(&angle), "heading {angle} escaped [0, 360)");
    }
}

#[test]
fn test_first_sample_scenario() {
    let mut processor = HeadingProcessor::new();
    processor.ingest(Vector3::new(1.0, 0.0, 0.0));
    assert!((processor.heading() - 0.75).abs() < 1e-4);
}

#[test]
fn test_wraparound_moves_forward_through_seam() {
    let mut processor = processor_with(0.0, 0.15);
    settle_at(&mut processor, 359.0);

    processor.ingest(field_at(1.0, 1.0));
    let angle = processor.heading();

    // Forward by 0.15 * 2° along the short arc, never back towards 180°
    assert!((angle - 359.3).abs() < 0.01, "got {angle}");
    assert!(shortest_arc(359.0, angle) > 0.0);

    for _ in 0..50 {
        processor.ingest(field_at(1.0, 1.0));
        let angle = processor.heading();
        assert!(angle > 358.0 || angle < 2.0, "left the seam region: {angle}");
    }
    assert!(processor.heading() < 2.0);
}

#[test]
fn test_declination_pushes_reading_across_seam() {
    // 356° magnetic + 5° declination = 1° true
    let mut processor = processor_with(5.0, 0.15);
    for _ in 0..100 {
        processor.ingest(field_at(356.0, 1.0));
    }
    assert!((processor.heading() - 1.0).abs() < 0.01);
    assert_eq!(processor.sector(), DirectionSector::N);
}

#[test]
fn test_convergence_within_fifty_samples() {
    for target in [0.0_f32, 37.0, 90.0, 179.0, 181.0, 270.0, 359.0] {
        let mut processor = processor_with(0.0, 0.15);
        let mut iterations = 0;
        while shortest_arc(processor.heading(), target).abs() > 0.1 {
            processor.ingest(field_at(target, 1.0));
            iterations += 1;
            assert!(iterations < 50, "no convergence to {target} in 50 samples");
        }
    }
}

#[test]
fn test_constant_input_never_oscillates() {
    let mut processor = processor_with(0.0, 0.15);
    let target = 300.0;
    let mut previous = shortest_arc(processor.heading(), target).abs();
    for _ in 0..100 {
        processor.ingest(field_at(target, 2.5));
        let error = shortest_arc(processor.heading(), target).abs();
        assert!(error <= previous + 1e-4);
        previous = error;
    }
}

#[test]
fn test_lock_scenario() {
    let mut processor = processor_with(0.0, 0.15);
    settle_at(&mut processor, 120.0);

    processor.set_locked(true);
    let frozen = processor.state();
    for degrees in [0.0, 90.0, 200.0, 300.0] {
        assert_eq!(processor.ingest(field_at(degrees, 1.0)), IngestOutcome::Locked);
    }
    assert_eq!(processor.state(), frozen);

    processor.set_locked(false);
    processor.ingest(field_at(130.0, 1.0));
    let expected = frozen.filtered_angle + 0.15 * (130.0 - frozen.filtered_angle);
    assert!((processor.heading() - expected).abs() < EPSILON);
}

#[test]
fn test_locking_twice_matches_locking_once() {
    let mut once = processor_with(0.0, 0.15);
    let mut twice = processor_with(0.0, 0.15);
    for _ in 0..7 {
        once.ingest(field_at(64.0, 1.0));
        twice.ingest(field_at(64.0, 1.0));
    }

    once.set_locked(true);
    twice.set_locked(true);
    twice.set_locked(true);

    assert_eq!(once.state(), twice.state());
}

#[test]
fn test_malformed_samples_do_not_corrupt_state() {
    let mut processor = processor_with(0.0, 0.15);
    settle_at(&mut processor, 45.0);
    let before = processor.state();

    for sample in [
        Vector3::new(f32::NAN, 0.0, 0.0),
        Vector3::new(0.0, f32::INFINITY, 0.0),
        Vector3::new(0.0, 0.0, f32::NEG_INFINITY),
    ] {
        assert!(matches!(processor.ingest(sample), IngestOutcome::Rejected(_)));
    }
    assert_eq!(processor.state(), before);
}

#[test]
fn test_sector_totality_over_integer_degrees() {
    let mut counts = std::collections::HashMap::new();
    for degree in 0..360 {
        *counts.entry(classify_sector(degree as f32)).or_insert(0) += 1;
    }
    assert_eq!(counts.len(), 8);
    // N owns 338..=359 and 0..=22; the others own 45 whole degrees each
    assert_eq!(counts[&DirectionSector::N], 45);
    assert!(counts.values().all(|&count| count == 45));
}

#[test]
fn test_noisy_heading_is_steadier_than_raw() {
    let mut rng = Pcg64::seed_from_u64(7);
    let mut processor = processor_with(0.0, 0.15);
    settle_at(&mut processor, 0.0);

    let samples = 2_000;
    let mut raw_sq = 0.0_f32;
    let mut filtered_sq = 0.0_f32;
    for _ in 0..samples {
        let noise: f32 = rng.random_range(-8.0..8.0);
        processor.ingest(field_at(noise, rng.random_range(20.0..60.0)));
        raw_sq += noise * noise;
        filtered_sq += shortest_arc(0.0, processor.heading()).powi(2);
    }

    let raw_rms = (raw_sq / samples as f32).sqrt();
    let filtered_rms = (filtered_sq / samples as f32).sqrt();
    assert!(filtered_rms < raw_rms / 2.0, "{filtered_rms} vs {raw_rms}");
}
