use rayon::prelude::*;
use std::f64::consts::PI;

use crate::config::SynthesisConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::model::FrequencySequence;
use crate::observe::PipelineObserver;

/// `count` samples of a unit sine at `frequency`, phase restarting at zero.
pub fn sine_wave(frequency: f64, count: usize, sample_rate: u32) -> Vec<f64> {
    let omega = 2.0 * PI * frequency;
    (0..count)
        .map(|k| (omega * k as f64 / sample_rate as f64).sin())
        .collect()
}

/// Fundamental plus harmonics 2..=num_harmonics, each harmonic scaled by
/// `harmonic_amplitude_scale` and summed on top without renormalizing.
pub fn tone_segment(frequency: f64, count: usize, cfg: &SynthesisConfig) -> Vec<f64> {
    let mut segment = sine_wave(frequency, count, cfg.sample_rate);
    for harmonic in 2..=cfg.num_harmonics {
        let overtone = sine_wave(frequency * harmonic as f64, count, cfg.sample_rate);
        for (s, o) in segment.iter_mut().zip(overtone) {
            *s += cfg.harmonic_amplitude_scale * o;
        }
    }
    segment
}

/// Sample counts per segment. Segments share `total_duration` equally; the
/// remainder is handed out one sample at a time from the front so the sum is
/// exactly `round(total_duration * sample_rate)`.
pub fn segment_lengths(segments: usize, cfg: &SynthesisConfig) -> Vec<usize> {
    if segments == 0 {
        return Vec::new();
    }
    let total = (cfg.total_duration * cfg.sample_rate as f64).round().max(0.0) as usize;
    let base = total / segments;
    let extra = total % segments;
    (0..segments)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Render the whole sequence into one raw (unnormalized) waveform.
pub fn synthesize(
    sequence: &FrequencySequence,
    cfg: &SynthesisConfig,
    observer: &dyn PipelineObserver,
) -> PipelineResult<Vec<f64>> {
    if sequence.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let lengths = segment_lengths(sequence.len(), cfg);
    log::debug!(
        "Synthesizing {} segments of ~{} samples at {}Hz, pitch divisor {}",
        sequence.len(),
        lengths[0],
        cfg.sample_rate,
        cfg.pitch_divisor
    );
    observer.stage("Synthesizing tones", sequence.len());

    let segments: Vec<Vec<f64>> = sequence
        .hz
        .par_iter()
        .zip(lengths.par_iter())
        .map(|(&f, &count)| {
            let segment = tone_segment(f / cfg.pitch_divisor, count, cfg);
            observer.segment_done();
            segment
        })
        .collect();

    Ok(segments.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::testing::RecordingObserver;
    use crate::observe::LogObserver;

    #[test]
    fn empty_sequence_is_rejected() {
        let err = synthesize(&FrequencySequence::default(), &SynthesisConfig::default(), &LogObserver)
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
    }

    #[test]
    fn duration_is_total_regardless_of_length() {
        let cfg = SynthesisConfig { total_duration: 1.0, ..Default::default() };
        let expected = cfg.sample_rate as usize;
        for n in [1usize, 2, 3, 7, 125, 1000] {
            let seq: FrequencySequence = vec![600.0; n].into();
            let wave = synthesize(&seq, &cfg, &LogObserver).unwrap();
            assert!(
                wave.len().abs_diff(expected) <= 1,
                "n={} gave {} samples",
                n,
                wave.len()
            );
        }
    }

    #[test]
    fn default_run_is_twenty_seconds() {
        let lengths = segment_lengths(125, &SynthesisConfig::default());
        assert_eq!(lengths.len(), 125);
        assert!(lengths.iter().all(|&l| l == 7056));
        assert_eq!(lengths.iter().sum::<usize>(), 20 * 44_100);
    }

    #[test]
    fn segment_starts_at_zero_phase() {
        let wave = sine_wave(440.0, 100, 44_100);
        assert_eq!(wave[0], 0.0);
        let quarter: f64 = 44_100.0 / 440.0 / 4.0;
        assert!((sine_wave(440.0, 200, 44_100)[quarter.round() as usize] - 1.0).abs() < 0.01);
    }

    #[test]
    fn harmonics_are_added_in_place() {
        let cfg = SynthesisConfig::default();
        let seg = tone_segment(200.0, 64, &cfg);
        let f1 = sine_wave(200.0, 64, cfg.sample_rate);
        let f2 = sine_wave(400.0, 64, cfg.sample_rate);
        let f3 = sine_wave(600.0, 64, cfg.sample_rate);
        for i in 0..64 {
            let expected = f1[i] + 0.5 * f2[i] + 0.5 * f3[i];
            assert!((seg[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn single_harmonic_is_plain_sine() {
        let cfg = SynthesisConfig { num_harmonics: 1, ..Default::default() };
        assert_eq!(tone_segment(300.0, 32, &cfg), sine_wave(300.0, 32, cfg.sample_rate));
    }

    #[test]
    fn frequencies_are_divided_before_synthesis() {
        let cfg = SynthesisConfig { total_duration: 0.01, num_harmonics: 1, ..Default::default() };
        let wave = synthesize(&vec![600.0].into(), &cfg, &LogObserver).unwrap();
        assert_eq!(wave, sine_wave(200.0, 441, cfg.sample_rate));
    }

    #[test]
    fn segments_keep_sequence_order() {
        let cfg = SynthesisConfig { total_duration: 0.02, num_harmonics: 1, ..Default::default() };
        let seq: FrequencySequence = vec![900.0, 600.0].into();
        let observer = RecordingObserver::default();
        let wave = synthesize(&seq, &cfg, &observer).unwrap();
        let half = wave.len() / 2;
        assert_eq!(wave[..half], sine_wave(300.0, half, cfg.sample_rate)[..]);
        assert_eq!(wave[half..], sine_wave(200.0, half, cfg.sample_rate)[..]);
        assert_eq!(*observer.segments.lock().unwrap(), 2);
        assert_eq!(
            *observer.stages.lock().unwrap(),
            vec![("Synthesizing tones".to_string(), 2)]
        );
    }
}
