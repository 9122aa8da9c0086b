use crate::config::MappingConfig;
use crate::model::{FrequencySequence, IntensityProfile};

/// Linear remap of a single 8-bit intensity into `[fbase, fmax]`.
pub fn intensity_to_frequency(value: u8, cfg: &MappingConfig) -> f64 {
    cfg.fbase + (value as f64 / 255.0) * (cfg.fmax - cfg.fbase)
}

/// Map every column to a frequency, then halve the sequence by keeping the
/// lower of each adjacent pair. The halving shortens the rendered piece; a
/// trailing unpaired column passes through as-is.
pub fn map_profile(profile: &IntensityProfile, cfg: &MappingConfig) -> FrequencySequence {
    let f_array: Vec<f64> = profile
        .columns
        .iter()
        .map(|&v| intensity_to_frequency(v, cfg))
        .collect();
    let sequence = pairwise_min(&f_array);

    log::info!(
        "Mapped {} columns to {} frequencies in [{:.1}, {:.1}] Hz",
        f_array.len(),
        sequence.len(),
        cfg.fbase,
        cfg.fmax
    );

    sequence
}

pub fn pairwise_min(values: &[f64]) -> FrequencySequence {
    values
        .chunks(2)
        .map(|pair| pair.iter().copied().fold(f64::INFINITY, f64::min))
        .collect::<Vec<_>>()
        .into()
}
