use crate::error::{PipelineError, PipelineResult};

/// Scale so the largest absolute sample is exactly 1.0.
pub fn normalize(samples: &mut [f64]) -> PipelineResult<()> {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f64, f64::max);
    if peak == 0.0 || !peak.is_finite() {
        return Err(PipelineError::Silence);
    }
    log::debug!("Peak amplitude {:.4}", peak);
    for s in samples.iter_mut() {
        *s /= peak;
    }
    Ok(())
}

/// `tanh(gain * x)`; output stays inside (-1, 1).
pub fn soft_clip(samples: &mut [f64], gain: f64) {
    for s in samples.iter_mut() {
        *s = (*s * gain).tanh();
    }
}

/// Scale to the 16-bit range, truncating toward zero.
pub fn quantize(samples: &[f64]) -> Vec<i16> {
    samples.iter().map(|&s| (s * 32767.0) as i16).collect()
}

/// Normalize, soft clip and quantize a raw synthesized waveform.
pub fn finish(mut raw: Vec<f64>, clip_gain: f64) -> PipelineResult<Vec<i16>> {
    normalize(&mut raw)?;
    soft_clip(&mut raw, clip_gain);
    Ok(quantize(&raw))
}
