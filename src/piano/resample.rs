use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::{PipelineError, PipelineResult};

const CHUNK_SIZE: usize = 1024;

/// Convert a mono 16-bit clip from `input_rate` to `output_rate`.
///
/// Output length is `round(len * output_rate / input_rate)`; the resampler's
/// filter delay is trimmed from the front.
pub fn resample(input: &[i16], input_rate: u32, output_rate: u32) -> PipelineResult<Vec<i16>> {
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }

    let ratio = output_rate as f64 / input_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        oversampling_factor: 64,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
        .map_err(|e| PipelineError::Resample(e.to_string()))?;

    let floats: Vec<f32> = input.iter().map(|&s| s as f32 / 32768.0).collect();
    let delay = resampler.output_delay();
    let expected = (input.len() as f64 * ratio).round() as usize;
    let mut output: Vec<f32> = Vec::with_capacity(expected + delay);

    let mut position = 0;
    while position + CHUNK_SIZE <= floats.len() {
        let result = resampler
            .process(&[&floats[position..position + CHUNK_SIZE]], None)
            .map_err(|e| PipelineError::Resample(e.to_string()))?;
        output.extend_from_slice(&result[0]);
        position += CHUNK_SIZE;
    }

    if position < floats.len() {
        let tail: [&[f32]; 1] = [&floats[position..]];
        let result = resampler
            .process_partial(Some(&tail[..]), None)
            .map_err(|e| PipelineError::Resample(e.to_string()))?;
        output.extend_from_slice(&result[0]);
    }

    // Flush the filter tail until the delayed output is complete
    while output.len() < expected + delay {
        let result = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| PipelineError::Resample(e.to_string()))?;
        if result[0].is_empty() {
            break;
        }
        output.extend_from_slice(&result[0]);
    }

    Ok(output
        .into_iter()
        .skip(delay)
        .take(expected)
        .map(|s| (s * 32768.0).clamp(-32768.0, 32767.0) as i16)
        .collect())
}
