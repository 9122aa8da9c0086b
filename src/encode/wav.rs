use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::model::Waveform;

/// Write a mono 16-bit PCM WAV. The file is only created once all samples
/// exist, so a failed run leaves nothing behind.
pub fn write_wav(path: &Path, waveform: &Waveform) -> PipelineResult<()> {
    let wav_err = |source| PipelineError::WavWrite {
        path: path.to_path_buf(),
        source,
    };

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_err)?;
    for &s in &waveform.samples {
        writer.write_sample(s).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;

    log::info!(
        "Wrote {} ({} samples, {}Hz, {:.2}s)",
        path.display(),
        waveform.samples.len(),
        waveform.sample_rate,
        waveform.duration()
    );
    Ok(())
}
