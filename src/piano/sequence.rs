use std::collections::HashMap;

use super::clips::{ClipLibrary, NoteClip};
use super::notes::PianoNoteTable;
use super::resample::resample;
use crate::error::{PipelineError, PipelineResult};
use crate::model::{FrequencySequence, Waveform};
use crate::observe::PipelineObserver;

/// Outcome of re-rendering a frequency sequence with piano recordings
#[derive(Debug)]
pub struct PianoRender {
    pub waveform: Waveform,
    /// Matched note for every input frequency, in input order
    pub matched: Vec<&'static str>,
    /// Notes whose clip was missing; these contributed no samples
    pub skipped: Vec<&'static str>,
    /// Clips converted because their rate differed from the output rate
    pub resampled: usize,
}

/// Snap each frequency to the nearest key and concatenate the recordings.
///
/// The output rate is that of the first clip that loads; later clips at a
/// different rate are resampled to it. With no clip at all the waveform is
/// empty at `fallback_rate`.
pub fn resequence(
    frequencies: &FrequencySequence,
    library: &ClipLibrary,
    fallback_rate: u32,
    observer: &dyn PipelineObserver,
) -> PipelineResult<PianoRender> {
    let table = PianoNoteTable::standard();
    let mut cache: HashMap<&'static str, Option<NoteClip>> = HashMap::new();

    let mut samples: Vec<i16> = Vec::new();
    let mut sample_rate: Option<u32> = None;
    let mut matched = Vec::with_capacity(frequencies.len());
    let mut skipped = Vec::new();
    let mut resampled = 0;

    observer.stage("Resequencing piano notes", frequencies.len());

    for &freq in &frequencies.hz {
        let m = table.closest(freq);
        observer.note_matched(freq, &m);
        matched.push(m.name);

        if !cache.contains_key(m.name) {
            let loaded = match library.load(&m) {
                Ok(clip) => {
                    if clip.source_channels > 1 {
                        log::debug!("{} has {} channels, downmixed", m.name, clip.source_channels);
                    }
                    Some(clip)
                }
                Err(PipelineError::MissingNoteClip { .. }) => None,
                Err(e) => return Err(e),
            };
            cache.insert(m.name, loaded);
        }

        let Some(clip) = cache.get(m.name).and_then(|c| c.as_ref()) else {
            observer.clip_missing(&m, &library.clip_path(m.name));
            skipped.push(m.name);
            continue;
        };

        let rate = *sample_rate.get_or_insert(clip.sample_rate);
        if clip.sample_rate == rate {
            samples.extend_from_slice(&clip.samples);
        } else {
            observer.rate_mismatch(m.name, clip.sample_rate, rate);
            samples.extend(resample(&clip.samples, clip.sample_rate, rate)?);
            resampled += 1;
        }
    }

    let waveform = Waveform {
        samples,
        sample_rate: sample_rate.unwrap_or(fallback_rate),
    };

    log::info!(
        "Piano render: {} notes, {} skipped, {:.2}s at {}Hz",
        matched.len(),
        skipped.len(),
        waveform.duration(),
        waveform.sample_rate
    );

    Ok(PianoRender {
        waveform,
        matched,
        skipped,
        resampled,
    })
}
