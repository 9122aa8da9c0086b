use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{Config, PianoConfig, SynthesisConfig};
use crate::encode::wav::write_wav;
use crate::error::PipelineResult;
use crate::handoff;
use crate::model::{FrequencySequence, Waveform};
use crate::observe::PipelineObserver;
use crate::piano::clips::ClipLibrary;
use crate::piano::sequence::{resequence, PianoRender};
use crate::raster::intensity;
use crate::synth::{finish, mapping, tone};

/// Where a `render` run writes its artifacts
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub output_dir: PathBuf,
    /// Also re-render the sequence with piano clips
    pub piano: bool,
    /// Export the frequency sequence as text to this path
    pub frequencies_out: Option<PathBuf>,
    /// Overrides `<stem>.piano.wav` in the output directory
    pub piano_out: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub profile_columns: usize,
    pub frequencies: usize,
    pub frequencies_file: Option<PathBuf>,
    pub synth: Option<OutputSummary>,
    pub piano: Option<PianoSummary>,
}

#[derive(Debug, Serialize)]
pub struct OutputSummary {
    pub path: PathBuf,
    pub samples: usize,
    pub sample_rate: u32,
    pub duration_secs: f64,
}

#[derive(Debug, Serialize)]
pub struct PianoSummary {
    pub output: OutputSummary,
    pub notes: Vec<&'static str>,
    pub skipped: usize,
    pub skipped_notes: Vec<&'static str>,
    pub resampled: usize,
}

impl OutputSummary {
    fn new(path: &Path, waveform: &Waveform) -> Self {
        Self {
            path: path.to_path_buf(),
            samples: waveform.samples.len(),
            sample_rate: waveform.sample_rate,
            duration_secs: waveform.duration(),
        }
    }
}

/// Harmonic synthesis followed by normalize / soft clip / quantize.
pub fn synthesize_waveform(
    sequence: &FrequencySequence,
    cfg: &SynthesisConfig,
    observer: &dyn PipelineObserver,
) -> PipelineResult<Waveform> {
    let raw = tone::synthesize(sequence, cfg, observer)?;
    let samples = finish::finish(raw, cfg.clip_gain)?;
    Ok(Waveform {
        samples,
        sample_rate: cfg.sample_rate,
    })
}

/// Image in, `<stem>.wav` (and optionally `<stem>.piano.wav`) out.
///
/// Every stage runs to completion before the first file is written, so a
/// failure anywhere leaves the output directory untouched.
pub fn render_image(
    image: &Path,
    opts: &RenderOptions,
    cfg: &Config,
    observer: &dyn PipelineObserver,
) -> Result<RunReport> {
    let stem = image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    observer.stage("Extracting column intensities", 1);
    let profile = intensity::extract(image, &cfg.image)?;
    let sequence = mapping::map_profile(&profile, &cfg.mapping);
    let waveform = synthesize_waveform(&sequence, &cfg.synthesis, observer)?;
    let piano_render = if opts.piano {
        Some(resequence_piano(&sequence, &cfg.piano, observer)?)
    } else {
        None
    };

    let frequencies_file = match opts.frequencies_out {
        Some(ref path) => {
            handoff::write_frequencies(path, &sequence)?;
            Some(path.clone())
        }
        None => None,
    };

    std::fs::create_dir_all(&opts.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", opts.output_dir.display())
    })?;
    let wav_path = opts.output_dir.join(format!("{}.wav", stem));
    write_wav(&wav_path, &waveform)?;

    let piano = match piano_render {
        Some(render) => {
            let out = opts
                .piano_out
                .clone()
                .unwrap_or_else(|| opts.output_dir.join(format!("{}.piano.wav", stem)));
            Some(write_piano(&out, render)?)
        }
        None => None,
    };

    Ok(RunReport {
        input: image.to_path_buf(),
        profile_columns: profile.columns.len(),
        frequencies: sequence.len(),
        frequencies_file,
        synth: Some(OutputSummary::new(&wav_path, &waveform)),
        piano,
    })
}

fn resequence_piano(
    sequence: &FrequencySequence,
    cfg: &PianoConfig,
    observer: &dyn PipelineObserver,
) -> PipelineResult<PianoRender> {
    let library = ClipLibrary::open(&cfg.notes_dir)?;
    resequence(sequence, &library, cfg.fallback_sample_rate, observer)
}

fn write_piano(output: &Path, render: PianoRender) -> Result<PianoSummary> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    write_wav(output, &render.waveform)?;

    if !render.skipped.is_empty() {
        log::warn!(
            "{} of {} notes had no clip and were skipped",
            render.skipped.len(),
            render.matched.len()
        );
    }

    Ok(PianoSummary {
        output: OutputSummary::new(output, &render.waveform),
        skipped: render.skipped.len(),
        notes: render.matched,
        skipped_notes: render.skipped,
        resampled: render.resampled,
    })
}

/// Resequence with piano clips and write the result to `output`.
pub fn render_piano(
    sequence: &FrequencySequence,
    output: &Path,
    cfg: &PianoConfig,
    observer: &dyn PipelineObserver,
) -> Result<PianoSummary> {
    let render = resequence_piano(sequence, cfg, observer)?;
    write_piano(output, render)
}

/// Standalone piano stage driven by a frequency text file.
pub fn piano_from_file(
    frequencies: &Path,
    output: &Path,
    cfg: &PianoConfig,
    observer: &dyn PipelineObserver,
) -> Result<RunReport> {
    let sequence = handoff::read_frequencies(frequencies)?;
    let piano = render_piano(&sequence, output, cfg, observer)?;
    Ok(RunReport {
        input: frequencies.to_path_buf(),
        frequencies: sequence.len(),
        frequencies_file: Some(frequencies.to_path_buf()),
        piano: Some(piano),
        ..Default::default()
    })
}

pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write run report: {}", path.display()))?;
    Ok(())
}
