use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;

use crate::piano::notes::NoteMatch;

/// Receives progress and diagnostics from the pipeline stages.
///
/// Stages never print; they report here and the caller decides where the
/// events go. Synthesis may call from several threads at once.
pub trait PipelineObserver: Sync {
    fn stage(&self, _name: &str, _units: usize) {}
    fn segment_done(&self) {}
    fn note_matched(&self, _input_hz: f64, _m: &NoteMatch) {}
    fn clip_missing(&self, _m: &NoteMatch, _path: &Path) {}
    fn rate_mismatch(&self, _note: &str, _clip_rate: u32, _output_rate: u32) {}
}

/// Sends every event to the `log` facade.
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn stage(&self, name: &str, units: usize) {
        log::info!("{} ({} steps)", name, units);
    }

    fn note_matched(&self, input_hz: f64, m: &NoteMatch) {
        log::info!("{}", match_line(input_hz, m));
    }

    fn clip_missing(&self, m: &NoteMatch, path: &Path) {
        log::warn!("WAV file for {} not found at {}, skipping", m.name, path.display());
    }

    fn rate_mismatch(&self, note: &str, clip_rate: u32, output_rate: u32) {
        log::warn!(
            "Clip {} is {}Hz, resampling to {}Hz",
            note,
            clip_rate,
            output_rate
        );
    }
}

/// One line per resequenced frequency, skipped notes included.
pub fn match_line(input_hz: f64, m: &NoteMatch) -> String {
    format!(
        "Input frequency: {:.2} Hz, closest piano note: {} (key {}, {:.2} Hz)",
        input_hz,
        m.name,
        m.index + 1,
        m.frequency
    )
}

/// Logs like [`LogObserver`] and drives a terminal progress bar per stage.
pub struct ProgressObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self { bar: Mutex::new(None) }
    }

    fn tick(&self) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref pb) = *guard {
                pb.inc(1);
            }
        }
    }

    pub fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for ProgressObserver {
    fn stage(&self, name: &str, units: usize) {
        LogObserver.stage(name, units);
        let pb = ProgressBar::new(units as u64);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_message(name.to_string());
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(prev) = guard.replace(pb) {
                prev.finish_and_clear();
            }
        }
    }

    fn segment_done(&self) {
        self.tick();
    }

    fn note_matched(&self, input_hz: f64, m: &NoteMatch) {
        // keep the per-note lines from tearing the bar
        match self.bar.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(pb) => {
                    pb.suspend(|| LogObserver.note_matched(input_hz, m));
                    pb.inc(1);
                }
                None => LogObserver.note_matched(input_hz, m),
            },
            Err(_) => LogObserver.note_matched(input_hz, m),
        }
    }

    fn clip_missing(&self, m: &NoteMatch, path: &Path) {
        LogObserver.clip_missing(m, path);
    }

    fn rate_mismatch(&self, note: &str, clip_rate: u32, output_rate: u32) {
        LogObserver.rate_mismatch(note, clip_rate, output_rate);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::piano::notes::PianoNoteTable;

    #[test]
    fn match_line_names_input_and_key() {
        let m = PianoNoteTable::standard().closest(441.0);
        assert_eq!(
            match_line(441.0, &m),
            "Input frequency: 441.00 Hz, closest piano note: A4 (key 49, 440.00 Hz)"
        );
    }

    #[test]
    fn progress_observer_counts_matches_without_a_stage() {
        let observer = ProgressObserver::new();
        let m = PianoNoteTable::standard().closest(440.0);
        observer.note_matched(440.0, &m);
        observer.finish();
        assert!(observer.bar.lock().unwrap().is_none());
    }
}
