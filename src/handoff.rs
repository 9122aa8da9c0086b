//! Text serialization of a frequency sequence: one value per line, line
//! order is playback order. Lets the piano stage run in a separate process.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{PipelineError, PipelineResult};
use crate::model::FrequencySequence;

/// Write the sequence next to `path` and rename it into place, so a reader
/// never observes a half-written file.
pub fn write_frequencies(path: &Path, sequence: &FrequencySequence) -> PipelineResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::handoff(path, e))?;
    for f in &sequence.hz {
        writeln!(tmp, "{}", f).map_err(|e| PipelineError::handoff(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| PipelineError::handoff(path, e))?;
    tmp.persist(path)
        .map_err(|e| PipelineError::handoff(path, e.error))?;

    log::info!("Wrote {} frequencies to {}", sequence.len(), path.display());
    Ok(())
}

pub fn read_frequencies(path: &Path) -> PipelineResult<FrequencySequence> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::handoff(path, e))?;
    let hz = parse_frequencies(&content).map_err(|reason| PipelineError::handoff(path, reason))?;
    log::info!("Read {} frequencies from {}", hz.len(), path.display());
    Ok(hz.into())
}

/// Blank lines are ignored; anything else must parse as a float.
pub fn parse_frequencies(content: &str) -> Result<Vec<f64>, String> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| {
            line.parse::<f64>()
                .map_err(|e| format!("line {}: {:?}: {}", i + 1, line, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_sequence_reads_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.freqs.txt");
        let seq: FrequencySequence = vec![600.0, 783.5294117647059, 1000.0, 612.5].into();
        write_frequencies(&path, &seq).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert_eq!(read_frequencies(&path).unwrap(), seq);
    }

    #[test]
    fn rewrite_replaces_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frequencies.txt");
        write_frequencies(&path, &vec![1.0, 2.0, 3.0].into()).unwrap();
        write_frequencies(&path, &vec![9.0].into()).unwrap();
        assert_eq!(read_frequencies(&path).unwrap().hz, vec![9.0]);
    }

    #[test]
    fn accepts_python_style_floats_and_blank_lines() {
        let parsed = parse_frequencies("600.0\n\n  712.156862745098 \n1000.0\n").unwrap();
        assert_eq!(parsed, vec![600.0, 712.156862745098, 1000.0]);
    }

    #[test]
    fn bad_line_is_handoff_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "600.0\nloud\n").unwrap();
        let err = read_frequencies(&path).unwrap_err();
        match err {
            PipelineError::HandoffIo { reason, .. } => assert!(reason.contains("line 2")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_handoff_error() {
        let err = read_frequencies(Path::new("/no/such/frequencies.txt")).unwrap_err();
        assert!(matches!(err, PipelineError::HandoffIo { .. }));
    }
}
