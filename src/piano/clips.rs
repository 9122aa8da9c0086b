use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::notes::NoteMatch;
use crate::error::{PipelineError, PipelineResult};

/// A decoded single-note recording, already downmixed to mono
pub struct NoteClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    /// Channel count of the file before downmixing
    pub source_channels: usize,
}

/// Directory of `<Note>.wav` recordings, one per piano key.
pub struct ClipLibrary {
    dir: PathBuf,
}

impl ClipLibrary {
    pub fn open(dir: &Path) -> PipelineResult<Self> {
        if !dir.is_dir() {
            return Err(PipelineError::NoteDirectoryMissing(dir.to_path_buf()));
        }
        Ok(Self { dir: dir.to_path_buf() })
    }

    pub fn clip_path(&self, note: &str) -> PathBuf {
        self.dir.join(format!("{}.wav", note))
    }

    /// `MissingNoteClip` when the file is absent; any other error means the
    /// file exists but is unusable.
    pub fn load(&self, m: &NoteMatch) -> PipelineResult<NoteClip> {
        let path = self.clip_path(m.name);
        if !path.is_file() {
            return Err(PipelineError::MissingNoteClip { note: m.name, path });
        }
        decode_clip(&path)
    }
}

pub fn decode_clip(path: &Path) -> PipelineResult<NoteClip> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::clip_decode(path, e))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| PipelineError::clip_decode(path, e))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| PipelineError::clip_decode(path, "no audio track"))?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| PipelineError::clip_decode(path, "unknown sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PipelineError::clip_decode(path, e))?;

    let mut samples: Vec<i16> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(PipelineError::clip_decode(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(PipelineError::clip_decode(path, e)),
        };

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<i16>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        samples.extend(downmix(sample_buf.samples(), channels));
    }

    log::debug!(
        "Decoded clip {}: {} samples, {}Hz, {} channel(s)",
        path.display(),
        samples.len(),
        sample_rate,
        channels
    );

    Ok(NoteClip {
        samples,
        sample_rate,
        source_channels: channels,
    })
}

/// Average interleaved frames down to one channel, truncating toward zero.
pub fn downmix(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}
