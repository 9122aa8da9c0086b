/// Per-column intensity peaks of the resized grayscale image
#[derive(Clone, Debug, PartialEq)]
pub struct IntensityProfile {
    /// Maximum luma value of each column, left to right
    pub columns: Vec<u8>,
}

/// Frequencies in Hz, in playback order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencySequence {
    pub hz: Vec<f64>,
}

impl FrequencySequence {
    pub fn len(&self) -> usize {
        self.hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hz.is_empty()
    }
}

impl From<Vec<f64>> for FrequencySequence {
    fn from(hz: Vec<f64>) -> Self {
        Self { hz }
    }
}

/// Mono 16-bit PCM ready to be written to a container
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
