use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config};

#[derive(Parser, Debug)]
#[command(name = "picsona", about = "Turn an image into sound")]
pub struct Cli {
    /// Config file (TOML). Defaults to picsona.toml or ~/.config/picsona/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log only, no progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render an image to a WAV file
    Render(RenderArgs),
    /// Re-render a frequency list with piano note recordings
    Piano(PianoArgs),
    /// Print the piano key table
    Notes,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input image (PNG, JPEG, BMP)
    pub image: PathBuf,

    /// Directory for the generated WAV files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also render the piano version
    #[arg(long)]
    pub piano: bool,

    /// Piano output file (default: <image>.piano.wav in the output directory)
    #[arg(long)]
    pub piano_output: Option<PathBuf>,

    /// Directory holding A0.wav .. C8.wav
    #[arg(long)]
    pub notes_dir: Option<PathBuf>,

    /// Export the frequency list (default path: <image>.freqs.txt in the output directory)
    #[arg(long, num_args = 0..=1)]
    pub frequencies: Option<Option<PathBuf>>,

    /// Write a JSON run report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Total length in seconds
    #[arg(long, default_value_t = 20.0)]
    pub duration: f64,

    /// Highest harmonic added to each tone (1 = pure sine)
    #[arg(long, default_value_t = 3)]
    pub harmonics: u32,

    /// Amplitude of each harmonic relative to the fundamental
    #[arg(long, default_value_t = 0.5)]
    pub harmonic_scale: f64,

    /// Mapped frequencies are divided by this before synthesis
    #[arg(long, default_value_t = 3.0)]
    pub pitch_divisor: f64,

    /// tanh soft-clip gain
    #[arg(long, default_value_t = 5.0)]
    pub clip_gain: f64,

    /// Frequency for a black column (Hz)
    #[arg(long, default_value_t = 600.0)]
    pub fbase: f64,

    /// Frequency for a white column (Hz)
    #[arg(long, default_value_t = 1000.0)]
    pub fmax: f64,
}

#[derive(Args, Debug)]
pub struct PianoArgs {
    /// Frequency list, one value per line
    #[arg(default_value = "frequencies.txt")]
    pub frequencies: PathBuf,

    /// Output WAV file
    #[arg(short, long, default_value = "song_from_wav_files.wav")]
    pub output: PathBuf,

    /// Directory holding A0.wav .. C8.wav
    #[arg(long)]
    pub notes_dir: Option<PathBuf>,

    /// Write a JSON run report
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl RenderArgs {
    /// Flags still at their default leave the config value in place.
    pub fn apply_to(&self, cfg: &mut Config) {
        if self.duration != config::default_total_duration() {
            cfg.synthesis.total_duration = self.duration;
        }
        if self.harmonics != config::default_num_harmonics() {
            cfg.synthesis.num_harmonics = self.harmonics;
        }
        if self.harmonic_scale != config::default_harmonic_amplitude_scale() {
            cfg.synthesis.harmonic_amplitude_scale = self.harmonic_scale;
        }
        if self.pitch_divisor != config::default_pitch_divisor() {
            cfg.synthesis.pitch_divisor = self.pitch_divisor;
        }
        if self.clip_gain != config::default_clip_gain() {
            cfg.synthesis.clip_gain = self.clip_gain;
        }
        if self.fbase != config::default_fbase() {
            cfg.mapping.fbase = self.fbase;
        }
        if self.fmax != config::default_fmax() {
            cfg.mapping.fmax = self.fmax;
        }
        if let Some(ref dir) = self.notes_dir {
            cfg.piano.notes_dir = dir.clone();
        }
    }
}

impl PianoArgs {
    pub fn apply_to(&self, cfg: &mut Config) {
        if let Some(ref dir) = self.notes_dir {
            cfg.piano.notes_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_defaults_keep_config_values() {
        let cli = Cli::parse_from(["picsona", "render", "cat.png"]);
        let Command::Render(args) = cli.command else { panic!("expected render") };
        let mut cfg = Config::default();
        cfg.synthesis.total_duration = 8.0;
        cfg.mapping.fmax = 1500.0;
        args.apply_to(&mut cfg);
        assert_eq!(cfg.synthesis.total_duration, 8.0);
        assert_eq!(cfg.mapping.fmax, 1500.0);
        assert!(args.frequencies.is_none());
    }

    #[test]
    fn zero_pitch_divisor_flag_fails_validation() {
        let cli = Cli::parse_from(["picsona", "render", "cat.png", "--pitch-divisor", "0"]);
        let Command::Render(args) = cli.command else { panic!("expected render") };
        let mut cfg = Config::default();
        args.apply_to(&mut cfg);
        assert!(matches!(
            cfg.validate(),
            Err(crate::error::ConfigError::NotPositive("synthesis.pitch_divisor"))
        ));
    }

    #[test]
    fn explicit_flags_override_config() {
        let cli = Cli::parse_from([
            "picsona", "render", "cat.png", "--duration", "5", "--pitch-divisor", "2",
            "--notes-dir", "keys", "--frequencies",
        ]);
        let Command::Render(args) = cli.command else { panic!("expected render") };
        let mut cfg = Config::default();
        args.apply_to(&mut cfg);
        assert_eq!(cfg.synthesis.total_duration, 5.0);
        assert_eq!(cfg.synthesis.pitch_divisor, 2.0);
        assert_eq!(cfg.piano.notes_dir, PathBuf::from("keys"));
        assert_eq!(args.frequencies, Some(None));
    }

    #[test]
    fn piano_defaults_match_legacy_file_names() {
        let cli = Cli::parse_from(["picsona", "piano"]);
        let Command::Piano(args) = cli.command else { panic!("expected piano") };
        assert_eq!(args.frequencies, PathBuf::from("frequencies.txt"));
        assert_eq!(args.output, PathBuf::from("song_from_wav_files.wav"));
    }
}
