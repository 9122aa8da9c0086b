mod cli;
mod config;
mod encode;
mod error;
mod handoff;
mod model;
mod observe;
mod piano;
mod pipeline;
mod raster;
mod synth;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use error::{ConfigError, PipelineError};
use observe::{LogObserver, PipelineObserver, ProgressObserver};
use piano::notes::PianoNoteTable;
use pipeline::RenderOptions;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        log::debug!("{:?}", err);
        // Keep paths and internals out of the user-facing line
        let message = match err.downcast_ref::<PipelineError>() {
            Some(e) => e.user_message().to_string(),
            None => match err.downcast_ref::<ConfigError>() {
                Some(e) => e.to_string(),
                None => "processing failed".to_string(),
            },
        };
        log::error!("Failed: {}", message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut cfg = match config::discover_config_path(cli.config.clone()) {
        Some(path) => match config::load_config(&path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                config::Config::default()
            }
        },
        None => config::Config::default(),
    };

    let progress = ProgressObserver::new();
    let observer: &dyn PipelineObserver = if cli.quiet { &LogObserver } else { &progress };

    match cli.command {
        Command::Render(args) => {
            args.apply_to(&mut cfg);
            cfg.validate()?;
            log::info!("picsona - image to sound");
            log::info!("Input: {}", args.image.display());
            log::info!(
                "Band {:.0}-{:.0}Hz, {:.1}s, {} harmonics",
                cfg.mapping.fbase,
                cfg.mapping.fmax,
                cfg.synthesis.total_duration,
                cfg.synthesis.num_harmonics
            );

            let stem = args
                .image
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            let opts = RenderOptions {
                output_dir: args.output_dir.clone(),
                piano: args.piano,
                frequencies_out: args.frequencies.clone().map(|p| {
                    p.unwrap_or_else(|| args.output_dir.join(format!("{}.freqs.txt", stem)))
                }),
                piano_out: args.piano_output.clone(),
            };

            let report = pipeline::render_image(&args.image, &opts, &cfg, observer);
            progress.finish();
            let report = report?;

            if let Some(ref path) = args.report {
                pipeline::write_report(path, &report)?;
            }
            if let Some(ref synth) = report.synth {
                println!("{}", synth.path.display());
            }
            if let Some(ref piano) = report.piano {
                println!("{}", piano.output.path.display());
                log::info!("Piano render: {} skipped notes", piano.skipped);
            }
        }
        Command::Piano(args) => {
            args.apply_to(&mut cfg);
            cfg.validate()?;
            let report =
                pipeline::piano_from_file(&args.frequencies, &args.output, &cfg.piano, observer);
            progress.finish();
            let report = report?;

            if let Some(ref path) = args.report {
                pipeline::write_report(path, &report)?;
            }
            if let Some(ref piano) = report.piano {
                log::info!(
                    "Song saved as '{}' ({} skipped notes)",
                    piano.output.path.display(),
                    piano.skipped
                );
                println!("{}", piano.output.path.display());
            }
        }
        Command::Notes => {
            for note in PianoNoteTable::standard().notes() {
                println!("{:>2}  {:<4} {:>9.3} Hz", note.key, note.name, note.frequency);
            }
        }
    }

    Ok(())
}
