use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use audiosync::{SyncParams, audio, config, peaks, report, visualize};

/// Synchronize two audio files.
#[derive(Parser, Debug)]
#[command(name = "audiosync", version, about)]
struct Cli {
    /// Path to the first audio file.
    #[arg(value_name = "SELF")]
    self_path: PathBuf,

    /// Path to the second audio file.
    #[arg(value_name = "OTHER")]
    other_path: PathBuf,

    /// Samples per analysis frame.
    #[arg(long, default_value_t = config::WINDOW_SIZE)]
    window_size: usize,

    /// Samples shared by consecutive frames.
    #[arg(long, default_value_t = config::OVERLAP)]
    overlap: usize,

    /// Frequency bins per landmark block.
    #[arg(long, default_value_t = config::SPECTRAL_BAND)]
    spectral_band: usize,

    /// Frames per landmark block.
    #[arg(long, default_value_t = config::TEMPORAL_BAND)]
    temporal_band: usize,

    /// Landmarks kept per block.
    #[arg(long, default_value_t = config::PEAKS_PER_BIN)]
    peaks_per_bin: usize,

    /// Write spectrogram/landmark images (base.png, other.png) into this directory.
    #[arg(long, value_name = "DIR")]
    plot: Option<PathBuf>,

    /// More log output (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn params(&self) -> SyncParams {
        SyncParams {
            window_size: self.window_size,
            overlap: self.overlap,
            spectral_band: self.spectral_band,
            temporal_band: self.temporal_band,
            peaks_per_bin: self.peaks_per_bin,
        }
    }

    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn write_plot(dir: &Path, name: &str, samples: &[f32], params: &SyncParams) -> Result<()> {
    let spectrogram = audiosync::spectrogram(samples, params)?;
    let peaks = peaks::extract_peaks(
        &spectrogram,
        params.spectral_band,
        params.temporal_band,
        params.peaks_per_bin,
    )?;
    let path = dir.join(format!("{name}.png"));
    visualize::save_landmark_plot(&spectrogram, &peaks, params.spectral_band, &path)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    let params = cli.params();
    params.validate()?;

    let base = audio::read_audio(&cli.self_path)
        .with_context(|| format!("failed to read {}", cli.self_path.display()))?;
    let other = audio::read_audio(&cli.other_path)
        .with_context(|| format!("failed to read {}", cli.other_path.display()))?;
    tracing::debug!(
        "Durations: self {:.2} s, other {:.2} s",
        base.duration_secs(),
        other.duration_secs()
    );
    ensure!(
        base.sample_rate == other.sample_rate,
        "Sample rates must be the same ({} Hz vs {} Hz)",
        base.sample_rate,
        other.sample_rate
    );

    if let Some(dir) = &cli.plot {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        write_plot(dir, "base", &base.samples, &params)?;
        write_plot(dir, "other", &other.samples, &params)?;
    }

    let alignment = audiosync::align(&base.samples, &other.samples, &params)?;
    tracing::info!(
        "Match quality: {} ({:.1}% confidence)",
        alignment.match_quality(),
        alignment.confidence()
    );

    println!(
        "{}",
        report::describe_offset(alignment.delay, params.step_size(), base.sample_rate)
    );
    Ok(())
}
