use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};

use crate::peaks::PeakMap;

const BLOCK_COLORS: &[Rgb<u8>] = &[
    Rgb([255, 0, 0]),   // Red
    Rgb([0, 255, 0]),   // Green
    Rgb([0, 128, 255]), // Blue
    Rgb([255, 255, 0]), // Yellow
    Rgb([255, 0, 255]), // Magenta
    Rgb([0, 255, 255]), // Cyan
];

/// Draws the log-scaled spectrogram in grayscale (time left to right, low
/// frequencies at the bottom) with each landmark coloured by the spectral
/// block it was selected from.
pub fn render_landmark_plot(
    spectrogram: &[Vec<f64>],
    peaks: &PeakMap,
    spectral_band: usize,
) -> Option<RgbImage> {
    let width = spectrogram.len();
    let height = spectrogram.first().map_or(0, Vec::len);
    if width == 0 || height == 0 {
        return None;
    }

    // --- Find min/max log magnitude for scaling ---
    let mut min_log_mag = f64::MAX;
    let mut max_log_mag = f64::MIN;
    for time_slice in spectrogram {
        for &magnitude in time_slice {
            if magnitude < 1e-10 {
                continue;
            }
            let log_mag = (magnitude + 1e-6).log10();
            min_log_mag = min_log_mag.min(log_mag);
            max_log_mag = max_log_mag.max(log_mag);
        }
    }
    if min_log_mag > max_log_mag {
        // silent input
        min_log_mag = 0.0;
        max_log_mag = 0.0;
    }
    let log_mag_range = max_log_mag - min_log_mag;
    let log_mag_range = if log_mag_range < 1e-6 {
        1.0
    } else {
        log_mag_range
    };

    let mut imgbuf = RgbImage::new(width as u32, height as u32);

    for (t, time_slice) in spectrogram.iter().enumerate() {
        for (f, &magnitude) in time_slice.iter().enumerate().take(height) {
            let log_mag = (magnitude + 1e-6).log10();
            let scaled_val = (log_mag - min_log_mag) / log_mag_range;
            let intensity = (scaled_val.clamp(0.0, 1.0) * 255.0).round() as u8;
            let x = t as u32;
            let y = (height - 1 - f) as u32;
            imgbuf.put_pixel(x, y, Rgb([intensity, intensity, intensity]));
        }
    }

    for (freq_idx, frames) in peaks.iter() {
        if freq_idx >= height {
            continue;
        }
        let block = freq_idx / spectral_band.max(1);
        let color = BLOCK_COLORS[block % BLOCK_COLORS.len()];
        for &time_idx in frames {
            if time_idx < width {
                imgbuf.put_pixel(time_idx as u32, (height - 1 - freq_idx) as u32, color);
            }
        }
    }

    Some(imgbuf)
}

/// Writes [`render_landmark_plot`] to `output_path`; the format follows
/// the file extension. An empty spectrogram writes nothing.
pub fn save_landmark_plot(
    spectrogram: &[Vec<f64>],
    peaks: &PeakMap,
    spectral_band: usize,
    output_path: &Path,
) -> ImageResult<()> {
    let Some(imgbuf) = render_landmark_plot(spectrogram, peaks, spectral_band) else {
        tracing::warn!("Spectrogram is empty, skipping {}", output_path.display());
        return Ok(());
    };
    imgbuf.save(output_path)?;
    tracing::info!("Landmark plot saved to {}", output_path.display());
    Ok(())
}
