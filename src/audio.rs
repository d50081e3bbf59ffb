use std::path::Path;

use hound::SampleFormat;

use crate::error::AudioError;

/// Mono samples plus the rate they were recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSignal {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Reads a WAV file and averages its channels into one.
///
/// Integer PCM keeps its raw sample values (no scaling to [-1, 1]).
pub fn read_audio(filepath: impl AsRef<Path>) -> Result<AudioSignal, AudioError> {
    let filepath = filepath.as_ref();
    let mut reader = hound::WavReader::open(filepath)?;
    let spec = reader.spec();

    tracing::info!(
        "{}: {} Hz, {} channel(s), {} bit {:?}, {} samples",
        filepath.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format,
        reader.len()
    );

    if spec.channels == 0 {
        return Err(AudioError::NoChannels);
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => reader
            .samples::<i32>()
            .map(|sample| sample.map(|value| value as f32))
            .collect::<Result<_, _>>()?,
    };

    if spec.channels > 1 {
        tracing::debug!("Down-mixing {} channels to mono", spec.channels);
    }

    Ok(AudioSignal {
        samples: downmix(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

/// Averages interleaved frames of `channels` samples. A trailing partial
/// frame is dropped.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
