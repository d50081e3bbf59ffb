use std::path::Path;

use audiosync::{SyncParams, audio::read_audio, synchronize};
use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::tempdir;

fn write_i16(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn noise_i16(len: usize, seed: u64) -> Vec<i16> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 48) as u16 as i16
        })
        .collect()
}

#[test]
fn stereo_int_wav_is_averaged_to_mono() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_i16(&path, 2, 8000, &[100, 300, -50, -150, 7, 8]);

    let signal = read_audio(&path).unwrap();
    assert_eq!(signal.sample_rate, 8000);
    assert_eq!(signal.samples, vec![200.0, -100.0, 7.5]);
}

#[test]
fn float_wav_keeps_sample_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mono.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 22050,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for sample in [0.5f32, -0.25, 1.0] {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();

    let signal = read_audio(&path).unwrap();
    assert_eq!(signal.samples, vec![0.5, -0.25, 1.0]);
    assert_eq!(signal.sample_rate, 22050);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(read_audio(dir.path().join("absent.wav")).is_err());
}

#[test]
fn wav_files_synchronize_end_to_end() {
    let dir = tempdir().unwrap();
    let base_path = dir.path().join("base.wav");
    let other_path = dir.path().join("other.wav");

    let params = SyncParams {
        window_size: 256,
        overlap: 0,
        spectral_band: 16,
        temporal_band: 8,
        peaks_per_bin: 3,
    };
    let base = noise_i16(256 * 64, 21);
    let mut other = vec![0i16; 7 * 256];
    other.extend_from_slice(&base);

    write_i16(&base_path, 1, 16000, &base);
    write_i16(&other_path, 1, 16000, &other);

    let base = read_audio(&base_path).unwrap();
    let other = read_audio(&other_path).unwrap();
    assert_eq!(synchronize(&base.samples, &other.samples, &params).unwrap(), 7);
}
