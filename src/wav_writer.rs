use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;

use crate::error::RenderError;
use crate::params::BitDepth;

/// Write interleaved float samples as a RIFF/WAVE file.
///
/// Integer formats are scaled to full range, rounded and clamped; Float32
/// stores the samples bit-exact.
pub fn write_wav(
    path: &Path,
    interleaved: &[f32],
    channels: u16,
    sample_rate: u32,
    bit_depth: BitDepth,
) -> Result<(), RenderError> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: match bit_depth {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        },
        sample_format: match bit_depth {
            BitDepth::Float32 => SampleFormat::Float,
            _ => SampleFormat::Int,
        },
    };

    let mut writer = WavWriter::create(path, spec)?;
    match bit_depth {
        BitDepth::Int16 => {
            for &sample in interleaved {
                writer.write_sample(to_i16(sample))?;
            }
        }
        BitDepth::Int24 => {
            for &sample in interleaved {
                writer.write_sample(to_i24(sample))?;
            }
        }
        BitDepth::Float32 => {
            for &sample in interleaved {
                writer.write_sample(sample)?;
            }
        }
    }
    writer.finalize()?;

    info!(
        "write_wav: {} frames x {} ch @ {} Hz ({:?}) -> {}",
        interleaved.len() / channels as usize,
        channels,
        sample_rate,
        bit_depth,
        path.display()
    );

    Ok(())
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

#[inline]
fn to_i24(sample: f32) -> i32 {
    (sample * 8_388_607.0).round().clamp(-8_388_608.0, 8_388_607.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;
    use std::path::PathBuf;

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("imagewave_test_{}_{}.wav", std::process::id(), name))
    }

    #[test]
    fn test_i16_scaling_and_clamping() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), 32767);
        assert_eq!(to_i16(-1.0), -32767);
        assert_eq!(to_i16(2.0), 32767);
        assert_eq!(to_i16(-2.0), -32768);
    }

    #[test]
    fn test_i24_scaling_and_clamping() {
        assert_eq!(to_i24(1.0), 8_388_607);
        assert_eq!(to_i24(-1.0), -8_388_607);
        assert_eq!(to_i24(10.0), 8_388_607);
        assert_eq!(to_i24(-10.0), -8_388_608);
    }

    #[test]
    fn test_float32_round_trip_is_bit_exact() {
        let path = temp_wav("f32_roundtrip");
        let samples = vec![0.0f32, 0.25, -0.5, 1.0, -1.0, 0.123456];
        write_wav(&path, &samples, 1, 48000, BitDepth::Float32).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_int16_round_trip_frame_count() {
        let path = temp_wav("i16_frames");
        let samples = vec![0.5f32; 100];
        write_wav(&path, &samples, 2, 44100, BitDepth::Int16).unwrap();

        let reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, SampleFormat::Int);
        assert_eq!(reader.duration(), 50);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_int24_spec_fields() {
        let path = temp_wav("i24_spec");
        write_wav(&path, &[0.1, -0.1, 0.2, -0.2], 1, 96000, BitDepth::Int24).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.bits_per_sample, 24);
        assert_eq!(spec.sample_rate, 96000);
        let read: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(read[0], to_i24(0.1));
        assert_eq!(read.len(), 4);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_one_second_stereo_float_silence() {
        // 1 s of stereo Float32 silence at 44100 Hz: 44100 frames, and a
        // data payload of 44100 * 2 * 4 bytes.
        let path = temp_wav("stereo_silence");
        let samples = vec![0.0f32; 44100 * 2];
        write_wav(&path, &samples, 2, 44100, BitDepth::Float32).unwrap();

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 0x0000_AC44);
        assert_eq!(reader.duration(), 44100);
        assert_eq!(reader.len(), 44100 * 2);

        let file_len = std::fs::metadata(&path).unwrap().len();
        assert!(file_len >= 44100 * 2 * 4 + 44);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unwritable_path_errors() {
        let path = PathBuf::from("/nonexistent-dir/imagewave.wav");
        let result = write_wav(&path, &[0.0], 1, 44100, BitDepth::Int16);
        assert!(matches!(
            result,
            Err(RenderError::Wav(_)) | Err(RenderError::Io(_))
        ));
    }
}
