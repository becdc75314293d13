use std::path::Path;

use log::info;

use crate::cancel::CancelToken;
use crate::error::RenderError;
use crate::griffin_lim::GriffinLim;
use crate::image_data::ImageData;
use crate::leveling;
use crate::params::RenderParams;
use crate::spectrogram_builder::SpectrogramBuilder;
use crate::stft::Stft;
use crate::wav_writer::write_wav;

/// Overall progress callback, normalized to [0, 1].
pub type RenderProgressFn<'a> = dyn FnMut(f32) + 'a;

/// What a completed render produced.
#[derive(Debug, Clone)]
pub struct RenderSummary {
    pub frames: usize,
    pub bins: usize,
    pub output_samples: usize,
    pub channels: u16,
    pub duration_seconds: f64,
}

/// Runs the whole pipeline: image → magnitude spectrogram → Griffin-Lim →
/// leveling → WAV file.
///
/// Stage weights for progress reporting: 10% validated, 20% spectrogram
/// built, 20–80% across Griffin-Lim iterations, 90% leveled, 100% written.
pub struct Renderer {
    params: RenderParams,
}

impl Renderer {
    /// Validates the parameter bundle up front; no work happens on failure.
    pub fn new(params: RenderParams) -> Result<Self, RenderError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    pub fn render(
        &self,
        image: &ImageData,
        output: &Path,
        mut on_progress: Option<&mut RenderProgressFn<'_>>,
        cancel: &CancelToken,
    ) -> Result<RenderSummary, RenderError> {
        let spec_params = &self.params.spectrogram;
        report(&mut on_progress, 0.10);

        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let magnitude = SpectrogramBuilder::new(spec_params.clone()).build(image);
        if magnitude.is_empty() {
            return Err(RenderError::EmptyInput("spectrogram has zero frames"));
        }
        report(&mut on_progress, 0.20);

        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let stft = Stft::new(spec_params.fft_size, spec_params.hop_size)?;
        let mut griffin_lim = GriffinLim::new(self.params.iterations);
        if let Some(seed) = self.params.seed {
            griffin_lim = griffin_lim.with_seed(seed);
        }

        let mut gl_progress = |current: usize, total: usize| {
            report(&mut on_progress, 0.20 + 0.60 * current as f32 / total as f32);
        };
        let mut audio =
            griffin_lim.reconstruct(&magnitude, &stft, Some(&mut gl_progress), cancel)?;

        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        if audio.is_empty() {
            return Err(RenderError::EmptyInput("reconstruction produced no audio"));
        }
        report(&mut on_progress, 0.80);

        leveling::remove_dc_offset(&mut audio);
        leveling::normalize(&mut audio, self.params.normalize_target_dbfs);
        leveling::apply_gain(&mut audio, self.params.output_gain_db);
        if self.params.use_limiter {
            leveling::apply_safety_limiter(&mut audio, leveling::LIMITER_THRESHOLD);
        }
        report(&mut on_progress, 0.90);

        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let (interleaved, channels) = if self.params.stereo {
            (leveling::mono_to_stereo(&audio), 2u16)
        } else {
            (audio, 1u16)
        };

        if let Err(err) = write_wav(
            output,
            &interleaved,
            channels,
            spec_params.sample_rate,
            self.params.bit_depth,
        ) {
            // Don't leave a truncated file behind.
            std::fs::remove_file(output).ok();
            return Err(err);
        }
        report(&mut on_progress, 1.0);

        let frames = interleaved.len() / channels as usize;
        let summary = RenderSummary {
            frames: magnitude.num_frames(),
            bins: magnitude.num_bins(),
            output_samples: interleaved.len(),
            channels,
            duration_seconds: frames as f64 / spec_params.sample_rate as f64,
        };
        info!(
            "render: {} frames x {} bins -> {:.2} s of audio ({} ch)",
            summary.frames, summary.bins, summary.duration_seconds, summary.channels
        );
        Ok(summary)
    }
}

fn report(progress: &mut Option<&mut RenderProgressFn<'_>>, value: f32) {
    if let Some(callback) = progress.as_deref_mut() {
        callback(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{BitDepth, SpectrogramParams};
    use hound::WavReader;
    use std::path::PathBuf;

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "imagewave_pipeline_{}_{}.wav",
            std::process::id(),
            name
        ))
    }

    fn small_params() -> RenderParams {
        RenderParams {
            spectrogram: SpectrogramParams {
                fft_size: 1024,
                hop_size: 256,
                ..Default::default()
            },
            iterations: 16,
            seed: Some(17),
            use_limiter: true,
            bit_depth: BitDepth::Float32,
            ..Default::default()
        }
    }

    fn gradient_image(width: usize, height: usize) -> ImageData {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for _ in 0..width {
                pixels.push(1.0 - y as f32 / height.max(2).saturating_sub(1) as f32);
            }
        }
        ImageData::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_invalid_params_fail_before_any_work() {
        let mut params = small_params();
        params.iterations = 1;
        assert!(matches!(
            Renderer::new(params),
            Err(RenderError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_end_to_end_render() {
        let path = temp_wav("end_to_end");
        let image = gradient_image(8, 16);
        let renderer = Renderer::new(small_params()).unwrap();

        let summary = renderer
            .render(&image, &path, None, &CancelToken::new())
            .unwrap();

        assert_eq!(summary.frames, 8);
        assert_eq!(summary.bins, 513);
        assert_eq!(summary.channels, 1);
        // 8 frames -> 1024 + 7*256 samples
        assert_eq!(summary.output_samples, 1024 + 7 * 256);

        let mut reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.duration() as usize, summary.output_samples);
        let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        let peak = read.iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        // Normalized to -1 dBFS with no extra gain; limiter leaves it alone.
        assert!((peak - 10.0f32.powf(-1.0 / 20.0)).abs() < 1e-5, "peak {peak}");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_stereo_render_duplicates_channels() {
        let path = temp_wav("stereo");
        let image = gradient_image(4, 8);
        let mut params = small_params();
        params.stereo = true;
        let renderer = Renderer::new(params).unwrap();

        let summary = renderer
            .render(&image, &path, None, &CancelToken::new())
            .unwrap();
        assert_eq!(summary.channels, 2);
        assert_eq!(summary.output_samples, 2 * (1024 + 3 * 256));

        let mut reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        for pair in read.chunks(2) {
            assert_eq!(pair[0], pair[1]);
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_progress_is_monotone_and_reaches_one() {
        let path = temp_wav("progress");
        let image = gradient_image(4, 8);
        let renderer = Renderer::new(small_params()).unwrap();

        let mut seen: Vec<f32> = Vec::new();
        let mut progress = |p: f32| seen.push(p);
        renderer
            .render(&image, &path, Some(&mut progress), &CancelToken::new())
            .unwrap();

        assert!(seen.windows(2).all(|w| w[0] <= w[1] + 1e-6), "{seen:?}");
        assert!(seen.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert_eq!(*seen.last().unwrap(), 1.0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_pre_cancelled_render_writes_nothing() {
        let path = temp_wav("pre_cancelled");
        let image = gradient_image(4, 8);
        let renderer = Renderer::new(small_params()).unwrap();

        let token = CancelToken::new();
        token.cancel();
        let result = renderer.render(&image, &path, None, &token);
        assert!(matches!(result, Err(RenderError::Cancelled)));
        assert!(!path.exists());
    }

    #[test]
    fn test_cancel_during_iterations_aborts_before_write() {
        let path = temp_wav("mid_cancelled");
        let image = gradient_image(4, 8);
        let renderer = Renderer::new(small_params()).unwrap();

        let token = CancelToken::new();
        let trip = token.clone();
        let mut progress = move |p: f32| {
            if p >= 0.5 {
                trip.cancel();
            }
        };
        let result = renderer.render(&image, &path, Some(&mut progress), &token);
        assert!(matches!(result, Err(RenderError::Cancelled)));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_output_is_io_failure() {
        let image = gradient_image(4, 8);
        let renderer = Renderer::new(small_params()).unwrap();
        let result = renderer.render(
            &image,
            Path::new("/nonexistent-dir/out.wav"),
            None,
            &CancelToken::new(),
        );
        assert!(matches!(
            result,
            Err(RenderError::Wav(_)) | Err(RenderError::Io(_))
        ));
    }
}
