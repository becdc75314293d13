use log::debug;

use crate::image_data::ImageData;
use crate::params::{FrequencyScale, SpectrogramParams};
use crate::spectrogram::MagnitudeSpectrogram;

/// Maps a grayscale image onto a magnitude spectrogram: one image column per
/// frame, image rows spread over frequency bins.
pub struct SpectrogramBuilder {
    params: SpectrogramParams,
}

impl SpectrogramBuilder {
    pub fn new(params: SpectrogramParams) -> Self {
        Self { params }
    }

    /// Build the `W × (fft_size/2 + 1)` magnitude spectrogram.
    pub fn build(&self, image: &ImageData) -> MagnitudeSpectrogram {
        let num_frames = image.width();
        let num_bins = self.params.num_bins();

        debug!(
            "SpectrogramBuilder: {}x{} image -> {} frames x {} bins ({:?} scale, min_db={}, gamma={})",
            image.width(),
            image.height(),
            num_frames,
            num_bins,
            self.params.freq_scale,
            self.params.min_db,
            self.params.gamma
        );

        let mut spectrogram = MagnitudeSpectrogram::zeroed(num_frames, num_bins);

        for t in 0..num_frames {
            let frame = spectrogram.frame_mut(t);
            for (k, out) in frame.iter_mut().enumerate() {
                let row = self.bin_to_row(k, num_bins, image.height());
                let pixel = image.sample_column(t, row);
                *out = self.pixel_to_magnitude(pixel);
            }
        }

        spectrogram
    }

    /// Image row (possibly fractional) read by bin `k`.
    ///
    /// Bin 0 (DC) reads the bottom of the image, the Nyquist bin the top.
    /// On the logarithmic axis, bins below `min_freq_hz` pile up at the
    /// bottom row and bins above `max_freq_hz` at the top.
    fn bin_to_row(&self, k: usize, num_bins: usize, height: usize) -> f32 {
        let span = (height - 1) as f32;
        match self.params.freq_scale {
            FrequencyScale::Linear => {
                let u = k as f32 / (num_bins - 1) as f32;
                span * (1.0 - u)
            }
            FrequencyScale::Logarithmic => {
                if k == 0 {
                    return span;
                }
                let bin_freq = k as f32 / (num_bins - 1) as f32 * self.params.nyquist_hz();
                let clamped = bin_freq.clamp(self.params.min_freq_hz, self.params.max_freq_hz);
                let u = (clamped / self.params.min_freq_hz).ln()
                    / (self.params.max_freq_hz / self.params.min_freq_hz).ln();
                span * (1.0 - u)
            }
        }
    }

    /// Gamma-shaped pixel intensity to linear magnitude: pixel 0 maps to
    /// `min_db`, pixel 1 to 0 dB.
    fn pixel_to_magnitude(&self, pixel: f32) -> f32 {
        let shaped = pixel.powf(self.params.gamma);
        let mag_db = self.params.min_db + shaped * (-self.params.min_db);
        10.0f32.powf(mag_db / 20.0)
    }
}
