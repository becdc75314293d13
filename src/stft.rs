use std::f32::consts::PI;
use std::sync::Arc;

use log::{debug, warn};
use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use crate::error::RenderError;
use crate::spectrogram::ComplexSpectrogram;

/// Positions with less accumulated window energy than this are left as-is
/// during overlap-add normalization instead of being divided.
const WINDOW_SUM_FLOOR: f32 = 1e-8;

/// Short-Time Fourier Transform with Hann windowing and weighted
/// overlap-add reconstruction.
///
/// Both FFT plans and the window are built once; `forward` and `inverse`
/// only allocate their output.
pub struct Stft {
    fft_size: usize,
    hop_size: usize,
    fft: Arc<dyn RealToComplex<f32>>,
    ifft: Arc<dyn ComplexToReal<f32>>,
    window: Vec<f32>,
}

impl Stft {
    /// `fft_size` must be a power of two and `hop_size` must divide it.
    pub fn new(fft_size: usize, hop_size: usize) -> Result<Self, RenderError> {
        if !fft_size.is_power_of_two() {
            return Err(RenderError::InvalidParameter(format!(
                "fft_size must be a power of two, got {fft_size}"
            )));
        }
        if hop_size == 0 || fft_size % hop_size != 0 {
            return Err(RenderError::InvalidParameter(format!(
                "hop_size must divide fft_size, got {hop_size} for fft_size {fft_size}"
            )));
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let ifft = planner.plan_fft_inverse(fft_size);

        // Periodic Hann: exact COLA for hops of fft_size/2 and below.
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / fft_size as f32).cos()))
            .collect();

        debug!("Stft: fft_size={fft_size}, hop_size={hop_size}");

        Ok(Self {
            fft_size,
            hop_size,
            fft,
            ifft,
            window,
        })
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    #[inline]
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Number of analysis frames for a signal of `num_samples`.
    pub fn num_frames(&self, num_samples: usize) -> usize {
        if num_samples < self.fft_size {
            0
        } else {
            1 + (num_samples - self.fft_size) / self.hop_size
        }
    }

    /// Windowed forward transform: signal → complex spectrogram.
    pub fn forward(&self, signal: &[f32]) -> Result<ComplexSpectrogram, RenderError> {
        let num_frames = self.num_frames(signal.len());
        let num_bins = self.num_bins();
        let mut spectrogram = ComplexSpectrogram::zeroed(num_frames, num_bins);

        let mut frame = vec![0.0f32; self.fft_size];
        let mut spectrum = self.fft.make_output_vec();

        for t in 0..num_frames {
            let start = t * self.hop_size;

            // Window the frame, zero-padding past the end of the signal.
            for i in 0..self.fft_size {
                let idx = start + i;
                frame[i] = if idx < signal.len() {
                    signal[idx] * self.window[i]
                } else {
                    0.0
                };
            }

            self.fft
                .process(&mut frame, &mut spectrum)
                .map_err(|e| RenderError::BackendFailure(e.to_string()))?;

            spectrogram.frame_mut(t).copy_from_slice(&spectrum);
        }

        debug!(
            "Stft::forward: {} samples -> {} frames x {} bins",
            signal.len(),
            num_frames,
            num_bins
        );

        Ok(spectrogram)
    }

    /// Weighted overlap-add inverse: complex spectrogram → signal.
    ///
    /// Each frame is inverse-transformed, scaled by `1/fft_size` (realfft
    /// leaves the inverse unscaled), windowed and accumulated; the result is
    /// divided by the accumulated window-squared sum. Where the Hann COLA
    /// condition holds the division is exact; at the boundaries it degrades
    /// gracefully.
    pub fn inverse(&self, spectrogram: &ComplexSpectrogram) -> Result<Vec<f32>, RenderError> {
        if spectrogram.is_empty() {
            warn!("Stft::inverse: empty spectrogram");
            return Ok(Vec::new());
        }

        let num_frames = spectrogram.num_frames();
        let num_bins = self.num_bins();
        let output_len = self.fft_size + (num_frames - 1) * self.hop_size;

        let mut output = vec![0.0f32; output_len];
        let mut window_sum = vec![0.0f32; output_len];

        let mut spectrum = self.ifft.make_input_vec();
        let mut frame = self.ifft.make_output_vec();
        let scale = 1.0 / self.fft_size as f32;

        for t in 0..num_frames {
            let src = spectrogram.frame(t);
            let n = src.len().min(spectrum.len());
            spectrum[..n].copy_from_slice(&src[..n]);
            for s in spectrum[n..].iter_mut() {
                *s = Complex::new(0.0, 0.0);
            }

            // DC and Nyquist must be purely real going into a c2r transform.
            spectrum[0] = Complex::new(spectrum[0].re, 0.0);
            spectrum[num_bins - 1] = Complex::new(spectrum[num_bins - 1].re, 0.0);

            self.ifft
                .process(&mut spectrum, &mut frame)
                .map_err(|e| RenderError::BackendFailure(e.to_string()))?;

            let start = t * self.hop_size;
            for i in 0..self.fft_size {
                let idx = start + i;
                output[idx] += frame[i] * scale * self.window[i];
                window_sum[idx] += self.window[i] * self.window[i];
            }
        }

        for i in 0..output_len {
            if window_sum[i] > WINDOW_SUM_FLOOR {
                output[i] /= window_sum[i];
            }
        }

        debug!(
            "Stft::inverse: {} frames -> {} samples",
            num_frames, output_len
        );

        Ok(output)
    }
}
