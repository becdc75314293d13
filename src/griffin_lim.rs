use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use realfft::num_complex::Complex;

use crate::cancel::CancelToken;
use crate::error::RenderError;
use crate::spectrogram::{ComplexSpectrogram, MagnitudeSpectrogram};
use crate::stft::Stft;

/// Progress callback: (iterations completed, iterations total).
pub type ProgressFn<'a> = dyn FnMut(usize, usize) + 'a;

/// Griffin-Lim magnitude-only phase reconstruction.
///
/// Alternates inverse and forward STFTs, keeping the target magnitudes and
/// adopting the phases of the re-analysis. Each round is a non-increasing
/// projection in magnitude distance.
pub struct GriffinLim {
    iterations: usize,
    seed: Option<u64>,
}

impl GriffinLim {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            seed: None,
        }
    }

    /// Fix the phase-initialization seed so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reconstruct a time-domain signal whose STFT magnitude approximates
    /// `magnitude`. Checks `cancel` at iteration boundaries and returns the
    /// best-effort signal from the rounds completed so far.
    pub fn reconstruct(
        &self,
        magnitude: &MagnitudeSpectrogram,
        stft: &Stft,
        mut on_progress: Option<&mut ProgressFn<'_>>,
        cancel: &CancelToken,
    ) -> Result<Vec<f32>, RenderError> {
        if magnitude.is_empty() {
            warn!("GriffinLim: empty magnitude spectrogram");
            return Ok(Vec::new());
        }

        let num_frames = magnitude.num_frames();
        let num_bins = magnitude.num_bins();

        info!(
            "GriffinLim: {} frames x {} bins, {} iterations",
            num_frames, num_bins, self.iterations
        );

        let mut spectrogram = self.random_phase_init(magnitude);

        for iter in 0..self.iterations {
            if cancel.is_cancelled() {
                info!("GriffinLim: cancelled at iteration {iter}");
                break;
            }

            let signal = stft.inverse(&spectrogram)?;
            let reanalysis = stft.forward(&signal)?;

            // Keep the target magnitude, adopt the new phase. Frames or bins
            // the re-analysis came up short on are left unchanged.
            let frames = num_frames.min(reanalysis.num_frames());
            for t in 0..frames {
                let new_frame = reanalysis.frame(t);
                let out = spectrogram.frame_mut(t);
                let mag = magnitude.frame(t);
                let bins = num_bins.min(new_frame.len());
                for k in 0..bins {
                    out[k] = Complex::from_polar(mag[k], new_frame[k].arg());
                }
            }

            if let Some(progress) = on_progress.as_deref_mut() {
                progress(iter + 1, self.iterations);
            }
            if (iter + 1) % 10 == 0 || iter + 1 == self.iterations {
                debug!("GriffinLim: iteration {}/{}", iter + 1, self.iterations);
            }
        }

        let signal = stft.inverse(&spectrogram)?;
        info!("GriffinLim: reconstructed {} samples", signal.len());
        Ok(signal)
    }

    /// Target magnitudes with uniformly random phase on [0, 2π).
    fn random_phase_init(&self, magnitude: &MagnitudeSpectrogram) -> ComplexSpectrogram {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut spectrogram =
            ComplexSpectrogram::zeroed(magnitude.num_frames(), magnitude.num_bins());
        for t in 0..magnitude.num_frames() {
            let mag = magnitude.frame(t);
            for (k, out) in spectrogram.frame_mut(t).iter_mut().enumerate() {
                let phase = rng.random_range(0.0..std::f32::consts::TAU);
                *out = Complex::from_polar(mag[k], phase);
            }
        }
        spectrogram
    }
}
