use realfft::num_complex::Complex;

/// Frame-major magnitude spectrogram: `frames × bins` non-negative linear
/// magnitudes in one flat allocation.
#[derive(Debug, Clone)]
pub struct MagnitudeSpectrogram {
    frames: usize,
    bins: usize,
    data: Vec<f32>,
}

impl MagnitudeSpectrogram {
    pub fn zeroed(frames: usize, bins: usize) -> Self {
        Self {
            frames,
            bins,
            data: vec![0.0; frames * bins],
        }
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        self.bins
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    #[inline]
    pub fn frame(&self, t: usize) -> &[f32] {
        &self.data[t * self.bins..(t + 1) * self.bins]
    }

    #[inline]
    pub fn frame_mut(&mut self, t: usize) -> &mut [f32] {
        &mut self.data[t * self.bins..(t + 1) * self.bins]
    }

    pub fn max_magnitude(&self) -> f32 {
        self.data.iter().copied().fold(0.0f32, f32::max)
    }
}

/// Frame-major complex spectrogram with the same shape conventions.
///
/// DC and Nyquist bins are stored as complex for uniformity; the STFT
/// forces them real before any inverse transform.
#[derive(Debug, Clone)]
pub struct ComplexSpectrogram {
    frames: usize,
    bins: usize,
    data: Vec<Complex<f32>>,
}

impl ComplexSpectrogram {
    pub fn zeroed(frames: usize, bins: usize) -> Self {
        Self {
            frames,
            bins,
            data: vec![Complex::new(0.0, 0.0); frames * bins],
        }
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        self.bins
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    #[inline]
    pub fn frame(&self, t: usize) -> &[Complex<f32>] {
        &self.data[t * self.bins..(t + 1) * self.bins]
    }

    #[inline]
    pub fn frame_mut(&mut self, t: usize) -> &mut [Complex<f32>] {
        &mut self.data[t * self.bins..(t + 1) * self.bins]
    }
}
