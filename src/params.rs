use crate::error::RenderError;

/// How image rows are spread across frequency bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyScale {
    Linear,
    Logarithmic,
}

/// Output sample format of the WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Int16,
    Int24,
    Float32,
}

/// Parameters for the image → magnitude spectrogram mapping and the STFT.
#[derive(Debug, Clone)]
pub struct SpectrogramParams {
    pub fft_size: usize,
    pub hop_size: usize,
    pub sample_rate: u32,
    pub freq_scale: FrequencyScale,
    /// Lowest frequency represented on the image, in Hz (log scale only).
    pub min_freq_hz: f32,
    /// Highest frequency represented on the image, in Hz (log scale only).
    pub max_freq_hz: f32,
    /// Black pixels map to this level, white pixels to 0 dB.
    pub min_db: f32,
    /// Contrast exponent applied to pixel intensity before the dB mapping.
    pub gamma: f32,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: 512,
            sample_rate: 44100,
            freq_scale: FrequencyScale::Linear,
            min_freq_hz: 20.0,
            max_freq_hz: 20000.0,
            min_db: -80.0,
            gamma: 1.0,
        }
    }
}

impl SpectrogramParams {
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    pub fn nyquist_hz(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }

    /// Range-check every field. Fails fast with the offending field named.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !matches!(self.fft_size, 1024 | 2048 | 4096) {
            return Err(invalid(format!(
                "fft_size must be 1024, 2048 or 4096, got {}",
                self.fft_size
            )));
        }
        let valid_hop = self.hop_size == self.fft_size / 2
            || self.hop_size == self.fft_size / 4
            || self.hop_size == self.fft_size / 8;
        if !valid_hop {
            return Err(invalid(format!(
                "hop_size must be fft_size/2, /4 or /8, got {} for fft_size {}",
                self.hop_size, self.fft_size
            )));
        }
        if !matches!(self.sample_rate, 44100 | 48000 | 96000) {
            return Err(invalid(format!(
                "sample_rate must be 44100, 48000 or 96000, got {}",
                self.sample_rate
            )));
        }
        if !(self.min_freq_hz > 0.0) {
            return Err(invalid(format!(
                "min_freq_hz must be positive, got {}",
                self.min_freq_hz
            )));
        }
        if !(self.min_freq_hz < self.max_freq_hz && self.max_freq_hz <= self.nyquist_hz()) {
            return Err(invalid(format!(
                "frequency range {}..{} Hz must be increasing and at most Nyquist ({} Hz)",
                self.min_freq_hz,
                self.max_freq_hz,
                self.nyquist_hz()
            )));
        }
        if !(-120.0..=-20.0).contains(&self.min_db) {
            return Err(invalid(format!(
                "min_db must be in [-120, -20], got {}",
                self.min_db
            )));
        }
        if !(0.2..=4.0).contains(&self.gamma) {
            return Err(invalid(format!("gamma must be in [0.2, 4.0], got {}", self.gamma)));
        }
        Ok(())
    }
}

/// The full parameter surface of one render.
#[derive(Debug, Clone)]
pub struct RenderParams {
    pub spectrogram: SpectrogramParams,
    pub iterations: usize,
    pub normalize_target_dbfs: f32,
    pub output_gain_db: f32,
    pub use_limiter: bool,
    pub stereo: bool,
    pub bit_depth: BitDepth,
    /// Fixed Griffin-Lim phase seed. `None` draws fresh entropy per render.
    pub seed: Option<u64>,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            spectrogram: SpectrogramParams::default(),
            iterations: 64,
            normalize_target_dbfs: -1.0,
            output_gain_db: 0.0,
            use_limiter: true,
            stereo: false,
            bit_depth: BitDepth::Int16,
            seed: None,
        }
    }
}

impl RenderParams {
    pub fn validate(&self) -> Result<(), RenderError> {
        self.spectrogram.validate()?;
        if !(16..=256).contains(&self.iterations) {
            return Err(invalid(format!(
                "iterations must be in [16, 256], got {}",
                self.iterations
            )));
        }
        if !(-6.0..=0.0).contains(&self.normalize_target_dbfs) {
            return Err(invalid(format!(
                "normalize_target_dbfs must be in [-6, 0], got {}",
                self.normalize_target_dbfs
            )));
        }
        if !(-24.0..=12.0).contains(&self.output_gain_db) {
            return Err(invalid(format!(
                "output_gain_db must be in [-24, 12], got {}",
                self.output_gain_db
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> RenderError {
    RenderError::InvalidParameter(msg)
}
