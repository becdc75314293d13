use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use imagewave::{
    BitDepth, CancelToken, FrequencyScale, ImageData, RenderParams, Renderer, SpectrogramParams,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FreqScaleArg {
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BitDepthArg {
    Int16,
    Int24,
    Float32,
}

/// Render a still image into a WAV file whose spectrogram looks like it.
#[derive(Parser, Debug)]
#[command(name = "imagewave", version, about)]
struct Cli {
    /// Input image (any format the image crate decodes)
    image: PathBuf,

    /// Output WAV path
    #[arg(short, long)]
    output: PathBuf,

    /// FFT size: 1024, 2048 or 4096
    #[arg(long, default_value_t = 2048)]
    fft_size: usize,

    /// Hop as a divisor of the FFT size: 2, 4 or 8
    #[arg(long, default_value_t = 4)]
    hop_div: usize,

    /// Sample rate in Hz: 44100, 48000 or 96000
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// Frequency axis of the image
    #[arg(long, value_enum, default_value_t = FreqScaleArg::Linear)]
    freq_scale: FreqScaleArg,

    /// Lowest frequency on the image (log scale), Hz
    #[arg(long, default_value_t = 20.0)]
    min_freq: f32,

    /// Highest frequency on the image (log scale), Hz
    #[arg(long, default_value_t = 20000.0)]
    max_freq: f32,

    /// dB level of black pixels, in [-120, -20]
    #[arg(long, default_value_t = -80.0)]
    min_db: f32,

    /// Contrast exponent on pixel intensity, in [0.2, 4.0]
    #[arg(long, default_value_t = 1.0)]
    gamma: f32,

    /// Griffin-Lim iterations, in [16, 256]
    #[arg(long, default_value_t = 64)]
    iterations: usize,

    /// Peak normalization target in dBFS, in [-6, 0]
    #[arg(long, default_value_t = -1.0)]
    normalize: f32,

    /// Output gain in dB, in [-24, 12]
    #[arg(long, default_value_t = 0.0)]
    gain: f32,

    /// Disable the soft safety limiter
    #[arg(long)]
    no_limiter: bool,

    /// Write stereo (duplicated L/R) instead of mono
    #[arg(long)]
    stereo: bool,

    /// Output sample format
    #[arg(long, value_enum, default_value_t = BitDepthArg::Int16)]
    bit_depth: BitDepthArg,

    /// Fix the Griffin-Lim phase seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn render_params(&self) -> RenderParams {
        RenderParams {
            spectrogram: SpectrogramParams {
                fft_size: self.fft_size,
                hop_size: if self.hop_div > 0 {
                    self.fft_size / self.hop_div
                } else {
                    0
                },
                sample_rate: self.sample_rate,
                freq_scale: match self.freq_scale {
                    FreqScaleArg::Linear => FrequencyScale::Linear,
                    FreqScaleArg::Log => FrequencyScale::Logarithmic,
                },
                min_freq_hz: self.min_freq,
                max_freq_hz: self.max_freq,
                min_db: self.min_db,
                gamma: self.gamma,
            },
            iterations: self.iterations,
            normalize_target_dbfs: self.normalize,
            output_gain_db: self.gain,
            use_limiter: !self.no_limiter,
            stereo: self.stereo,
            bit_depth: match self.bit_depth {
                BitDepthArg::Int16 => BitDepth::Int16,
                BitDepthArg::Int24 => BitDepth::Int24,
                BitDepthArg::Float32 => BitDepth::Float32,
            },
            seed: self.seed,
        }
    }
}

fn load_grayscale(path: &PathBuf) -> Result<ImageData> {
    let decoded = image::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .to_luma8();
    let (width, height) = decoded.dimensions();
    let pixels: Vec<f32> = decoded.as_raw().iter().map(|&p| p as f32 / 255.0).collect();
    ImageData::new(width as usize, height as usize, pixels)
        .context("decoded image is not a usable grayscale buffer")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let image = load_grayscale(&cli.image)?;
    println!(
        "Loaded {} ({}x{})",
        cli.image.display(),
        image.width(),
        image.height()
    );

    let renderer = Renderer::new(cli.render_params()).context("invalid parameters")?;
    let token = CancelToken::new();

    let mut last_decile = 0u32;
    let mut progress = |p: f32| {
        let decile = (p * 10.0) as u32;
        if decile > last_decile {
            last_decile = decile;
            println!("  {}%", decile * 10);
        }
    };

    match renderer.render(&image, &cli.output, Some(&mut progress), &token) {
        Ok(summary) => {
            println!(
                "Wrote {} ({:.2} s, {} ch, {} frames x {} bins)",
                cli.output.display(),
                summary.duration_seconds,
                summary.channels,
                summary.frames,
                summary.bins
            );
            Ok(())
        }
        Err(err) if err.is_cancelled() => {
            println!("Render cancelled");
            Ok(())
        }
        Err(err) => Err(err).context("render failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_produce_valid_params() {
        let cli = Cli::parse_from(["imagewave", "in.png", "-o", "out.wav"]);
        assert!(cli.render_params().validate().is_ok());
    }

    #[test]
    fn test_hop_div_maps_to_hop_size() {
        let cli = Cli::parse_from([
            "imagewave", "in.png", "-o", "out.wav", "--fft-size", "1024", "--hop-div", "8",
        ]);
        assert_eq!(cli.render_params().spectrogram.hop_size, 128);
    }

    #[test]
    fn test_bad_hop_div_is_rejected_by_validation() {
        let cli = Cli::parse_from(["imagewave", "in.png", "-o", "out.wav", "--hop-div", "3"]);
        assert!(cli.render_params().validate().is_err());
    }
}
