//! Render a still image into audio whose spectrogram looks like the image.
//!
//! Each image column becomes one STFT frame, each row a frequency band, and
//! pixel brightness a magnitude in dB. Phases are recovered with Griffin-Lim,
//! the result is leveled, and the waveform is written out as a WAV file.

pub mod cancel;
pub mod error;
pub mod griffin_lim;
pub mod image_data;
pub mod leveling;
pub mod params;
pub mod pipeline;
pub mod spectrogram;
pub mod spectrogram_builder;
pub mod stft;
pub mod wav_writer;

pub use cancel::CancelToken;
pub use error::RenderError;
pub use griffin_lim::GriffinLim;
pub use image_data::ImageData;
pub use params::{BitDepth, FrequencyScale, RenderParams, SpectrogramParams};
pub use pipeline::{Renderer, RenderSummary};
pub use spectrogram::{ComplexSpectrogram, MagnitudeSpectrogram};
pub use spectrogram_builder::SpectrogramBuilder;
pub use stft::Stft;
pub use wav_writer::write_wav;
