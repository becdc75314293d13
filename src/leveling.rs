//! Post-processing applied between reconstruction and WAV encoding:
//! DC removal, peak normalization, gain, a soft safety limiter, and
//! mono-to-stereo interleaving.

/// Peaks below this are treated as silence and left untouched.
const SILENCE_PEAK: f32 = 1e-8;

/// Default limiter knee threshold.
pub const LIMITER_THRESHOLD: f32 = 0.99;

/// Subtract the mean so the waveform is centered on zero.
pub fn remove_dc_offset(audio: &mut [f32]) {
    if audio.is_empty() {
        return;
    }
    let mean = audio.iter().sum::<f32>() / audio.len() as f32;
    for sample in audio.iter_mut() {
        *sample -= mean;
    }
}

/// Scale so the peak hits `target_dbfs`. Silent input is left untouched.
pub fn normalize(audio: &mut [f32], target_dbfs: f32) {
    let peak = audio.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak < SILENCE_PEAK {
        return;
    }
    let scale = 10.0f32.powf(target_dbfs / 20.0) / peak;
    for sample in audio.iter_mut() {
        *sample *= scale;
    }
}

/// Apply a linear gain given in dB.
pub fn apply_gain(audio: &mut [f32], gain_db: f32) {
    let gain = 10.0f32.powf(gain_db / 20.0);
    for sample in audio.iter_mut() {
        *sample *= gain;
    }
}

/// Soft-knee clip: identity up to `threshold`, then a tanh knee that
/// asymptotes at 1.0.
pub fn soft_clip(sample: f32, threshold: f32) -> f32 {
    if sample.abs() <= threshold {
        return sample;
    }
    let excess = sample.abs() - threshold;
    let clipped = threshold + (1.0 - threshold) * (excess / (1.0 - threshold)).tanh();
    clipped.copysign(sample)
}

/// Run every sample through the soft clipper.
pub fn apply_safety_limiter(audio: &mut [f32], threshold: f32) {
    for sample in audio.iter_mut() {
        *sample = soft_clip(*sample, threshold);
    }
}

/// Duplicate a mono signal into interleaved L/R.
pub fn mono_to_stereo(mono: &[f32]) -> Vec<f32> {
    let mut stereo = Vec::with_capacity(mono.len() * 2);
    for &sample in mono {
        stereo.push(sample);
        stereo.push(sample);
    }
    stereo
}
