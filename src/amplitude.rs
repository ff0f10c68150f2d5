use crate::audio::FrequencySample;

pub const AMPLITUDE_FLOOR: f32 = 0.02;

/// Mean of the lowest quarter of the bins, normalized by 255.
///
/// `None` means the microphone is unavailable. Only the lower bound is
/// clamped: loud input may push the value past 1.0.
pub fn derive_amplitude(sample: Option<&FrequencySample>) -> f32 {
    let Some(sample) = sample else {
        return AMPLITUDE_FLOOR;
    };

    let low = &sample.bins()[..sample.len() / 4];
    if low.is_empty() {
        return AMPLITUDE_FLOOR;
    }

    let sum: u32 = low.iter().map(|&b| b as u32).sum();
    let mean = sum as f32 / low.len() as f32;
    (mean / 255.0).max(AMPLITUDE_FLOOR)
}
