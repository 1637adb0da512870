use crate::models::{AudioDimension, AudioVector};
use std::collections::HashSet;
use std::hash::Hash;

/// Lowest tempo (BPM) that maps to 0.0
const TEMPO_FLOOR_BPM: f64 = 60.0;
/// Tempo span (BPM) mapped onto [0, 1]
const TEMPO_SPAN_BPM: f64 = 140.0;
/// Loudness floor in dB; 0 dB maps to 1.0
const LOUDNESS_FLOOR_DB: f64 = -60.0;

/// Jaccard similarity of two sets
///
/// Returns 0.0 when both sets are empty, otherwise `|A ∩ B| / |A ∪ B|`.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}

/// Clamp into [0, 1]; NaN maps to 0.0
#[inline]
fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Map one raw audio attribute into [0, 1]
#[inline]
pub fn normalize_dimension(dimension: AudioDimension, raw: f64) -> f64 {
    match dimension {
        AudioDimension::Tempo => unit_clamp((raw - TEMPO_FLOOR_BPM) / TEMPO_SPAN_BPM),
        AudioDimension::Loudness => unit_clamp((raw - LOUDNESS_FLOOR_DB) / -LOUDNESS_FLOOR_DB),
        AudioDimension::Energy
        | AudioDimension::Valence
        | AudioDimension::Danceability
        | AudioDimension::Acousticness => unit_clamp(raw),
    }
}

/// Normalize every dimension of a raw audio vector
pub fn normalize_audio(raw: &AudioVector) -> AudioVector {
    let mut normalized = [0.0; 6];
    for (i, dimension) in AudioDimension::ALL.iter().enumerate() {
        normalized[i] = normalize_dimension(*dimension, raw[i]);
    }
    normalized
}

/// Audio affinity between two raw audio vectors
///
/// Euclidean distance in the normalized space, divided by the unit-hypercube
/// diagonal and inverted: identical vectors score 1.0.
pub fn audio_affinity(a: &AudioVector, b: &AudioVector) -> f64 {
    let a = normalize_audio(a);
    let b = normalize_audio(b);

    let distance = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();

    let max_distance = (AudioDimension::ALL.len() as f64).sqrt();

    unit_clamp(1.0 - distance / max_distance)
}
