//! Zero-phase application of FIR taps.

use crate::error::{Result, SpectralError};

use super::design::PAD_FACTOR;

/// Mirror-pad `data` by `pad` samples on both ends without repeating the
/// edge sample (`[1, 2, 3]` padded by 2 gives `[3, 2, 1, 2, 3, 2, 1]`).
///
/// Padding wider than the series keeps reflecting, so the extension is
/// periodic with period `2 * (len - 1)`.
pub fn reflect_pad(data: &[f64], pad: usize) -> Vec<f64> {
    let n = data.len();
    if n < 2 || pad == 0 {
        return data.to_vec();
    }
    let period = 2 * (n - 1) as i64;
    let reflect = |i: i64| -> f64 {
        let m = i.rem_euclid(period);
        let idx = if m >= n as i64 { period - m } else { m };
        data[idx as usize]
    };
    (-(pad as i64)..(n + pad) as i64).map(reflect).collect()
}

/// Point-symmetric extension about both end samples.
fn odd_extend(data: &[f64], n_ext: usize) -> Vec<f64> {
    let n = data.len();
    let first = data[0];
    let last = data[n - 1];

    let mut out = Vec::with_capacity(n + 2 * n_ext);
    out.extend((1..=n_ext).rev().map(|i| 2.0 * first - data[i]));
    out.extend_from_slice(data);
    out.extend((1..=n_ext).map(|i| 2.0 * last - data[n - 1 - i]));
    out
}

/// Steady-state delay-line state for a unit step through an FIR filter.
fn step_state(taps: &[f64]) -> Vec<f64> {
    let mut state = vec![0.0; taps.len() - 1];
    let mut acc = 0.0;
    for i in (0..state.len()).rev() {
        acc += taps[i + 1];
        state[i] = acc;
    }
    state
}

/// Direct-form II transposed FIR filter with initial delay-line state.
fn fir_filter(taps: &[f64], input: &[f64], mut state: Vec<f64>) -> Vec<f64> {
    let order = state.len();
    input
        .iter()
        .map(|&x| {
            let y = taps[0] * x + state.first().copied().unwrap_or(0.0);
            for i in 0..order {
                let next = if i + 1 < order { state[i + 1] } else { 0.0 };
                state[i] = taps[i + 1] * x + next;
            }
            y
        })
        .collect()
}

/// Forward-backward FIR filtering.
///
/// The input is odd-extended by `3 * taps.len()` samples and each pass starts
/// from the steady state of its first sample, so edges settle without a
/// transient. The result has zero phase shift and the input's length.
pub fn filtfilt(taps: &[f64], data: &[f64]) -> Result<Vec<f64>> {
    if taps.is_empty() {
        return Err(SpectralError::FilterDesign("no filter taps".to_string()));
    }
    let edge = PAD_FACTOR * taps.len();
    if data.len() <= edge {
        return Err(SpectralError::InsufficientData {
            needed: edge + 1,
            got: data.len(),
        });
    }

    let extended = odd_extend(data, edge);
    let zi = step_state(taps);

    let x0 = extended[0];
    let forward = fir_filter(taps, &extended, zi.iter().map(|z| z * x0).collect());

    let reversed: Vec<f64> = forward.into_iter().rev().collect();
    let y0 = reversed[0];
    let backward = fir_filter(taps, &reversed, zi.iter().map(|z| z * y0).collect());

    Ok(backward
        .into_iter()
        .rev()
        .skip(edge)
        .take(data.len())
        .collect())
}
