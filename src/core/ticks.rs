use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fraction of the data span added above and below before placing ticks.
pub const TICK_PADDING_RATIO: f64 = 0.02;
/// Symmetric buffer applied to a flat series, as a fraction of its value.
pub const FLAT_BUFFER_RATIO: f64 = 0.1;

const MIN_LABEL_DECIMALS: usize = 2;
const MAX_LABEL_DECIMALS: usize = 6;
const MAX_LABEL_ATTEMPTS: usize = 10;
const NICE_EPSILON: f64 = 1e-9;

/// Evenly stepped ticks covering a padded value range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NiceTicks {
    pub ticks: Vec<f64>,
    pub step: f64,
    pub domain: (f64, f64),
}

/// Buffer used to widen a flat series around `value`.
#[must_use]
pub fn flat_buffer(value: f64) -> f64 {
    let buffer = value.abs() * FLAT_BUFFER_RATIO;
    if buffer > 0.0 { buffer } else { 1.0 }
}

/// Smallest step in `{1, 2, 5, 10} x 10^k` that is `>= span / target_count`.
#[must_use]
pub fn nice_step(span: f64, target_count: usize) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let rough = span / (target_count.max(1) as f64);
    let magnitude = 10_f64.powf(rough.log10().floor());
    let normalized = rough / magnitude;

    let multiplier = [1.0, 2.0, 5.0]
        .into_iter()
        .find(|candidate| normalized <= candidate * (1.0 + NICE_EPSILON))
        .unwrap_or(10.0);
    multiplier * magnitude
}

/// Ticks at multiples of a nice step inside the 2%-padded `[min, max]`.
///
/// A flat range is widened by [`flat_buffer`] first. When fewer than two
/// multiples fit, the ticks fall back to exactly `[min, max]`.
#[must_use]
pub fn compute_nice_ticks(min: f64, max: f64, target_count: usize) -> NiceTicks {
    let (min, max) = if min == max {
        let buffer = flat_buffer(min);
        (min - buffer, max + buffer)
    } else if min > max {
        (max, min)
    } else {
        (min, max)
    };

    let span = max - min;
    let padding = span * TICK_PADDING_RATIO;
    let padded_min = min - padding;
    let padded_max = max + padding;
    let step = nice_step(span, target_count);

    let first = (padded_min / step).ceil() as i64;
    let last = (padded_max / step).floor() as i64;
    let mut ticks: Vec<f64> = (first..=last)
        .map(|multiple| normalize_zero(multiple as f64 * step))
        .filter(|tick| *tick >= padded_min && *tick <= padded_max)
        .collect();

    if ticks.len() < 2 {
        ticks = vec![min, max];
    }

    NiceTicks {
        ticks,
        step,
        domain: (padded_min, padded_max),
    }
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Decimals needed to tell apart two values `step` apart.
#[must_use]
pub fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        return 0;
    }
    (-step.log10() - NICE_EPSILON).ceil().max(0.0) as usize
}

#[must_use]
pub fn format_price(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, normalize_zero(value))
}

/// Formats ticks with the fewest decimals that keep every label distinct.
///
/// Starts at two decimals; each collision halves the step used for the
/// precision estimate and adds at least one decimal, capped at six decimals
/// or ten attempts.
#[must_use]
pub fn format_tick_labels(ticks: &[f64], step: f64) -> Vec<String> {
    let mut effective_step = step;
    let mut decimals = decimals_for_step(step).clamp(MIN_LABEL_DECIMALS, MAX_LABEL_DECIMALS);
    let mut labels = format_all(ticks, decimals);

    for _ in 1..MAX_LABEL_ATTEMPTS {
        if labels_are_distinct(&labels) || decimals >= MAX_LABEL_DECIMALS {
            break;
        }
        effective_step /= 2.0;
        decimals = (decimals + 1)
            .max(decimals_for_step(effective_step))
            .min(MAX_LABEL_DECIMALS);
        labels = format_all(ticks, decimals);
    }

    labels
}

/// Ticks paired with their labels; `step` is the spacing between kept ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTicks {
    pub ticks: Vec<f64>,
    pub labels: Vec<String>,
    pub step: f64,
}

/// Labels `ticks`, dropping ticks until every label is distinct.
///
/// When labels still collide at the six-decimal cap, only every `stride`-th
/// tick is kept for growing strides, so spacing stays even at
/// `step * stride`. If no stride works the first tick is kept alone.
#[must_use]
pub fn label_ticks_distinct(ticks: &[f64], step: f64) -> LabeledTicks {
    let labels = format_tick_labels(ticks, step);
    if labels_are_distinct(&labels) {
        return LabeledTicks {
            ticks: ticks.to_vec(),
            labels,
            step,
        };
    }

    for stride in 2..ticks.len() {
        let thinned: Vec<f64> = ticks.iter().copied().step_by(stride).collect();
        if thinned.len() < 2 {
            break;
        }
        let thinned_step = step * stride as f64;
        let labels = format_tick_labels(&thinned, thinned_step);
        if labels_are_distinct(&labels) {
            debug!(
                original_count = ticks.len(),
                kept_count = thinned.len(),
                stride,
                "thinned price ticks to keep labels distinct"
            );
            return LabeledTicks {
                ticks: thinned,
                labels,
                step: thinned_step,
            };
        }
    }

    debug!(
        original_count = ticks.len(),
        "price tick labels collide at every stride, keeping first tick"
    );
    let first: Vec<f64> = ticks.first().copied().into_iter().collect();
    let labels = format_tick_labels(&first, step);
    LabeledTicks {
        ticks: first,
        labels,
        step,
    }
}

fn format_all(ticks: &[f64], decimals: usize) -> Vec<String> {
    ticks.iter().map(|tick| format_price(*tick, decimals)).collect()
}

#[must_use]
pub fn labels_are_distinct(labels: &[String]) -> bool {
    labels
        .iter()
        .enumerate()
        .all(|(index, label)| !labels[..index].contains(label))
}

/// Label for a flat series: the shortest round-trip text of the value.
#[must_use]
pub fn format_flat_label(value: f64) -> String {
    format!("{}", normalize_zero(value))
}
