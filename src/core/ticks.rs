use serde::{Deserialize, Serialize};

use crate::core::DatumValue;

/// Default tick count requested from continuous scales.
pub const DEFAULT_TICK_COUNT: usize = 10;

/// Explicit tick selection for axes and grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TicksSpec {
    Count(usize),
    Values(Vec<DatumValue>),
}

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = 1.414_213_562_373_095_1; // sqrt(2)

/// Signed tick increment: positive values are steps, negative values are
/// inverse steps (`-10` means `0.1`), which keeps decimal ticks exact.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Evenly spaced, human-friendly ticks covering `[start, stop]`.
#[must_use]
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (low, high) = if reverse { (stop, start) } else { (start, stop) };
    let increment = tick_increment(low, high, count);
    if increment == 0.0 || !increment.is_finite() {
        return Vec::new();
    }

    let mut ticks = Vec::new();
    if increment > 0.0 {
        let first = (low / increment).ceil();
        let last = (high / increment).floor();
        let mut i = first;
        while i <= last {
            ticks.push(i * increment);
            i += 1.0;
        }
    } else {
        let inverse = -increment;
        let first = (low * inverse).ceil();
        let last = (high * inverse).floor();
        let mut i = first;
        while i <= last {
            ticks.push(i / inverse);
            i += 1.0;
        }
    }

    if reverse {
        ticks.reverse();
    }
    ticks
}

/// Extends `[start, stop]` outward to whole tick increments.
#[must_use]
pub fn nice_domain(start: f64, stop: f64, count: usize) -> (f64, f64) {
    if !start.is_finite() || !stop.is_finite() || start == stop {
        return (start, stop);
    }

    let (mut low, mut high) = if start <= stop {
        (start, stop)
    } else {
        (stop, start)
    };
    let mut previous = 0.0;
    // Converges within a couple of passes; the cap guards pathological inputs.
    for _ in 0..10 {
        let step = tick_increment(low, high, count);
        if step == previous || step == 0.0 || !step.is_finite() {
            break;
        }
        if step > 0.0 {
            low = (low / step).floor() * step;
            high = (high / step).ceil() * step;
        } else {
            low = (low * -step).floor() / -step;
            high = (high * -step).ceil() / -step;
        }
        previous = step;
    }

    if start <= stop {
        (low, high)
    } else {
        (high, low)
    }
}
