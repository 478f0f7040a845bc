//! Grid generation.
//!
//! Axes are inclusive, evenly stepped ranges. The end point is included when it
//! lies on the step lattice up to a small tolerance, so `0..=0.25` in steps of
//! `0.005` has 51 points despite floating-point drift.

use crate::domain::{AxisRange, GridPoint};
use crate::error::ScanError;

/// Relative slack (in steps) when deciding whether the end point is on the lattice.
const END_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of grid points, per axis and in total.
pub const MAX_POINTS: usize = 10_000_000;

/// Values of one axis, `start, start + step, ..., <= stop`.
pub fn axis_values(axis: &'static str, range: &AxisRange) -> Result<Vec<f64>, ScanError> {
    let AxisRange { start, stop, step } = *range;
    if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
        return Err(invalid(axis, format!("bounds must be finite (start={start}, stop={stop}, step={step})")));
    }
    if step <= 0.0 {
        return Err(invalid(axis, format!("step must be > 0, got {step}")));
    }
    if stop < start {
        return Err(invalid(axis, format!("stop {stop} is below start {start}")));
    }

    let count = ((stop - start) / step + END_TOLERANCE).floor() + 1.0;
    if !count.is_finite() || count > MAX_POINTS as f64 {
        return Err(invalid(
            axis,
            format!("step {step} gives more than {MAX_POINTS} points between {start} and {stop}"),
        ));
    }
    let n = count as usize;
    Ok((0..n).map(|i| start + step * i as f64).collect())
}

/// All grid points, mass outer and splitting inner.
pub fn grid_points(mass: &AxisRange, delta: &AxisRange) -> Result<Vec<GridPoint>, ScanError> {
    let masses = axis_values("mass", mass)?;
    let deltas = axis_values("delta", delta)?;

    if masses.first().is_some_and(|m| *m <= 0.0) {
        return Err(invalid("mass", "masses must be positive".to_string()));
    }
    if deltas.first().is_some_and(|d| *d <= -1.0) {
        return Err(invalid("delta", "splitting must be > -1 so the partner mass stays positive".to_string()));
    }

    let total = masses
        .len()
        .checked_mul(deltas.len())
        .filter(|n| *n <= MAX_POINTS)
        .ok_or_else(|| {
            invalid(
                "grid",
                format!(
                    "{} masses x {} splittings exceeds {MAX_POINTS} points",
                    masses.len(),
                    deltas.len()
                ),
            )
        })?;

    let mut out = Vec::with_capacity(total);
    for &m in &masses {
        for &d in &deltas {
            out.push(GridPoint::new(m, d));
        }
    }
    Ok(out)
}

fn invalid(axis: &'static str, reason: String) -> ScanError {
    ScanError::InvalidRange { axis, reason }
}
