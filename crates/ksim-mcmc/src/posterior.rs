use std::f64::consts::PI;

use ksim_core::errors::{ErrorInfo, SimError};

/// Largest number of points [`posterior_grid`] will materialize.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Unnormalized posterior `(ln(a) / (2 pi))^(n / 2) * a^(-S / 2)`.
///
/// `S` is the sum of squared data points and `n` their count. The prior is
/// zero for `a <= 1`, where the density is undefined and
/// [`SimError::DomainUndefined`] is returned.
pub fn unnormalized_posterior(
    a: f64,
    sum_of_squares: f64,
    sample_count: usize,
) -> Result<f64, SimError> {
    check_support(a)?;
    check_statistics(sum_of_squares)?;
    Ok((a.ln() / (2.0 * PI)).powf(sample_count as f64 / 2.0) * a.powf(-sum_of_squares / 2.0))
}

/// Natural logarithm of [`unnormalized_posterior`], finite wherever it is defined.
pub fn log_unnormalized_posterior(
    a: f64,
    sum_of_squares: f64,
    sample_count: usize,
) -> Result<f64, SimError> {
    check_support(a)?;
    check_statistics(sum_of_squares)?;
    let ln_a = a.ln();
    Ok(sample_count as f64 / 2.0 * (ln_a / (2.0 * PI)).ln() - sum_of_squares / 2.0 * ln_a)
}

/// Evaluates the unnormalized posterior for `data` at every grid point.
pub fn posterior_curve(a_values: &[f64], data: &[f64]) -> Result<Vec<f64>, SimError> {
    let sum_of_squares = sum_of_squares(data)?;
    a_values
        .iter()
        .map(|&a| unnormalized_posterior(a, sum_of_squares, data.len()))
        .collect()
}

/// Posterior on an ascending grid, scaled to unit trapezoidal area.
///
/// Normalization happens in log space so large datasets do not underflow.
pub fn normalized_posterior_curve(a_values: &[f64], data: &[f64]) -> Result<Vec<f64>, SimError> {
    if a_values.len() < 2 {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("grid-too-short", "normalization needs at least two grid points")
                .with_context("points", a_values.len()),
        ));
    }
    if let Some(index) = a_values.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("grid-not-ascending", "grid must be strictly increasing")
                .with_context("index", index + 1),
        ));
    }
    let sum_of_squares = sum_of_squares(data)?;
    let logs = a_values
        .iter()
        .map(|&a| log_unnormalized_posterior(a, sum_of_squares, data.len()))
        .collect::<Result<Vec<_>, _>>()?;
    let peak = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scaled: Vec<f64> = logs.iter().map(|log| (log - peak).exp()).collect();
    let area: f64 = a_values
        .windows(2)
        .zip(scaled.windows(2))
        .map(|(a, p)| (a[1] - a[0]) * (p[0] + p[1]) / 2.0)
        .sum();
    Ok(scaled.into_iter().map(|value| value / area).collect())
}

/// Half-open arithmetic grid `start, start + step, ...` strictly below `stop`.
pub fn posterior_grid(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, SimError> {
    if step <= 0.0 || !step.is_finite() || !start.is_finite() || !stop.is_finite() {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("grid-invalid", "grid bounds must be finite and step positive")
                .with_context("start", start)
                .with_context("stop", stop)
                .with_context("step", step),
        ));
    }
    let count = grid_point_count(start, stop, step);
    if count > MAX_GRID_POINTS as f64 {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("grid-too-large", "grid would exceed the point limit")
                .with_context("points", count)
                .with_context("max", MAX_GRID_POINTS),
        ));
    }
    Ok((0..count as usize).map(|index| start + index as f64 * step).collect())
}

/// Number of points in `[start, stop)` with spacing `step`, before any cast.
pub(crate) fn grid_point_count(start: f64, stop: f64, step: f64) -> f64 {
    ((stop - start) / step).ceil().max(0.0)
}

/// Sum of squared data points; rejects non-finite data.
pub(crate) fn sum_of_squares(data: &[f64]) -> Result<f64, SimError> {
    if let Some(index) = data.iter().position(|value| !value.is_finite()) {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("data-not-finite", "data points must be finite")
                .with_context("index", index)
                .with_context("value", data[index]),
        ));
    }
    Ok(data.iter().map(|x| x * x).sum())
}

fn check_support(a: f64) -> Result<(), SimError> {
    if a > 1.0 && a.is_finite() {
        Ok(())
    } else {
        Err(SimError::DomainUndefined(
            ErrorInfo::new("outside-prior-support", "posterior is undefined for a <= 1")
                .with_context("a", a),
        ))
    }
}

fn check_statistics(sum_of_squares: f64) -> Result<(), SimError> {
    if sum_of_squares >= 0.0 && sum_of_squares.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidArgument(
            ErrorInfo::new("sum-of-squares-invalid", "sum of squares must be finite and >= 0")
                .with_context("sum_of_squares", sum_of_squares),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_density_matches_density() {
        for &a in &[1.1, 2.0, std::f64::consts::E, 5.5] {
            let direct = unnormalized_posterior(a, 37.5, 40).unwrap();
            let logged = log_unnormalized_posterior(a, 37.5, 40).unwrap();
            assert!((direct.ln() - logged).abs() < 1e-9, "a = {a}");
        }
    }

    #[test]
    fn support_boundary_is_undefined() {
        for &a in &[1.0, 0.5, -3.0, f64::NAN, f64::INFINITY] {
            let err = unnormalized_posterior(a, 1.0, 1).unwrap_err();
            assert!(matches!(err, SimError::DomainUndefined(_)), "a = {a}");
        }
    }

    #[test]
    fn grid_matches_arange() {
        let grid = posterior_grid(1.5, 6.0, 0.01).unwrap();
        assert_eq!(grid.len(), 450);
        assert_eq!(grid[0], 1.5);
        assert!((grid[449] - 5.99).abs() < 1e-9);
        assert!(posterior_grid(2.0, 1.0, 0.5).unwrap().is_empty());
        assert!(posterior_grid(1.0, 2.0, 0.0).is_err());
        assert_eq!(
            posterior_grid(1.5, 6.0, 1.0e-300).unwrap_err().code(),
            "grid-too-large"
        );
    }
}
