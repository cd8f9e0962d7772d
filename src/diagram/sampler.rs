use super::expr::{self, Expr};
use super::types::DomainWindow;

/// Sample count across the window; the curve evaluates at N+1 points.
pub const DEFAULT_SAMPLES: usize = 500;

/// Slack beyond the y-window, in domain units, before a sample is discarded.
/// Keeps steep-but-plausible values connected while dropping blowups near
/// asymptotes.
pub const WINDOW_MARGIN: f64 = 10.0;

fn sample_is_valid(y: f64, window: &DomainWindow) -> bool {
    y.is_finite() && y >= window.y_min - WINDOW_MARGIN && y <= window.y_max + WINDOW_MARGIN
}

/// Evaluate `expr` at N+1 uniform points and split at invalid samples.
/// Returns domain-space polylines; runs shorter than two points draw
/// nothing and are dropped.
pub fn sample_curve(expr: &Expr, window: &DomainWindow, samples: usize) -> Vec<Vec<(f64, f64)>> {
    let samples = samples.max(1);
    let step = (window.x_max - window.x_min) / samples as f64;

    let mut polylines = Vec::new();
    let mut run: Vec<(f64, f64)> = Vec::new();

    for i in 0..=samples {
        let x = window.x_min + step * i as f64;
        let y = expr.eval(x);
        if sample_is_valid(y, window) {
            run.push((x, y));
        } else if run.len() >= 2 {
            polylines.push(std::mem::take(&mut run));
        } else {
            run.clear();
        }
    }
    if run.len() >= 2 {
        polylines.push(run);
    }

    polylines
}

/// Parse-then-sample convenience; a source that fails to parse yields no
/// polylines, never an error.
pub fn sample_function(
    source: &str,
    window: &DomainWindow,
    samples: usize,
) -> Vec<Vec<(f64, f64)>> {
    match expr::parse(source) {
        Ok(expr) => sample_curve(&expr, window, samples),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reciprocal_splits_at_the_pole() {
        let window = DomainWindow::new(-2.0, 2.0, -10.0, 10.0);
        let polylines = sample_function("1/x", &window, DEFAULT_SAMPLES);
        assert!(polylines.len() >= 2, "got {} polylines", polylines.len());
        for polyline in &polylines {
            assert!(polyline.len() >= 2);
        }
    }

    #[test]
    fn test_smooth_curve_is_one_polyline() {
        let window = DomainWindow::new(-5.0, 5.0, -5.0, 30.0);
        let polylines = sample_function("x^2", &window, DEFAULT_SAMPLES);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), DEFAULT_SAMPLES + 1);
        assert_eq!(polylines[0][0], (-5.0, 25.0));
    }

    #[test]
    fn test_margin_extends_the_window() {
        // f(x) = x against y in [0, 1]: valid until y passes 1 + margin.
        let window = DomainWindow::new(0.0, 20.0, 0.0, 1.0);
        let polylines = sample_function("x", &window, 20);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), 12);
        assert_eq!(polylines[0].last().copied(), Some((11.0, 11.0)));
    }

    #[test]
    fn test_unparseable_source_yields_no_curve() {
        let window = DomainWindow::default();
        assert!(sample_function("x !== 0 ? 1 : 2", &window, 100).is_empty());
        assert!(sample_function("", &window, 100).is_empty());
    }

    #[test]
    fn test_single_valid_sample_is_dropped() {
        // Only x = 0 is in sqrt's domain at this sample spacing.
        let window = DomainWindow::new(-1.0, 1.0, -1.0, 1.0);
        let polylines = sample_function("sqrt(0.01 - x*x)", &window, 10);
        assert!(polylines.is_empty());
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let window = DomainWindow::new(-3.0, 3.0, -2.0, 2.0);
        let a = sample_function("Math.sin(x)", &window, DEFAULT_SAMPLES);
        let b = sample_function("Math.sin(x)", &window, DEFAULT_SAMPLES);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_bounded_curves_never_split(a in -100i32..100, b in -100i32..100) {
            let window = DomainWindow::new(-10.0, 10.0, -1.0e6, 1.0e6);
            let source = format!("{}*x^2 + {}", a, b);
            let polylines = sample_function(&source, &window, 100);
            prop_assert_eq!(polylines.len(), 1);
            prop_assert_eq!(polylines[0].len(), 101);
        }
    }
}
