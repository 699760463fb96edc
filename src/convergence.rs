//! # Convergence reporting
//!
//! Tracks how the running impact-probability estimate `p̂ₖ = hitsₖ / k` settles as trials
//! accumulate.
//!
//! Rule
//! -----------------
//! With a window of `W` trials and a tolerance `tol`, the run is **converged** at the first
//! anchor trial `t` such that the `W` running estimates `p̂ₜ, …, p̂ₜ₊W₋₁` all stay within
//! `tol` of `p̂ₜ`. The anchor `t` is reported as the *convergence trial*; the verdict itself
//! can only be reached once trial `t + W − 1` has run, so no run converges before `W` trials.
//!
//! Components
//! -----------------
//! * [`ConvergenceTracker`] – incremental form used inside the trial loop. It keeps a fixed
//!   ring of the last `W` estimates plus monotonic max/min queues, so each update is O(1)
//!   amortized and memory is bounded by the window.
//! * [`check`] – the same rule evaluated over a complete sequence of running estimates.
//! * [`ConvergenceCurve`] – running estimate sampled at chosen trial counts, with the
//!   distance of each point from the final estimate.
use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::Probability;

/// Outcome of a convergence check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceVerdict {
    pub converged: bool,
    /// 1-based anchor trial after which the estimate stayed within tolerance.
    pub convergence_trial: Option<usize>,
    /// 1-based trial at which the verdict was reached (`convergence_trial + W − 1`).
    pub declared_at: Option<usize>,
}

impl ConvergenceVerdict {
    fn at(anchor: usize, window: usize) -> Self {
        ConvergenceVerdict {
            converged: true,
            convergence_trial: Some(anchor),
            declared_at: Some(anchor + window - 1),
        }
    }
}

/// Evaluate the convergence rule over a full sequence of running estimates.
///
/// Arguments
/// -----------------
/// * `estimates`: `estimates[i]` is the running estimate after trial `i + 1`.
/// * `window`: Number of consecutive estimates that must stay within tolerance (`>= 1`).
/// * `tolerance`: Maximum allowed drift from the anchor estimate.
///
/// Return
/// ----------
/// * The verdict for the first qualifying anchor, or an unconverged verdict when none
///   exists (including when `window == 0` or the sequence is shorter than the window).
pub fn check(estimates: &[Probability], window: usize, tolerance: f64) -> ConvergenceVerdict {
    if window == 0 {
        return ConvergenceVerdict::default();
    }
    let mut tracker = ConvergenceTracker::new(window, tolerance);
    estimates
        .iter()
        .find_map(|&p| tracker.observe(p))
        .unwrap_or_default()
}

/// Incremental convergence detector over a bounded trailing window.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    window: usize,
    tolerance: f64,
    trials: usize,
    ring: VecDeque<Probability>,
    // (trial, estimate) pairs, decreasing / increasing in estimate
    max_queue: VecDeque<(usize, Probability)>,
    min_queue: VecDeque<(usize, Probability)>,
    verdict: Option<ConvergenceVerdict>,
}

impl ConvergenceTracker {
    /// Create a tracker; a `window` of 0 is treated as 1.
    pub fn new(window: usize, tolerance: f64) -> Self {
        let window = window.max(1);
        ConvergenceTracker {
            window,
            tolerance,
            trials: 0,
            ring: VecDeque::with_capacity(window),
            max_queue: VecDeque::new(),
            min_queue: VecDeque::new(),
            verdict: None,
        }
    }

    /// Feed the running estimate of the next trial.
    ///
    /// Return
    /// ----------
    /// * `Some(verdict)` on the trial where convergence is first declared, `None` otherwise.
    ///   Once declared, the verdict is latched and later calls return `None`.
    pub fn observe(&mut self, estimate: Probability) -> Option<ConvergenceVerdict> {
        self.trials += 1;
        let trial = self.trials;

        if self.verdict.is_some() {
            return None;
        }

        if self.ring.len() == self.window {
            self.ring.pop_front();
        }
        self.ring.push_back(estimate);

        while matches!(self.max_queue.back(), Some(&(_, v)) if v <= estimate) {
            self.max_queue.pop_back();
        }
        self.max_queue.push_back((trial, estimate));
        while matches!(self.min_queue.back(), Some(&(_, v)) if v >= estimate) {
            self.min_queue.pop_back();
        }
        self.min_queue.push_back((trial, estimate));

        if self.ring.len() < self.window {
            return None;
        }

        let anchor_trial = trial + 1 - self.window;
        while matches!(self.max_queue.front(), Some(&(t, _)) if t < anchor_trial) {
            self.max_queue.pop_front();
        }
        while matches!(self.min_queue.front(), Some(&(t, _)) if t < anchor_trial) {
            self.min_queue.pop_front();
        }

        let anchor = self.ring[0];
        let max = self.max_queue.front().map_or(anchor, |&(_, v)| v);
        let min = self.min_queue.front().map_or(anchor, |&(_, v)| v);

        if max - anchor <= self.tolerance && anchor - min <= self.tolerance {
            let verdict = ConvergenceVerdict::at(anchor_trial, self.window);
            self.verdict = Some(verdict);
            return Some(verdict);
        }
        None
    }

    pub fn is_converged(&self) -> bool {
        self.verdict.is_some()
    }

    /// Final verdict: the latched declaration, or unconverged.
    pub fn verdict(&self) -> ConvergenceVerdict {
        self.verdict.unwrap_or_default()
    }

    pub fn trials_observed(&self) -> usize {
        self.trials
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

/// One sample of the convergence curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub trials: usize,
    pub probability: Probability,
    /// `|p̂ − p̂_final| / p̂_final × 100`, undefined when the final estimate is 0.
    pub percent_diff_from_final: Option<f64>,
}

/// Running estimate sampled at increasing trial counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceCurve {
    pub points: Vec<CurvePoint>,
}

impl ConvergenceCurve {
    pub(crate) fn record(&mut self, trials: usize, probability: Probability) {
        if self.points.last().is_some_and(|p| p.trials >= trials) {
            return;
        }
        self.points.push(CurvePoint {
            trials,
            probability,
            percent_diff_from_final: None,
        });
    }

    /// Close the curve with the final estimate and fill in the percent differences.
    pub(crate) fn finish(&mut self, trials: usize, final_probability: Probability) {
        self.record(trials, final_probability);
        for point in &mut self.points {
            point.percent_diff_from_final = (final_probability > 0.0).then(|| {
                ((point.probability - final_probability) / final_probability * 100.0).abs()
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

impl fmt::Display for ConvergenceCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10}  {:>14}  {:>12}", "n_trials", "probability", "|%diff|")?;
        for p in &self.points {
            match p.percent_diff_from_final {
                Some(d) => writeln!(f, "{:>10}  {:>14.6e}  {:>11.3}%", p.trials, p.probability, d)?,
                None => writeln!(f, "{:>10}  {:>14.6e}  {:>12}", p.trials, p.probability, "n/a")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quadratic reference: first anchor whose next `window` estimates stay in tolerance.
    fn brute_force(estimates: &[f64], window: usize, tol: f64) -> Option<usize> {
        (0..estimates.len())
            .filter(|&t| t + window <= estimates.len())
            .find(|&t| {
                estimates[t..t + window]
                    .iter()
                    .all(|p| (p - estimates[t]).abs() <= tol)
            })
            .map(|t| t + 1)
    }

    #[test]
    fn constant_sequence_converges_after_one_window() {
        let estimates = vec![0.0; 50];
        let verdict = check(&estimates, 10, 1e-4);
        assert!(verdict.converged);
        assert_eq!(verdict.convergence_trial, Some(1));
        assert_eq!(verdict.declared_at, Some(10));
    }

    #[test]
    fn never_before_a_full_window() {
        let estimates = vec![0.5; 9];
        assert_eq!(check(&estimates, 10, 1.0), ConvergenceVerdict::default());
    }

    #[test]
    fn drifting_sequence_does_not_converge() {
        let estimates: Vec<f64> = (0..200).map(|i| i as f64 * 0.01).collect();
        let verdict = check(&estimates, 5, 0.02);
        assert!(!verdict.converged);
        assert_eq!(verdict.convergence_trial, None);
    }

    #[test]
    fn anchor_is_first_stable_trial() {
        // Noisy start then settles on 0.25.
        let mut estimates = vec![1.0, 0.5, 0.333, 0.5, 0.4, 0.333];
        estimates.extend(std::iter::repeat(0.25).take(20));
        let verdict = check(&estimates, 4, 1e-9);
        assert_eq!(verdict.convergence_trial, Some(7));
        assert_eq!(verdict.declared_at, Some(10));
    }

    #[test]
    fn incremental_tracker_matches_brute_force() {
        // Running estimate of a deterministic pseudo-random hit pattern.
        let mut hits = 0_u64;
        let estimates: Vec<f64> = (1..=5_000_u64)
            .map(|k| {
                if (k * 2_654_435_761) % 97 < 13 {
                    hits += 1;
                }
                hits as f64 / k as f64
            })
            .collect();

        for &(window, tol) in &[(10, 1e-2), (100, 1e-3), (250, 5e-4), (1, 0.0)] {
            assert_eq!(
                check(&estimates, window, tol).convergence_trial,
                brute_force(&estimates, window, tol),
                "window={window}, tol={tol}"
            );
        }
    }

    #[test]
    fn tracker_latches_first_declaration() {
        let mut tracker = ConvergenceTracker::new(3, 0.0);
        assert!(tracker.observe(0.1).is_none());
        assert!(tracker.observe(0.1).is_none());
        assert!(tracker.observe(0.1).is_some());
        assert!(tracker.observe(0.9).is_none());
        assert_eq!(tracker.verdict().convergence_trial, Some(1));
        assert_eq!(tracker.trials_observed(), 4);
    }

    #[test]
    fn curve_reports_percent_difference() {
        let mut curve = ConvergenceCurve::default();
        curve.record(10, 0.2);
        curve.record(100, 0.11);
        curve.finish(1_000, 0.1);

        assert_eq!(curve.len(), 3);
        let diffs: Vec<f64> = curve
            .points
            .iter()
            .map(|p| p.percent_diff_from_final.unwrap())
            .collect();
        approx::assert_relative_eq!(diffs[0], 100.0, epsilon = 1e-9);
        approx::assert_relative_eq!(diffs[1], 10.0, epsilon = 1e-9);
        assert_eq!(diffs[2], 0.0);
    }

    #[test]
    fn curve_with_zero_final_has_no_percentages() {
        let mut curve = ConvergenceCurve::default();
        curve.record(100, 0.0);
        curve.finish(100, 0.0);
        assert_eq!(curve.len(), 1);
        assert!(curve.points[0].percent_diff_from_final.is_none());
        assert!(format!("{curve}").contains("n/a"));
    }
}
