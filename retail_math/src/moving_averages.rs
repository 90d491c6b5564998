//! Trailing window statistics over a single series
//!
//! Contains:
//! - `RollingWindow`, an incremental fixed-size window
//! - `rolling_mean` / `rolling_sum`, whole-series trailing windows
//! - `blended_mean_update`, the one-step recurrence used when no real window exists

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Fixed-size trailing window kept as a running sum
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl RollingWindow {
    /// Create a new window holding the last `period` observations
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new observation, evicting the oldest once the window is full
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Whether the window holds `period` observations
    pub fn is_full(&self) -> bool {
        self.values.len() == self.period
    }

    /// Sum of the window, only once it is full
    pub fn sum(&self) -> Option<f64> {
        self.is_full().then_some(self.sum)
    }

    /// Mean of the window, only once it is full
    pub fn mean(&self) -> Option<f64> {
        self.sum().map(|s| s / self.period as f64)
    }
}

/// Trailing mean over `window` observations for every position.
///
/// Positions with fewer than `window` observations so far are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut rolling = RollingWindow::new(window)?;
    Ok(values
        .iter()
        .map(|&v| {
            rolling.push(v);
            rolling.mean()
        })
        .collect())
}

/// Trailing sum over `window` positions of a series with gaps.
///
/// A window containing any missing value yields `None`, as does a window that
/// is not yet full.
pub fn rolling_sum(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }

    Ok((0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            values[i + 1 - window..=i]
                .iter()
                .try_fold(0.0, |acc, v| v.map(|v| acc + v))
        })
        .collect())
}

/// Fold one new value into a mean of width `window` without the window's contents.
///
/// `(current * (window - 1) + value) / window`. This only approximates a true
/// sliding mean: the oldest observation is never evicted, its weight decays
/// geometrically by `(window - 1) / window` per step instead.
pub fn blended_mean_update(current: f64, value: f64, window: usize) -> f64 {
    let w = window.max(1) as f64;
    (current * (w - 1.0) + value) / w
}
