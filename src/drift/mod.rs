//! Prediction Drift - Sliding window over recent probabilities
//!
//! Tracks the mean of the most recent predictions and reports how far it has
//! moved from the mean observed at training time.

use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_BASELINE_MEAN: f64 = 0.62;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DriftError {
    #[error("Probabilidade fora do intervalo [0, 1]: {0}")]
    OutOfRange(f64),
}

/// Fixed-capacity FIFO of probabilities. Never cleared; oldest evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl DriftWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a probability, evicting the oldest entry once over capacity
    pub fn push(&mut self, probability: f64) -> Result<(), DriftError> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(DriftError::OutOfRange(probability));
        }

        self.values.push_back(probability);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
        Ok(())
    }

    /// Mean of the current contents, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// `|mean - baseline|`, zero for an empty window
    pub fn score(&self, baseline: f64) -> f64 {
        self.mean().map(|m| (m - baseline).abs()).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn values(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }
}

impl Default for DriftWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Process-wide drift state shared by every request handler.
/// Append and mean are computed under one lock.
#[derive(Debug)]
pub struct DriftTracker {
    window: Mutex<DriftWindow>,
    baseline: f64,
}

impl DriftTracker {
    pub fn new(capacity: usize, baseline: f64) -> Self {
        Self {
            window: Mutex::new(DriftWindow::new(capacity)),
            baseline,
        }
    }

    /// Record a new probability and return the drift score after the append.
    /// Out-of-range probabilities are rejected and leave the window untouched.
    pub async fn record_and_score(&self, probability: f64) -> Result<f64, DriftError> {
        self.record_and_publish(probability, |_| {}).await
    }

    /// Like [`record_and_score`](Self::record_and_score), but hands the new
    /// score to `publish` before the lock is released, so concurrent callers
    /// publish in the same order they appended.
    pub async fn record_and_publish<F>(&self, probability: f64, publish: F) -> Result<f64, DriftError>
    where
        F: FnOnce(f64),
    {
        let mut window = self.window.lock().await;
        window.push(probability)?;
        let score = window.score(self.baseline);
        publish(score);
        Ok(score)
    }

    /// Current score without recording anything
    pub async fn score(&self) -> f64 {
        self.window.lock().await.score(self.baseline)
    }

    pub async fn len(&self) -> usize {
        self.window.lock().await.len()
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }
}

impl Default for DriftTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_BASELINE_MEAN)
    }
}
