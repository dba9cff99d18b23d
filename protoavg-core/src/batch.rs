//! Batch averaging of a flat reading stream
//!
//! Readings arrive in file order. Every `batch_size` consecutive readings
//! form one batch (one repetition of the parallel executions) and produce one
//! average. A position counter runs over one full experiment run
//! (`batch_size * repetitions` readings) and wraps back to zero, after which
//! the next run keeps appending to the same output sequence.
//!
//! A trailing partial batch never produces an average.

use crate::error::{Error, Result};
use crate::stats;

/// Streaming batch averager for one input file
#[derive(Debug, Clone)]
pub struct BatchAverager {
    batch_size: usize,
    repetitions: usize,
    /// Position inside the current experiment run, in `0..batch_size * repetitions`
    position: usize,
    /// Readings of the batch in progress
    window: Vec<f64>,
    averages: Vec<f64>,
    completed_runs: usize,
}

impl BatchAverager {
    /// Create an averager. Zero batch size or repetition count is a [`Error::Config`].
    pub fn new(batch_size: usize, repetitions: usize) -> Result<Self> {
        if batch_size == 0 || repetitions == 0 {
            return Err(Error::Config(format!(
                "batch size and repetitions must be > 0 (got {batch_size} and {repetitions})"
            )));
        }
        Ok(Self {
            batch_size,
            repetitions,
            position: 0,
            window: Vec::with_capacity(batch_size),
            averages: Vec::new(),
            completed_runs: 0,
        })
    }

    /// Number of readings in one experiment run
    pub fn run_length(&self) -> usize {
        self.batch_size * self.repetitions
    }

    /// Record one reading; returns the batch average when this reading completes a batch
    pub fn push(&mut self, reading: f64) -> Option<f64> {
        self.window.push(reading);

        let mut completed = None;
        if self.position % self.batch_size == self.batch_size - 1 {
            let average = stats::mean(&self.window);
            self.window.clear();
            self.averages.push(average);
            completed = Some(average);
        }

        if self.position == self.run_length() - 1 {
            self.completed_runs += 1;
            tracing::debug!(
                "Completed experiment run {} ({} batch averages so far)",
                self.completed_runs,
                self.averages.len()
            );
            self.position = 0;
        } else {
            self.position += 1;
        }

        completed
    }

    /// Current position inside the experiment run
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of full experiment runs consumed
    pub fn completed_runs(&self) -> usize {
        self.completed_runs
    }

    /// Averages emitted so far
    pub fn averages(&self) -> &[f64] {
        &self.averages
    }

    /// Consume the averager, dropping any partial batch
    pub fn finish(self) -> Vec<f64> {
        if !self.window.is_empty() {
            tracing::debug!(
                "Discarding {} readings of an incomplete batch",
                self.window.len()
            );
        }
        self.averages
    }
}

/// Average a whole reading sequence in one call
pub fn batch_averages<I>(readings: I, batch_size: usize, repetitions: usize) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = f64>,
{
    let mut averager = BatchAverager::new(batch_size, repetitions)?;
    for reading in readings {
        averager.push(reading);
    }
    Ok(averager.finish())
}
