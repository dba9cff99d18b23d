//! protoavg core library
//!
//! Reduces raw H2/H3 latency benchmark time series into per-batch averages
//! and writes one paired summary CSV per experiment group. The stages are
//! duration parsing, batch averaging, scenario extraction, report writing and
//! the scenario driver that chains them.

pub mod batch;
pub mod duration;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod scenario;
pub mod settings;
pub mod stats;

pub use batch::{batch_averages, BatchAverager};
pub use duration::{parse_duration, DurationUnit};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunOutcome, ScenarioFailure, ScenarioOutcome};
pub use report::ReportWriter;
pub use scenario::{ScenarioAverages, ScenarioProcessor, Variant};
pub use settings::{AggregationSettings, FailurePolicy};
pub use stats::Summary;
