//! The `OutputWriter` trait implemented by backend writers.

use crate::{AreaRow, OutputResult, TrendRow};

/// Sink for trend and per-area rows.
///
/// Errors never interrupt the simulation: the observer stores them and they
/// are retrieved with [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one occupancy trend row.
    fn write_tick(&mut self, row: &TrendRow) -> OutputResult<()>;

    /// Write a batch of per-area rows.
    fn write_areas(&mut self, rows: &[AreaRow]) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
