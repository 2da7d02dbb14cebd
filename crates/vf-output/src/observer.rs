//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use log::debug;

use vf_core::Tick;
use vf_flow::FlowState;
use vf_sim::{EndReason, SimObserver, TickReport};
use vf_topology::{Registry, TopologySnapshot};

use crate::row::{AreaRow, TrendRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes the occupancy trend and per-area levels to
/// any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After the run, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:        W,
    area_interval: u64,
    last_error:    Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, area_interval: 1, last_error: None }
    }

    /// Write per-area rows only every `ticks` ticks (default: every tick).
    pub fn area_interval(mut self, ticks: u64) -> Self {
        self.area_interval = ticks.max(1);
        self
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  Needed when a run stops before the event ends.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, report: &TickReport, flow: &FlowState) {
        let row = TrendRow {
            tick:               report.tick.0,
            elapsed_ms:         report.now_ms,
            label:              report.label.clone(),
            mode:               report.mode.as_str(),
            total_entered:      flow.total_entered,
            current_occupancy:  flow.current_occupancy,
            remaining_capacity: flow.remaining_capacity,
            occupancy_rate:     report.occupancy_rate,
        };
        let result = self.writer.write_tick(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, flow: &FlowState, topology: &TopologySnapshot, registry: &Registry) {
        if tick.0 % self.area_interval != 0 {
            return;
        }
        let rows: Vec<AreaRow> = topology
            .areas
            .iter()
            .filter_map(|&area| {
                let key = registry.areas.key_of(area)?;
                Some(AreaRow {
                    tick:      tick.0,
                    area_key:  key.0,
                    occupancy: flow.occupancy_of(area),
                    capacity:  topology.area_capacity(area).unwrap_or(0),
                })
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_areas(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick, reason: EndReason) {
        debug!("{final_tick}: flushing output ({reason})");
        let result = self.writer.finish();
        self.store_err(result);
    }
}
