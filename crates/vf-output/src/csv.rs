//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `occupancy_trend.csv`
//! - `area_occupancy.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AreaRow, OutputResult, TrendRow};

pub const TREND_FILE: &str = "occupancy_trend.csv";
pub const AREA_FILE: &str = "area_occupancy.csv";

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    trend:    Writer<File>,
    areas:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` (which must exist) and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut trend = Writer::from_path(dir.join(TREND_FILE))?;
        trend.write_record([
            "tick",
            "elapsed_ms",
            "label",
            "mode",
            "total_entered",
            "current_occupancy",
            "remaining_capacity",
            "occupancy_rate",
        ])?;

        let mut areas = Writer::from_path(dir.join(AREA_FILE))?;
        areas.write_record(["tick", "area_key", "occupancy", "capacity"])?;

        Ok(Self { trend, areas, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick(&mut self, row: &TrendRow) -> OutputResult<()> {
        self.trend.write_record(&[
            row.tick.to_string(),
            row.elapsed_ms.to_string(),
            row.label.clone(),
            row.mode.to_owned(),
            row.total_entered.to_string(),
            row.current_occupancy.to_string(),
            row.remaining_capacity.to_string(),
            format!("{:.2}", row.occupancy_rate),
        ])?;
        Ok(())
    }

    fn write_areas(&mut self, rows: &[AreaRow]) -> OutputResult<()> {
        for row in rows {
            self.areas.write_record(&[
                row.tick.to_string(),
                row.area_key.to_string(),
                row.occupancy.to_string(),
                row.capacity.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.trend.flush()?;
        self.areas.flush()?;
        Ok(())
    }
}
