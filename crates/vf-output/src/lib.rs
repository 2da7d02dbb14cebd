//! `vf-output` — simulation output writers for the venue-flow simulator.
//!
//! | Backend | Files created                                  |
//! |---------|------------------------------------------------|
//! | CSV     | `occupancy_trend.csv`, `area_occupancy.csv`    |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `vf_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vf_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run_to_end(60_000, &mut obs)?;
//! obs.finish()?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AreaRow, TrendRow};
pub use writer::OutputWriter;
