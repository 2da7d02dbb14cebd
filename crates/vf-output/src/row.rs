//! Plain data row types written by output backends.

/// One tick of the occupancy trend.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRow {
    pub tick:               u64,
    pub elapsed_ms:         u64,
    /// `HH:MM:SS` wall-clock label of the tick.
    pub label:              String,
    /// Mode the tick ran under.
    pub mode:               &'static str,
    pub total_entered:      u64,
    pub current_occupancy:  u64,
    pub remaining_capacity: u64,
    /// Percent of event capacity, `0.0` when there is none.
    pub occupancy_rate:     f64,
}

/// Occupancy of one live area at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaRow {
    pub tick:      u64,
    pub area_key:  u64,
    pub occupancy: u64,
    /// Effective capacity (the configured default when the area has none).
    pub capacity:  u64,
}
