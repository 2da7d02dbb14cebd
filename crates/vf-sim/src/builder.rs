//! Fluent builder for constructing a [`Simulator`].

use vf_core::{Draw, FlowConfig, SimClock, SimRng, Tick};
use vf_topology::{Registry, Topology, TopologySnapshot};

use crate::{History, Scheduler, SimResult, Simulator};

/// Fluent builder for [`Simulator<D>`].
///
/// # Required inputs
///
/// - [`FlowConfig`]: mode parameters, caps and seed
/// - [`Topology`]: the initial venue layout
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                          |
/// |-----------------------|----------------------------------|
/// | `.rng(d)`             | `SimRng::new(config.seed)`       |
/// | `.start_unix_ms(ms)`  | `config.start_unix_ms`           |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(FlowConfig::default(), topology).build()?;
/// sim.start()?;
/// sim.run_until(60_000, &mut NoopObserver)?;
/// ```
pub struct SimBuilder<D: Draw> {
    config:        FlowConfig,
    topology:      Topology,
    rng:           D,
    start_unix_ms: i64,
}

impl SimBuilder<SimRng> {
    /// Create a builder seeded from `config.seed`.
    pub fn new(config: FlowConfig, topology: Topology) -> Self {
        let rng = SimRng::new(config.seed);
        let start_unix_ms = config.start_unix_ms;
        Self { config, topology, rng, start_unix_ms }
    }
}

impl<D: Draw> SimBuilder<D> {
    /// Replace the random source, e.g. with a scripted one for replay tests.
    pub fn rng<D2: Draw>(self, rng: D2) -> SimBuilder<D2> {
        SimBuilder {
            config:        self.config,
            topology:      self.topology,
            rng,
            start_unix_ms: self.start_unix_ms,
        }
    }

    /// Wall-clock anchor of virtual time 0, used for history labels.
    pub fn start_unix_ms(mut self, ms: i64) -> Self {
        self.start_unix_ms = ms;
        self
    }

    /// Validate the configuration and topology and return an idle
    /// [`Simulator`].  Call [`Simulator::start`] to begin ticking.
    pub fn build(self) -> SimResult<Simulator<D>> {
        self.config.validate()?;

        let mut registry = Registry::new();
        let snapshot =
            TopologySnapshot::compile(&self.topology, &mut registry, self.config.default_area_capacity)?;

        Ok(Simulator {
            clock:          SimClock::new(self.start_unix_ms),
            history:        History::new(self.config.history_capacity),
            config:         self.config,
            rng:            self.rng,
            topology:       self.topology,
            topology_dirty: false,
            registry,
            snapshot,
            flow:           None,
            controller:     None,
            scheduler:      Scheduler::new(),
            tick:           Tick::ZERO,
        })
    }
}
