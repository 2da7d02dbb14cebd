//! venue — runs one event through the venue-flow simulator.
//!
//! Loads an event document (areas, entrances, control points, routes and the
//! venue capacity), runs it in normal mode until the operator's fast-forward
//! moment, then fast-forwards until the event ends.  The occupancy trend and
//! per-area levels are written as CSV; the final trend window is printed.

mod args;

use std::fs::File;
use std::io::BufReader;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::info;

use vf_core::{Draw, FlowConfig, Tick};
use vf_flow::FlowState;
use vf_output::{CsvWriter, OutputWriter, SimOutputObserver};
use vf_sim::{EndReason, SimBuilder, SimObserver, Simulator, TickReport};
use vf_topology::{Registry, Topology, TopologySnapshot, load_topology_json, load_topology_str};

use args::{Args, USAGE};

/// The bundled three-area sample event.
const SAMPLE_EVENT: &str = include_str!("../event.json");

// ── Observer wrapper to count rows and report mode changes ───────────────────

struct CountingObserver<W: OutputWriter> {
    inner:      SimOutputObserver<W>,
    trend_rows: usize,
    area_rows:  usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, trend_rows: 0, area_rows: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, report: &TickReport, flow: &FlowState) {
        if report.mode != report.mode_after {
            info!("{}: mode {} → {}", report.tick, report.mode, report.mode_after);
        }
        self.trend_rows += 1;
        self.inner.on_tick_end(report, flow);
    }

    fn on_snapshot(&mut self, tick: Tick, flow: &FlowState, topology: &TopologySnapshot, registry: &Registry) {
        self.area_rows += topology.areas.len();
        self.inner.on_snapshot(tick, flow, topology, registry);
    }

    fn on_sim_end(&mut self, final_tick: Tick, reason: EndReason) {
        self.inner.on_sim_end(final_tick, reason);
    }
}

// ── Driving ───────────────────────────────────────────────────────────────────

/// Run every tick due at or before `until_ms`, optionally pacing to wall
/// time.  Returns the end reason if the event ended.
fn advance<D: Draw, O: SimObserver>(
    sim:      &mut Simulator<D>,
    until_ms: u64,
    obs:      &mut O,
    realtime: bool,
) -> Result<Option<EndReason>> {
    while let Some(due) = sim.next_due_ms().filter(|&d| d <= until_ms) {
        if realtime {
            thread::sleep(Duration::from_millis(due.saturating_sub(sim.clock().now_ms)));
        }
        if let Some(reason) = sim.step(obs)?.and_then(|r| r.ended) {
            return Ok(Some(reason));
        }
    }
    Ok(None)
}

fn load_config(args: &Args) -> Result<FlowConfig> {
    let Some(path) = &args.config else {
        return Ok(FlowConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn load_topology(args: &Args) -> Result<Topology> {
    match &args.topology {
        Some(path) => load_topology_json(path).with_context(|| format!("loading topology {}", path.display())),
        None => Ok(load_topology_str(SAMPLE_EVENT)?),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let args = Args::from_env()?;
    let config = load_config(&args)?;
    let topology = load_topology(&args)?;

    println!("=== venue — crowd-flow occupancy simulator ===");
    println!(
        "Event: {} area(s), {} entrance(s), {} control point(s), {} route(s), capacity {}",
        topology.areas.len(),
        topology.entrances.len(),
        topology.control_points.len(),
        topology.routes.len(),
        topology.event_capacity.map_or_else(|| "unset".to_owned(), |c| c.to_string()),
    );
    for route in &topology.routes {
        println!("  route {}: {}", route.key, topology.describe_route(route));
    }
    println!(
        "Seed: {}  |  fast-forward at {} ms  |  give up at {} ms{}",
        config.seed,
        args.fast_forward_after,
        args.max_ms,
        if args.realtime { "  |  real-time" } else { "" },
    );
    println!();

    // 1. Build and start.
    let mut sim = SimBuilder::new(config, topology.clone()).build()?;
    sim.start()?;

    // 2. Output.
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let writer = CsvWriter::new(&args.out_dir)?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer));

    // 3. Run: normal until the operator acts, then fast-forward to the end.
    let t0 = Instant::now();
    let mut ended = advance(&mut sim, args.fast_forward_after, &mut obs, args.realtime)?;
    if ended.is_none() {
        sim.run_until(args.fast_forward_after, &mut obs)?;
        sim.fast_forward()?;
        ended = advance(&mut sim, args.max_ms, &mut obs, args.realtime)?;
    }
    let elapsed = t0.elapsed();

    obs.inner.finish()?;
    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 4. Summary.
    match ended {
        Some(reason) => println!("Event ended: {reason} at +{} ms", sim.clock().now_ms),
        None => println!("Event still running at +{} ms (see --max-ms)\n{USAGE}", sim.clock().now_ms),
    }
    println!(
        "Ran {} tick(s) in {:.3} s; occupancy {} ({:.1}%, target {}%)",
        sim.ticks().0,
        elapsed.as_secs_f64(),
        sim.flow().map_or(0, |f| f.current_occupancy),
        sim.occupancy_rate(),
        sim.target_occupancy().unwrap_or(0),
    );
    println!("  occupancy_trend.csv : {} rows", obs.trend_rows);
    println!("  area_occupancy.csv  : {} rows", obs.area_rows);
    println!();

    // 5. Trend window.
    println!("{:<10} {:>10}", "Time", "Occupancy");
    println!("{}", "-".repeat(21));
    for entry in sim.history() {
        println!("{:<10} {:>10}", entry.label, entry.occupancy);
    }
    println!();

    // 6. Per-area levels.
    if let Some(snapshot) = sim.snapshot() {
        println!("{:<24} {:>10} {:>10}", "Area", "Occupancy", "Capacity");
        println!("{}", "-".repeat(46));
        for area in &topology.areas {
            let occupancy = snapshot.area_occupancy.get(&area.key).copied().unwrap_or(0);
            println!(
                "{:<24} {:>10} {:>10}",
                area.name,
                occupancy,
                area.effective_capacity(sim.config().default_area_capacity),
            );
        }
    }

    Ok(())
}
