//! corridor: smallest end-to-end run of the occnav engine.
//!
//! Two rooms joined by a one-metre door.  Every cell of the west room sees
//! the door, every cell of the east room sees the exit.  One traced agent
//! walks with a trail recorder attached, then a batch of agents runs in
//! parallel and their visits are merged into a heat map.
//!
//! Set `RUST_LOG=occ_sim=info` (or `debug` for every barrier contact) to
//! see the engine's log output.

use std::time::Instant;

use anyhow::Result;
use tracing::info;

use occ_core::{AgentId, CellId, EngineParams, SimConfig, Tick, UV};
use occ_escape::{AgentCellDestination, EscapeRouteSelector, EscapeRoutes};
use occ_floor::{BarrierKind, CellularFloor, CellularFloorBuilder, FloorQuery};
use occ_sim::{AgentSpawn, BatchRunner, RunReport, SimObserver, SimulationBuilder, TrailRecorder, VisitHistogram};

// ── Constants ─────────────────────────────────────────────────────────────────

const COLUMNS:       u32 = 20;
const ROWS:          u32 = 5;
const BATCH_AGENTS:  u32 = 16;
const SEED:          u64 = 42;
const DURATION_SECS: f64 = 30.0;

const WALL_U: f64 = 10.0;
// Just past the doorway, so agents aiming at it walk through.
const DOOR: UV = UV { u: 10.5, v: 2.5 };
const EXIT: UV = UV { u: 19.0, v: 2.5 };

// ── Floor and routes ──────────────────────────────────────────────────────────

/// 20 x 5 hall split at u = 10 by a wall with a door between v = 2 and v = 3.
fn build_floor() -> Result<CellularFloor> {
    let floor = CellularFloorBuilder::new(UV::ZERO, 1.0, COLUMNS, ROWS)
        .enclose(BarrierKind::Physical)
        .enclose(BarrierKind::Visual)
        .barrier(BarrierKind::Physical, UV::new(10.0, 0.0), UV::new(10.0, 2.0))
        .barrier(BarrierKind::Physical, UV::new(10.0, 3.0), UV::new(10.0, 5.0))
        .barrier(BarrierKind::Visual, UV::new(10.0, 0.0), UV::new(10.0, 2.0))
        .barrier(BarrierKind::Visual, UV::new(10.0, 3.0), UV::new(10.0, 5.0))
        .build()?;
    Ok(floor)
}

fn build_routes(floor: &CellularFloor) -> Result<EscapeRoutes> {
    let mut routes = EscapeRoutes::new();
    for cell in floor.walkable_cells() {
        let (column, row) = floor.column_row(cell);
        let destinations = if (column as f64) < WALL_U {
            // The door, plus a dearer glance along the wall.
            vec![
                AgentCellDestination::new(DOOR, 0.0),
                AgentCellDestination::new(UV::new(9.0, row as f64 + 0.5), 2.0),
            ]
        } else {
            vec![AgentCellDestination::new(EXIT, 0.0)]
        };
        routes.insert(cell, destinations)?;
    }
    Ok(routes)
}

// ── Observer: trail + coarse progress ─────────────────────────────────────────

#[derive(Default)]
struct TracedAgent {
    trail:        TrailRecorder,
    last_decile:  u32,
    passed_door:  Option<Tick>,
}

impl SimObserver for TracedAgent {
    fn on_tick_end(&mut self, tick: Tick, summary: &occ_sim::TickSummary) {
        if self.passed_door.is_none() && summary.state.location.u > WALL_U {
            self.passed_door = Some(tick);
        }
    }

    fn on_snapshot(&mut self, tick: Tick, state: &occ_core::AgentState) {
        self.trail.on_snapshot(tick, state);
    }

    fn on_progress(&mut self, percent: f64) {
        let decile = (percent / 10.0) as u32;
        if decile > self.last_decile {
            self.last_decile = decile;
            info!(percent = decile * 10, "traced agent progress");
        }
    }
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn print_report(report: &RunReport) {
    let s = &report.final_state;
    println!(
        "  {:<10} ticks {:>4}  walked {:>6.2} m  collisions {:>3}  at ({:.2}, {:.2})",
        report.agent.to_string(),
        report.ticks,
        report.walked_distance,
        report.collisions,
        s.location.u,
        s.location.v,
    );
}

/// One character per cell, darker for more visits; top row printed first.
fn print_heat_map(visits: &VisitHistogram) {
    const SHADES: &[u8] = b" .:-=+*#%@";
    let peak = visits.sorted().iter().map(|&(_, n)| n).max().unwrap_or(0).max(1);
    for row in (0..ROWS).rev() {
        let line: String = (0..COLUMNS)
            .map(|column| {
                let n = visits.count(CellId(row * COLUMNS + column));
                let idx = (n * (SHADES.len() as u64 - 1)).div_ceil(peak) as usize;
                SHADES[idx.min(SHADES.len() - 1)] as char
            })
            .collect();
        println!("  |{line}|");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();

    println!("=== corridor: occnav locomotion engine ===");
    println!("Hall: {COLUMNS} x {ROWS} m  |  Batch: {BATCH_AGENTS} agents  |  Seed: {SEED}");
    println!();

    // 1. Floor and escape routes.
    let floor  = build_floor()?;
    let routes = build_routes(&floor)?;
    println!(
        "Floor: {} walkable cells, {} physical / {} visual barrier edges",
        floor.walkable_count(),
        floor.barrier_count(BarrierKind::Physical),
        floor.barrier_count(BarrierKind::Visual),
    );

    let params = EngineParams::default();
    let config = SimConfig {
        tick_secs:            0.1,
        duration_secs:        DURATION_SECS,
        seed:                 SEED,
        num_threads:          None, // all logical cores
        trail_interval_ticks: 5,
    };

    // 2. One traced agent.
    let start = UV::new(1.5, 0.8);
    let mut sim = SimulationBuilder::new(config.clone(), params.clone(), &floor, EscapeRouteSelector::new(&routes))
        .agent(AgentId(0))
        .spawn(start, UV::new(0.0, 1.0))
        .build()?;
    let mut traced = TracedAgent::default();
    let report = sim.run(&mut traced)?;

    println!();
    println!("Traced agent:");
    print_report(&report);
    match traced.passed_door {
        Some(tick) => println!("  passed the door at {tick} ({:.1} s)", tick.as_secs(config.tick_secs)),
        None       => println!("  never passed the door"),
    }
    println!(
        "  trail: {} points, {:.2} m between snapshots",
        traced.trail.len(),
        traced.trail.path_length()
    );
    if let Some(cell) = floor.find_cell(report.final_state.location) {
        println!("  final cell {cell} ({} visits)", sim.visits().count(cell));
    }

    // 3. Batch of agents spread over the west room.
    let spawns: Vec<AgentSpawn> = (0..BATCH_AGENTS)
        .map(|i| AgentSpawn {
            agent:     AgentId(i + 1),
            location:  UV::new(1.5 + (i % 8) as f64, 1.5 + (i / 8) as f64 * 2.0),
            direction: UV::new(1.0, 0.0),
        })
        .collect();

    let runner = BatchRunner::new(config, params, &floor);
    let t0 = Instant::now();
    let batch = runner.run_escape(&spawns, &routes, |pct| {
        tracing::debug!(percent = pct, "batch progress");
    });
    let elapsed = t0.elapsed();

    println!();
    println!("Batch complete in {:.3} s ({} failures)", elapsed.as_secs_f64(), batch.failures());
    for report in batch.reports() {
        print_report(report);
    }
    for outcome in batch.outcomes.iter().filter(|o| o.result.is_err()) {
        if let Err(e) = &outcome.result {
            println!("  {:<10} aborted: {e}", outcome.agent.to_string());
        }
    }
    let through = batch.reports().filter(|r| r.final_state.location.u > WALL_U).count();
    println!("  {through} / {} agents ended east of the door", spawns.len());

    println!();
    println!("Visit heat map ({} records):", batch.visits.total());
    print_heat_map(&batch.visits);

    Ok(())
}
