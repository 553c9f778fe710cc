//! Integration tests for occ-sim.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use occ_core::{AgentId, AgentState, CellId, EngineParams, SimConfig, Tick, UV};
use occ_escape::{AgentCellDestination, EscapeRouteSelector, EscapeRoutes, WaypointTour};
use occ_floor::{BarrierKind, CellularFloor, CellularFloorBuilder};

use crate::{
    AgentSpawn, BatchRunner, NoopObserver, RunReport, SimError, SimObserver, SimulationBuilder,
    TickSummary, TrailRecorder, VisitHistogram,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(duration_secs: f64) -> SimConfig {
    SimConfig {
        tick_secs: 0.1,
        duration_secs,
        seed: 42,
        num_threads: Some(2),
        trail_interval_ticks: 1,
    }
}

/// 10 x 4 enclosed room of unit cells.
fn room() -> CellularFloor {
    CellularFloorBuilder::new(UV::ZERO, 1.0, 10, 4)
        .enclose(BarrierKind::Physical)
        .build()
        .unwrap()
}

/// Every cell sees the east exit (cheap) and the west exit (dearer).
fn two_exit_routes(floor: &CellularFloor) -> EscapeRoutes {
    let mut routes = EscapeRoutes::new();
    for cell in floor.walkable_cells() {
        routes
            .insert(cell, vec![
                AgentCellDestination::new(UV::new(9.0, 2.0), 0.0),
                AgentCellDestination::new(UV::new(1.0, 2.0), 1.0),
            ])
            .unwrap();
    }
    routes
}

fn tour_to(target: UV) -> WaypointTour {
    WaypointTour::new(vec![target], 0.3).unwrap()
}

// ── SimulationBuilder validation ──────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_successfully_with_defaults() {
        let floor = room();
        let sim = SimulationBuilder::new(test_config(1.0), EngineParams::default(), &floor, tour_to(UV::new(8.0, 2.0)))
            .spawn(UV::new(2.0, 2.0), UV::new(1.0, 0.0))
            .build()
            .unwrap();
        assert_eq!(sim.agent(), AgentId(0));
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
        assert_eq!(sim.visits().total(), 0);
    }

    #[test]
    fn invalid_config_errors() {
        let floor = room();
        let config = SimConfig { tick_secs: 0.0, ..test_config(1.0) };
        let result = SimulationBuilder::new(config, EngineParams::default(), &floor, tour_to(UV::new(8.0, 2.0)))
            .spawn(UV::new(2.0, 2.0), UV::new(1.0, 0.0))
            .build();
        assert!(matches!(result.err(), Some(SimError::Config(_))));
    }

    #[test]
    fn invalid_params_error() {
        let floor = room();
        let params = EngineParams { body_elasticity: 2.0, ..EngineParams::default() };
        let result = SimulationBuilder::new(test_config(1.0), params, &floor, tour_to(UV::new(8.0, 2.0)))
            .spawn(UV::new(2.0, 2.0), UV::new(1.0, 0.0))
            .build();
        assert!(matches!(result.err(), Some(SimError::Motion(_))));
    }

    #[test]
    fn off_floor_spawn_errors() {
        let floor = room();
        let result = SimulationBuilder::new(test_config(1.0), EngineParams::default(), &floor, tour_to(UV::new(8.0, 2.0)))
            .spawn(UV::new(12.0, 2.0), UV::new(1.0, 0.0))
            .build();
        assert_eq!(
            result.err(),
            Some(SimError::UnmappedLocation { location: UV::new(12.0, 2.0), tick: Tick::ZERO }),
        );
    }

    #[test]
    fn zero_heading_errors() {
        let floor = room();
        let state = AgentState { location: UV::new(2.0, 2.0), velocity: UV::ZERO, direction: UV::ZERO };
        let result = SimulationBuilder::new(test_config(1.0), EngineParams::default(), &floor, tour_to(UV::new(8.0, 2.0)))
            .state(state)
            .build();
        assert!(matches!(result.err(), Some(SimError::Config(_))));
    }

    #[test]
    fn state_heading_is_unitized() {
        let floor = room();
        let state = AgentState { location: UV::new(2.0, 2.0), velocity: UV::ZERO, direction: UV::new(0.0, 4.0) };
        let sim = SimulationBuilder::new(test_config(1.0), EngineParams::default(), &floor, tour_to(UV::new(8.0, 2.0)))
            .state(state)
            .build()
            .unwrap();
        assert_eq!(sim.state().direction, UV::new(0.0, 1.0));
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn covers_the_configured_duration() {
        let floor = room();
        let mut sim = SimulationBuilder::new(test_config(10.0), EngineParams::default(), &floor, tour_to(UV::new(8.0, 2.0)))
            .spawn(UV::new(2.0, 2.0), UV::new(1.0, 0.0))
            .build()
            .unwrap();
        let report = sim.run(&mut NoopObserver).unwrap();

        assert_eq!(report.ticks, 100);
        assert!(!report.stopped_early);
        assert!((report.walked_time - 10.0).abs() < 1e-9);
        assert_eq!(sim.visits().total(), 100);
        assert!(report.walked_distance > 4.0);
        assert!(report.final_state.location.distance_to(UV::new(8.0, 2.0)) < 1.0);
        assert!(sim.is_finished());
    }

    #[test]
    fn zero_duration_runs_no_tick() {
        let floor = room();
        let mut sim = SimulationBuilder::new(test_config(0.0), EngineParams::default(), &floor, tour_to(UV::new(8.0, 2.0)))
            .spawn(UV::new(2.0, 2.0), UV::new(1.0, 0.0))
            .build()
            .unwrap();
        let report = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(report.ticks, 0);
        assert_eq!(report.final_state.location, UV::new(2.0, 2.0));
    }

    #[test]
    fn same_seed_same_walk() {
        let floor  = room();
        let routes = two_exit_routes(&floor);
        let run = || {
            let mut sim = SimulationBuilder::new(test_config(20.0), EngineParams::default(), &floor, EscapeRouteSelector::new(&routes))
                .agent(AgentId(3))
                .spawn(UV::new(5.0, 2.0), UV::new(0.0, 1.0))
                .build()
                .unwrap();
            let report = sim.run(&mut NoopObserver).unwrap();
            (report, sim.visits().sorted())
        };
        let (a, visits_a) = run();
        let (b, visits_b) = run();
        assert_eq!(a, b);
        assert_eq!(visits_a, visits_b);
    }

    #[test]
    fn run_ticks_ignores_duration() {
        let floor = room();
        let mut sim = SimulationBuilder::new(test_config(0.5), EngineParams::default(), &floor, tour_to(UV::new(8.0, 2.0)))
            .spawn(UV::new(2.0, 2.0), UV::new(1.0, 0.0))
            .build()
            .unwrap();
        sim.run_ticks(20, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(20));
        assert!((sim.walked_time() - 2.0).abs() < 1e-9);
    }
}

// ── Observers ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        starts:    Vec<Tick>,
        ends:      Vec<(Tick, usize)>,
        progress:  Vec<f64>,
        stop_at:   Option<usize>,
        finished:  Option<RunReport>,
    }

    impl SimObserver for Recording {
        fn on_tick_start(&mut self, tick: Tick) {
            self.starts.push(tick);
        }

        fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
            assert!(summary.sub_steps >= 1);
            self.ends.push((tick, summary.sub_steps));
        }

        fn on_progress(&mut self, percent: f64) {
            self.progress.push(percent);
        }

        fn should_stop(&self) -> bool {
            self.stop_at.is_some_and(|n| self.ends.len() >= n)
        }

        fn on_sim_end(&mut self, report: &RunReport) {
            self.finished = Some(report.clone());
        }
    }

    fn sim_for(floor: &CellularFloor, config: SimConfig) -> crate::Simulation<'_, WaypointTour> {
        SimulationBuilder::new(config, EngineParams::default(), floor, tour_to(UV::new(8.0, 2.0)))
            .spawn(UV::new(2.0, 2.0), UV::new(1.0, 0.0))
            .build()
            .unwrap()
    }

    #[test]
    fn hooks_fire_once_per_tick() {
        let floor = room();
        let mut sim = sim_for(&floor, test_config(1.0));
        let mut obs = Recording::default();
        sim.run(&mut obs).unwrap();

        assert_eq!(obs.starts.len(), 10);
        assert_eq!(obs.ends.len(), 10);
        assert_eq!(obs.starts[3], Tick(3));
        assert_eq!(obs.finished.map(|r| r.ticks), Some(10));
    }

    #[test]
    fn progress_rises_to_one_hundred() {
        let floor = room();
        let mut sim = sim_for(&floor, test_config(1.0));
        let mut obs = Recording::default();
        sim.run(&mut obs).unwrap();

        assert_eq!(obs.progress.len(), 10);
        assert!(obs.progress.windows(2).all(|w| w[0] < w[1]));
        assert!((obs.progress[9] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn should_stop_ends_run_between_ticks() {
        let floor = room();
        let mut sim = sim_for(&floor, test_config(10.0));
        let mut obs = Recording { stop_at: Some(5), ..Recording::default() };
        let report = sim.run(&mut obs).unwrap();

        assert_eq!(report.ticks, 5);
        assert!(report.stopped_early);
        assert!((report.walked_time - 0.5).abs() < 1e-9);
        assert!(obs.finished.is_some_and(|r| r.stopped_early));
    }

    #[test]
    fn trail_follows_interval() {
        let floor = room();
        let config = SimConfig { trail_interval_ticks: 2, ..test_config(1.0) };
        let mut sim = sim_for(&floor, config);
        let mut trail = TrailRecorder::new();
        sim.run(&mut trail).unwrap();

        let ticks: Vec<u64> = trail.points.iter().map(|(t, _)| t.0).collect();
        assert_eq!(ticks, vec![0, 2, 4, 6, 8]);
        assert!(trail.path_length() > 0.0);
        assert!(trail.path_length() <= sim.walked_distance() + 1e-9);
    }

    #[test]
    fn trail_disabled_with_zero_interval() {
        let floor = room();
        let config = SimConfig { trail_interval_ticks: 0, ..test_config(1.0) };
        let mut sim = sim_for(&floor, config);
        let mut trail = TrailRecorder::new();
        sim.run(&mut trail).unwrap();
        assert!(trail.is_empty());
    }
}

// ── Fatal conditions ──────────────────────────────────────────────────────────

#[cfg(test)]
mod failure_tests {
    use occ_core::AgentRng;
    use occ_escape::{DecisionContext, DestinationSource};
    use occ_floor::{BarrierEdge, Collision, CollisionAnalyzer, FloorQuery};

    use super::*;
    use crate::MAX_SUB_STEPS;

    /// Broken floors, one defect each.
    enum Broken {
        /// Only the spawn point maps to a cell.
        Unmapped { spawn: UV },
        /// Every point touches a wall and contact never consumes time.
        StuckContact,
        /// No barrier information anywhere.
        NoBarriers,
    }

    impl FloorQuery for Broken {
        fn find_cell(&self, point: UV) -> Option<CellId> {
            match self {
                Broken::Unmapped { spawn } => (point == *spawn).then_some(CellId(0)),
                _ => Some(CellId(0)),
            }
        }

        fn cell_at_offset(&self, _cell: CellId, _d_col: i32, _d_row: i32) -> Option<CellId> {
            None
        }

        fn cell_center(&self, _cell: CellId) -> Option<UV> {
            None
        }

        fn colliding_edge(&self, point: UV, _kind: BarrierKind) -> Option<CollisionAnalyzer> {
            match self {
                Broken::Unmapped { .. } => Some(CollisionAnalyzer::unobstructed(point)),
                Broken::StuckContact => {
                    let wall = BarrierEdge::new(UV::new(point.u - 0.1, -5.0), UV::new(point.u - 0.1, 5.0));
                    Some(CollisionAnalyzer::against(point, wall))
                }
                Broken::NoBarriers => None,
            }
        }

        fn collision(
            &self,
            _previous: &CollisionAnalyzer,
            next:      &CollisionAnalyzer,
            _radius:   f64,
            _tolerance: f64,
        ) -> Option<Collision> {
            Some(Collision::new(next.location, 1.0, next.normalized_repulsion))
        }
    }

    struct East;

    impl DestinationSource for East {
        fn next_destination(&mut self, ctx: &DecisionContext<'_>, _rng: &mut AgentRng) -> Option<UV> {
            Some(ctx.state.location + UV::new(10.0, 0.0))
        }
    }

    fn run_on(floor: &Broken) -> Result<RunReport, SimError> {
        let mut sim = SimulationBuilder::new(test_config(1.0), EngineParams::default(), floor, East)
            .spawn(UV::new(1.0, 1.0), UV::new(1.0, 0.0))
            .build()?;
        sim.run(&mut NoopObserver)
    }

    #[test]
    fn unmapped_location_aborts() {
        let err = run_on(&Broken::Unmapped { spawn: UV::new(1.0, 1.0) }).unwrap_err();
        assert!(matches!(err, SimError::UnmappedLocation { tick: Tick(0), .. }));
    }

    #[test]
    fn stuck_contact_hits_sub_step_limit() {
        let err = run_on(&Broken::StuckContact).unwrap_err();
        assert_eq!(err, SimError::SubStepLimit { tick: Tick(0), limit: MAX_SUB_STEPS });
    }

    #[test]
    fn missing_barrier_info_is_a_motion_error() {
        let err = run_on(&Broken::NoBarriers).unwrap_err();
        assert!(matches!(err, SimError::Motion(occ_motion::MotionError::NoBarrierInfo { .. })));
    }
}

// ── VisitHistogram ────────────────────────────────────────────────────────────

#[cfg(test)]
mod histogram_tests {
    use super::*;

    #[test]
    fn counts_and_frequency() {
        let mut h = VisitHistogram::new();
        h.record(CellId(3));
        h.record(CellId(3));
        h.record(CellId(1));
        assert_eq!(h.count(CellId(3)), 2);
        assert_eq!(h.count(CellId(9)), 0);
        assert_eq!(h.total(), 3);
        assert_eq!(h.distinct_cells(), 2);
        assert!((h.frequency(CellId(1)) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(h.sorted(), vec![(CellId(1), 1), (CellId(3), 2)]);
    }

    #[test]
    fn empty_frequency_is_zero() {
        assert_eq!(VisitHistogram::new().frequency(CellId(0)), 0.0);
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = VisitHistogram::new();
        a.record(CellId(0));
        let mut b = VisitHistogram::new();
        b.record(CellId(0));
        b.record(CellId(5));
        a.merge(&b);
        assert_eq!(a.count(CellId(0)), 2);
        assert_eq!(a.count(CellId(5)), 1);
        assert_eq!(a.total(), 3);
    }
}

// ── BatchRunner ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod batch_tests {
    use super::*;

    fn spawns(n: u32) -> Vec<AgentSpawn> {
        (0..n)
            .map(|i| AgentSpawn {
                agent:     AgentId(i),
                location:  UV::new(1.5 + i as f64, 1.5 + (i % 2) as f64),
                direction: UV::new(1.0, 0.0),
            })
            .collect()
    }

    #[test]
    fn every_agent_runs_and_reports_progress() {
        let floor  = room();
        let routes = two_exit_routes(&floor);
        let runner = BatchRunner::new(test_config(5.0), EngineParams::default(), &floor);

        let calls = AtomicUsize::new(0);
        let peak  = Mutex::new(0.0_f64);
        let report = runner.run_escape(&spawns(6), &routes, |pct| {
            calls.fetch_add(1, Ordering::Relaxed);
            let mut p = peak.lock().unwrap();
            *p = p.max(pct);
        });

        assert_eq!(report.outcomes.len(), 6);
        assert_eq!(report.failures(), 0);
        assert_eq!(calls.load(Ordering::Relaxed), 6);
        assert!((*peak.lock().unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(report.visits.total(), 6 * 50);
        let ids: Vec<AgentId> = report.outcomes.iter().map(|o| o.agent).collect();
        assert_eq!(ids, (0..6).map(AgentId).collect::<Vec<_>>());
    }

    #[test]
    fn results_do_not_depend_on_scheduling() {
        let floor  = room();
        let routes = two_exit_routes(&floor);
        let runner = BatchRunner::new(test_config(5.0), EngineParams::default(), &floor);

        let a = runner.run_escape(&spawns(4), &routes, |_| {});
        let b = runner.run_escape(&spawns(4), &routes, |_| {});
        let finals = |r: &crate::BatchReport| -> Vec<AgentState> {
            r.reports().map(|rep| rep.final_state).collect()
        };
        assert_eq!(finals(&a), finals(&b));
        assert_eq!(a.visits, b.visits);
    }

    #[test]
    fn failing_agent_does_not_stop_the_batch() {
        let floor  = room();
        let routes = two_exit_routes(&floor);
        let runner = BatchRunner::new(test_config(1.0), EngineParams::default(), &floor);

        let mut list = spawns(3);
        list[1].location = UV::new(-4.0, 1.0);
        let report = runner.run_escape(&list, &routes, |_| {});

        assert_eq!(report.failures(), 1);
        assert!(matches!(report.outcomes[1].result, Err(SimError::UnmappedLocation { .. })));
        assert_eq!(report.reports().count(), 2);
        assert_eq!(report.visits.total(), 2 * 10);
    }

    /// 12 x 12 hall split into four rooms: a wall at u = 6 with a door
    /// between v = 5 and v = 7, and a wall at v = 6 open between u = 3 and
    /// u = 9.
    fn four_rooms() -> CellularFloor {
        CellularFloorBuilder::new(UV::ZERO, 1.0, 12, 12)
            .enclose(BarrierKind::Physical)
            .barrier(BarrierKind::Physical, UV::new(6.0, 0.0), UV::new(6.0, 5.0))
            .barrier(BarrierKind::Physical, UV::new(6.0, 7.0), UV::new(6.0, 12.0))
            .barrier(BarrierKind::Physical, UV::new(0.0, 6.0), UV::new(3.0, 6.0))
            .barrier(BarrierKind::Physical, UV::new(9.0, 6.0), UV::new(12.0, 6.0))
            .build()
            .unwrap()
    }

    /// West cells head for the door, east cells for the corners; every
    /// destination sits close to a wall.
    fn wall_hugging_routes(floor: &CellularFloor) -> EscapeRoutes {
        let mut routes = EscapeRoutes::new();
        for cell in floor.walkable_cells() {
            let (column, _) = floor.column_row(cell);
            let choices = if column < 6 {
                vec![
                    AgentCellDestination::new(UV::new(6.5, 6.0), 0.0),
                    AgentCellDestination::new(UV::new(0.6, 11.4), 1.0),
                ]
            } else {
                vec![
                    AgentCellDestination::new(UV::new(11.4, 0.6), 0.0),
                    AgentCellDestination::new(UV::new(6.6, 11.4), 1.0),
                ]
            };
            routes.insert(cell, choices).unwrap();
        }
        routes
    }

    fn hall_spawns() -> Vec<AgentSpawn> {
        (0..24)
            .map(|i| AgentSpawn {
                agent:     AgentId(i),
                location:  UV::new(0.5 + (2 * (i % 6)) as f64, 0.5 + (2 * (i / 6)) as f64),
                direction: UV::new(0.0, 1.0),
            })
            .collect()
    }

    fn assert_all_inside(report: &crate::BatchReport) {
        let errors: Vec<String> = report
            .outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| format!("{}: {e}", o.agent)))
            .collect();
        assert!(errors.is_empty(), "failed agents: {errors:?}");
        for rep in report.reports() {
            let loc = rep.final_state.location;
            assert!(loc.u > 0.0 && loc.u < 12.0 && loc.v > 0.0 && loc.v < 12.0, "ended at {loc}");
        }
    }

    #[test]
    fn escape_near_walls_never_aborts() {
        let floor  = four_rooms();
        let routes = wall_hugging_routes(&floor);
        let config = SimConfig { tick_secs: 0.25, ..test_config(30.0) };
        let runner = BatchRunner::new(config, EngineParams::default(), &floor);

        let report = runner.run_escape(&hall_spawns(), &routes, |_| {});
        assert_eq!(report.outcomes.len(), 24);
        assert_all_inside(&report);
    }

    #[test]
    fn fast_escape_near_walls_never_aborts() {
        let floor  = four_rooms();
        let routes = wall_hugging_routes(&floor);
        let params = EngineParams::from_named([
            ("velocity_cap", 4.0),
            ("acceleration", 10.0),
            ("decision_rate", 1.0),
        ])
        .unwrap();
        let runner = BatchRunner::new(test_config(30.0), params, &floor);

        let report = runner.run_escape(&hall_spawns(), &routes, |_| {});
        assert_eq!(report.failures(), 0);
        assert_all_inside(&report);
    }

    #[test]
    fn custom_sources_per_agent() {
        let floor  = room();
        let runner = BatchRunner::new(test_config(8.0), EngineParams::default(), &floor);
        let report = runner.run(&spawns(2), |spawn| tour_to(spawn.location + UV::new(1.0, 0.0)), |_| {});
        assert_eq!(report.failures(), 0);
        for (rep, spawn) in report.reports().zip(spawns(2)) {
            let target = spawn.location + UV::new(1.0, 0.0);
            assert!(rep.final_state.location.distance_to(target) < 1.0);
        }
    }
}
