//! Many independent agents over one shared floor.
//!
//! Each agent gets its own engine, destination source and RNG stream
//! (derived from the run seed and its `AgentId`), so results do not depend
//! on scheduling.  With the `parallel` feature agents run on Rayon's pool;
//! without it they run in order on the calling thread.

use std::sync::atomic::{AtomicUsize, Ordering};

use occ_core::{AgentId, EngineParams, SimConfig, UV};
use occ_escape::{DestinationSource, EscapeRouteSelector, EscapeRoutes};
use occ_floor::FloorQuery;
use tracing::{info, warn};

use crate::{NoopObserver, RunReport, SimResult, SimulationBuilder, VisitHistogram};

/// Where one agent of a batch starts.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSpawn {
    pub agent:     AgentId,
    pub location:  UV,
    pub direction: UV,
}

/// Result of one agent's run inside a batch.
#[derive(Debug)]
pub struct AgentOutcome {
    pub agent:  AgentId,
    pub result: SimResult<RunReport>,
}

/// Everything a batch produced.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per spawn, in spawn order.
    pub outcomes: Vec<AgentOutcome>,

    /// Visit counts of every agent that finished, merged.
    pub visits: VisitHistogram,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Reports of the agents that finished.
    pub fn reports(&self) -> impl Iterator<Item = &RunReport> + '_ {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

/// Runs a batch of agents that share a floor.
pub struct BatchRunner<'a, F: FloorQuery + Sync> {
    config: SimConfig,
    params: EngineParams,
    floor:  &'a F,
}

impl<'a, F: FloorQuery + Sync> BatchRunner<'a, F> {
    pub fn new(config: SimConfig, params: EngineParams, floor: &'a F) -> Self {
        Self { config, params, floor }
    }

    /// Run every spawn with an [`EscapeRouteSelector`] over `routes`.
    pub fn run_escape<P>(&self, spawns: &[AgentSpawn], routes: &EscapeRoutes, progress: P) -> BatchReport
    where
        P: Fn(f64) + Sync,
    {
        self.run(spawns, |_| EscapeRouteSelector::new(routes), progress)
    }

    /// Run every spawn with the source built by `make_source`.
    ///
    /// `progress` receives the completed share in percent after each agent.
    /// A failing agent is logged and reported; it does not stop the others.
    pub fn run<S, M, P>(&self, spawns: &[AgentSpawn], make_source: M, progress: P) -> BatchReport
    where
        S: DestinationSource,
        M: Fn(&AgentSpawn) -> S + Sync,
        P: Fn(f64) + Sync,
    {
        info!(agents = spawns.len(), "batch started");
        let done  = AtomicUsize::new(0);
        let total = spawns.len().max(1) as f64;

        let run_one = |spawn: &AgentSpawn| -> (AgentOutcome, Option<VisitHistogram>) {
            let (result, visits) = match self.simulate(spawn, make_source(spawn)) {
                Ok((report, visits)) => (Ok(report), Some(visits)),
                Err(e) => {
                    warn!(agent = %spawn.agent, error = %e, "agent run aborted");
                    (Err(e), None)
                }
            };
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            progress(finished as f64 / total * 100.0);
            (AgentOutcome { agent: spawn.agent, result }, visits)
        };

        #[cfg(not(feature = "parallel"))]
        let results: Vec<(AgentOutcome, Option<VisitHistogram>)> = spawns.iter().map(run_one).collect();

        #[cfg(feature = "parallel")]
        let results: Vec<(AgentOutcome, Option<VisitHistogram>)> = {
            use rayon::prelude::*;

            match self.config.num_threads {
                Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                    Ok(pool) => pool.install(|| spawns.par_iter().map(run_one).collect()),
                    Err(e) => {
                        warn!(error = %e, "could not build worker pool; using the global one");
                        spawns.par_iter().map(run_one).collect()
                    }
                },
                None => spawns.par_iter().map(run_one).collect(),
            }
        };

        let mut report = BatchReport::default();
        for (outcome, visits) in results {
            if let Some(visits) = visits {
                report.visits.merge(&visits);
            }
            report.outcomes.push(outcome);
        }
        info!(agents = spawns.len(), failures = report.failures(), "batch finished");
        report
    }

    fn simulate<S: DestinationSource>(
        &self,
        spawn:  &AgentSpawn,
        source: S,
    ) -> SimResult<(RunReport, VisitHistogram)> {
        let mut sim = SimulationBuilder::new(self.config.clone(), self.params.clone(), self.floor, source)
            .agent(spawn.agent)
            .spawn(spawn.location, spawn.direction)
            .build()?;
        let report = sim.run(&mut NoopObserver)?;
        Ok((report, sim.into_visits()))
    }
}
