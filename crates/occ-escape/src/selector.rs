//! Stochastic escape-route selection.
//!
//! Candidates inside the agent's field-of-view cone are preferred; when the
//! cone is empty every candidate stays eligible.  Each candidate gets a
//! weight from its heading alignment and its desirability cost, and one is
//! drawn by cumulative-sum sampling.

use occ_core::{AgentRng, AgentState, UV};
use rand::Rng;
use rand_distr::Exp;
use tracing::{debug, trace};

use crate::{AgentCellDestination, DecisionContext, DestinationSource, EscapeRoutes};

/// Draw one destination out of `candidates`.
///
/// Returns `None` only when `candidates` is empty.
pub fn select_destination(
    state:               &AgentState,
    candidates:          &[AgentCellDestination],
    visibility_cosine:   f64,
    angle_weight:        f64,
    desirability_weight: f64,
    rng:                 &mut AgentRng,
) -> Option<UV> {
    if candidates.is_empty() {
        return None;
    }

    let alignment = |c: &AgentCellDestination| -> f64 {
        (c.destination - state.location)
            .normalized()
            .map_or(1.0, |dir| dir.dot(state.direction))
    };

    let visible: Vec<(&AgentCellDestination, f64)> = candidates
        .iter()
        .map(|c| (c, alignment(c)))
        .filter(|&(_, dot)| dot >= visibility_cosine)
        .collect();
    let pool: Vec<(&AgentCellDestination, f64)> = if visible.is_empty() {
        candidates.iter().map(|c| (c, alignment(c))).collect()
    } else {
        visible
    };

    let weights: Vec<f64> = pool
        .iter()
        .map(|&(c, dot)| {
            let angle_cost = (dot + 1.0) * 0.5;
            angle_weight * (-angle_weight * angle_cost).exp()
                + desirability_weight * (-desirability_weight * c.desirability_cost).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();

    if !(total.is_finite() && total > 0.0) {
        return pool.first().map(|(c, _)| c.destination);
    }

    let draw = rng.uniform(total);
    let mut cumulative = 0.0;
    for (&(c, _), w) in pool.iter().zip(&weights) {
        cumulative += w;
        if cumulative > draw {
            return Some(c.destination);
        }
    }
    // Rounding left the draw above the last partial sum.
    pool.last().map(|(c, _)| c.destination)
}

/// Time until the next unforced re-plan, drawn from `Exp(rate)`.
///
/// A rate that is not strictly positive never schedules a re-plan.
pub fn sample_decision_period(rate: f64, rng: &mut AgentRng) -> f64 {
    match Exp::new(rate) {
        Ok(exp) if rate > 0.0 => rng.inner().sample(exp),
        _ => f64::INFINITY,
    }
}

// ── EscapeRouteSelector ───────────────────────────────────────────────────────

/// [`DestinationSource`] backed by a shared, precomputed [`EscapeRoutes`]
/// table.
#[derive(Copy, Clone, Debug)]
pub struct EscapeRouteSelector<'r> {
    routes: &'r EscapeRoutes,
}

impl<'r> EscapeRouteSelector<'r> {
    pub fn new(routes: &'r EscapeRoutes) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &'r EscapeRoutes {
        self.routes
    }
}

impl DestinationSource for EscapeRouteSelector<'_> {
    fn next_destination(&mut self, ctx: &DecisionContext<'_>, rng: &mut AgentRng) -> Option<UV> {
        let location = ctx.state.location;
        let Some(cell) = ctx.floor.find_cell(location) else {
            debug!(u = location.u, v = location.v, "no cell under agent; keeping destination");
            return None;
        };
        let Some(entry) = self.routes.routes_near(ctx.floor, cell) else {
            debug!(%cell, "no escape routes near agent; keeping destination");
            return None;
        };

        let params = ctx.params;
        let chosen = select_destination(
            ctx.state,
            &entry.destinations,
            params.visibility_cosine,
            params.angle_weight,
            params.desirability_weight,
            rng,
        );
        trace!(%cell, vantage = %entry.vantage_cell, ?chosen, "escape route selected");
        chosen
    }
}
