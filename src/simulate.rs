//! Simulated test campaign that exercises a [`RunTracker`] end to end.
//!
//! Each tick, every unfinished run records one outcome: success two times in
//! three, otherwise failed or blocked with equal odds.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::Result;
use crate::tracker::RunTracker;

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    /// Expected test count per run; run `i` gets `totals[i]`.
    pub totals: Vec<u32>,
    /// Delay between ticks.
    pub period: Duration,
    pub seed: Option<u64>,
}

impl Default for SimulationPlan {
    fn default() -> Self {
        Self {
            totals: vec![20, 15, 30, 10],
            period: Duration::from_secs(3),
            seed: None,
        }
    }
}

pub async fn run_simulation(tracker: &mut RunTracker, plan: &SimulationPlan) -> Result<()> {
    let mut rng = match plan.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for (run, total) in plan.totals.iter().enumerate() {
        let name = format!("Run {}", run);
        tracker.start(run, *total, Some(name.as_str())).await?;
    }

    let longest = plan.totals.iter().copied().max().unwrap_or(0);
    for step in 0..longest {
        info!(step, "simulation tick");
        tokio::time::sleep(plan.period).await;

        for (run, total) in plan.totals.iter().enumerate() {
            if step >= *total {
                continue;
            }
            if rng.gen_bool(2.0 / 3.0) {
                tracker.add_succeeded(run).await?;
            } else if rng.gen_bool(0.5) {
                tracker.add_failed(run).await?;
            } else {
                tracker.add_blocked(run).await?;
            }
        }
    }

    tokio::time::sleep(plan.period).await;
    for run in 0..plan.totals.len() {
        tracker.stop(run).await?;
    }
    Ok(())
}
