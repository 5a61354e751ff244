//! Fixed-interval cycle scheduling
//!
//! Cycles never overlap: each one runs to completion, then the scheduler
//! sleeps for the full interval. Cancellation is only observed between cycles.

use crate::reconcile::{CycleError, CycleReport, Reconciler};
use crate::repository::RuleRepository;
use crate::resolver::AddressResolver;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How often cycles run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A single cycle; its failure is returned to the caller
    Once,
    /// Forever, sleeping this long between cycles; failures are only logged
    Every(Duration),
}

impl Schedule {
    pub fn from_interval(interval: Option<Duration>) -> Self {
        match interval {
            Some(interval) => Schedule::Every(interval),
            None => Schedule::Once,
        }
    }
}

/// Drive `reconciler` according to `schedule` until done or cancelled
pub async fn run<R, A>(
    reconciler: &Reconciler<R, A>,
    schedule: Schedule,
    cancel: &CancellationToken,
) -> Result<(), CycleError>
where
    R: RuleRepository,
    A: AddressResolver,
{
    let interval = match schedule {
        Schedule::Once => {
            let outcome = reconciler.run_cycle().await;
            log_outcome(1, &outcome);
            return outcome.map(|_| ());
        }
        Schedule::Every(interval) => interval,
    };

    let mut cycle = 0u64;
    loop {
        cycle += 1;
        let outcome = reconciler.run_cycle().await;
        log_outcome(cycle, &outcome);

        if cancel.is_cancelled() {
            break;
        }

        info!(
            sleep_minutes = interval.as_secs() / 60,
            "Done, will be called again after sleep"
        );
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => break,
        }
    }

    info!(cycles = cycle, "Shutdown requested, stopping");
    Ok(())
}

fn log_outcome(cycle: u64, outcome: &Result<CycleReport, CycleError>) {
    match outcome {
        Ok(report) => info!(
            cycle,
            public_ip = %report.address,
            candidates = report.candidates,
            unchanged = report.unchanged,
            replaced = report.replaced,
            planned = report.planned,
            "Cycle complete"
        ),
        Err(e) => {
            error!(cycle, replaced = e.replaced(), error = %e, "Cycle failed");
            if let Some(suggestion) = e.api_error().and_then(|api| api.suggestion()) {
                warn!(suggestion, "Possible fix");
            }
        }
    }
}
