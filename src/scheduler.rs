//! Trigger daemon.
//!
//! Wakes up on a fixed tick and fires each daily trigger whose hour matches
//! the current hour in the store's time zone and which has not fired yet
//! today. Triggers are stamped before they run; a failed run is logged and
//! left for the next day.
//!
//! An hour with no tick is not caught up later: a trigger whose hour was
//! missed next fires at that hour on the following day.

use crate::dates::format_day;
use crate::ops::{Outcome, Runner};
use crate::store::{Operation, TabularStore, TriggerRegistry};
use anyhow::Result;
use chrono::{DateTime, Timelike, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A trigger fired during one tick.
#[derive(Debug)]
pub struct Fired {
    pub trigger_id: i64,
    pub operation: Operation,
    pub outcome: Result<Outcome>,
}

/// Fire every trigger due at `instant`.
pub fn fire_due(
    runner: &Runner<'_>,
    store: &dyn TabularStore,
    registry: &dyn TriggerRegistry,
    instant: DateTime<Utc>,
) -> Result<Vec<Fired>> {
    let tz = store.time_zone()?;
    let today = format_day(&instant, tz);
    let hour = instant.with_timezone(&tz).hour() as u8;

    let mut fired = Vec::new();
    for trigger in registry.list_triggers()? {
        if !trigger.is_due(&today, hour) {
            continue;
        }
        registry.mark_fired(trigger.id, &today)?;
        info!(id = trigger.id, operation = %trigger.operation, hour, "Firing trigger");

        let outcome = runner.run_at(trigger.operation, instant);
        match &outcome {
            Ok(result) => debug!(id = trigger.id, ?result, "Trigger run finished"),
            Err(e) => warn!(id = trigger.id, operation = %trigger.operation, error = %e, "Trigger run failed"),
        }
        fired.push(Fired {
            trigger_id: trigger.id,
            operation: trigger.operation,
            outcome,
        });
    }
    Ok(fired)
}

/// Run the trigger loop until Ctrl-C.
pub async fn run_daemon(
    runner: &Runner<'_>,
    store: &dyn TabularStore,
    registry: &dyn TriggerRegistry,
    tick: Duration,
) -> Result<()> {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(tick_secs = tick.as_secs(), "Trigger daemon started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = fire_due(runner, store, registry, Utc::now()) {
                    warn!(error = %e, "Trigger tick failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Trigger daemon stopping");
                return Ok(());
            }
        }
    }
}
