//! The reconciliation pass itself.
//!
//! Phases of a run: scan the remote account once, derive the plan window,
//! then walk the plan creating whatever is missing. Titles are the only
//! identity; an event whose title already exists remotely is never touched
//! again. Creation order follows the plan, so on a partial run the nearest
//! missing events are the ones that got created.

use std::collections::HashSet;

use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use emisiones_core::{Category, PlanWindow, RemoteEvent, plan, resolve_template};
use emisiones_providers::{CreateOutcome, CreationBackend, ProviderError, RemoteSchedule};

/// A failure that aborts a run before any creation decision is made.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Reading the remote schedule failed. Without it the engine cannot
    /// tell what exists, so there is nothing safe to do.
    #[error("cannot read remote schedule: {0}")]
    Scan(#[from] ProviderError),

    /// The configured window bounds do not fit the calendar.
    #[error("invalid planning window: {0}")]
    Window(String),
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The plan window was fully reconciled.
    Completed,
    /// The provider refused further creations; the rest of the window
    /// waits for the next run.
    LimitReached,
    /// A creation failed in a way that made continuing pointless.
    Failed,
}

/// Tally of one reconciliation run.
#[derive(Debug)]
pub struct RunResult {
    /// Events created this run.
    pub created: usize,
    /// Planned events that already existed.
    pub skipped: usize,
    /// Titles whose creation failed.
    pub failed: Vec<String>,
    pub reason: StopReason,
}

impl RunResult {
    /// Returns true when the run ended in an expected state.
    pub fn is_success(&self) -> bool {
        matches!(self.reason, StopReason::Completed | StopReason::LimitReached)
    }
}

/// Settings for one reconciliation run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Timezone the catalog's wall-clock times live in.
    pub timezone: Tz,
    /// The categories to plan, in creation order.
    pub catalog: Vec<Category>,
    /// Days after today the window may start at the earliest.
    pub start_offset_days: u32,
    /// Upper bound on how far ahead to plan, before the backend's own
    /// horizon is applied.
    pub max_days_ahead: u32,
    /// Whether quota exhaustion ends the run cleanly (true) or is recorded
    /// per event while the run continues (false).
    pub stop_on_limit: bool,
}

impl EngineConfig {
    /// Creates a config with the usual posture: start tomorrow, plan as
    /// far as the backend allows, stop cleanly on quota.
    pub fn new(timezone: Tz, catalog: Vec<Category>) -> Self {
        Self {
            timezone,
            catalog,
            start_offset_days: 1,
            max_days_ahead: 3650,
            stop_on_limit: true,
        }
    }
}

/// Latest date that already has a broadcast, in the run's timezone.
fn last_existing_date(events: &[RemoteEvent], tz: Tz) -> Option<NaiveDate> {
    events
        .iter()
        .filter_map(|e| e.scheduled_start)
        .map(|start| start.with_timezone(&tz).date_naive())
        .max()
}

fn plan_window(
    config: &EngineConfig,
    backend: &dyn CreationBackend,
    today: NaiveDate,
    last_existing: Option<NaiveDate>,
) -> Result<PlanWindow, EngineError> {
    let offset_start = today
        .checked_add_days(Days::new(u64::from(config.start_offset_days)))
        .ok_or_else(|| {
            EngineError::Window(format!(
                "start offset of {} days does not fit the calendar",
                config.start_offset_days
            ))
        })?;
    let start = match last_existing {
        Some(last) => {
            let after_last = last.checked_add_days(Days::new(1)).ok_or_else(|| {
                EngineError::Window("existing events extend past the calendar".to_string())
            })?;
            offset_start.max(after_last)
        }
        None => offset_start,
    };

    let horizon = backend
        .planning_horizon_days()
        .map_or(config.max_days_ahead, |h| h.min(config.max_days_ahead));
    let end = today
        .checked_add_days(Days::new(u64::from(horizon)))
        .ok_or_else(|| {
            EngineError::Window(format!(
                "window of {} days does not fit the calendar",
                horizon
            ))
        })?;

    Ok(PlanWindow::new(start, end))
}

/// Runs one reconciliation pass with today taken from the wall clock.
pub async fn run(
    config: &EngineConfig,
    schedule: &dyn RemoteSchedule,
    backend: &dyn CreationBackend,
) -> Result<RunResult, EngineError> {
    let today = Utc::now().with_timezone(&config.timezone).date_naive();
    run_at(config, schedule, backend, today).await
}

/// Runs one reconciliation pass against an explicit `today`.
pub async fn run_at(
    config: &EngineConfig,
    schedule: &dyn RemoteSchedule,
    backend: &dyn CreationBackend,
    today: NaiveDate,
) -> Result<RunResult, EngineError> {
    info!(backend = backend.name(), %today, "scanning remote schedule");
    let history = schedule.list_broadcasts().await?;

    let existing_titles: HashSet<&str> = history.iter().map(|e| e.title.as_str()).collect();
    let last_existing = last_existing_date(&history, config.timezone);
    let window = plan_window(config, backend, today, last_existing)?;

    debug!(
        events = history.len(),
        last_existing = ?last_existing,
        window_start = %window.start,
        window_end = %window.end,
        "plan window derived"
    );

    let mut result = RunResult {
        created: 0,
        skipped: 0,
        failed: Vec::new(),
        reason: StopReason::Completed,
    };

    // Titles created this run; guards against a plan that repeats a slot.
    let mut created_titles: HashSet<String> = HashSet::new();

    'plan: for spec in plan(window, &config.catalog, config.timezone) {
        if existing_titles.contains(spec.title.as_str()) || created_titles.contains(&spec.title) {
            result.skipped += 1;
            continue;
        }

        let template = resolve_template(&history, &spec.category.keyword);
        if template.is_none() {
            debug!(keyword = %spec.category.keyword, "no template broadcast found");
        }

        match backend.create(&spec, template).await {
            CreateOutcome::Created => {
                result.created += 1;
                created_titles.insert(spec.title);
            }
            CreateOutcome::QuotaExceeded { detail } => {
                if config.stop_on_limit {
                    info!("STOP: límite alcanzado ({})", detail);
                    result.reason = StopReason::LimitReached;
                    break 'plan;
                }
                warn!(title = %spec.title, %detail, "creation refused, continuing");
                result.failed.push(spec.title);
            }
            CreateOutcome::TransientFailure(e) => {
                error!(title = %spec.title, error = %e, "transient failure, stopping run");
                result.failed.push(spec.title);
                result.reason = StopReason::Failed;
                break 'plan;
            }
            CreateOutcome::PermanentFailure(e) => {
                error!(title = %spec.title, error = %e, "permanent failure, stopping run");
                result.failed.push(spec.title);
                result.reason = StopReason::Failed;
                break 'plan;
            }
        }
    }

    if !result.failed.is_empty() && result.reason == StopReason::Completed {
        // stop_on_limit = false and at least one refusal: the window was
        // walked to the end but is not fully reconciled.
        result.reason = StopReason::LimitReached;
    }

    info!(
        created = result.created,
        skipped = result.skipped,
        failed = result.failed.len(),
        reason = ?result.reason,
        "run finished"
    );
    Ok(result)
}
