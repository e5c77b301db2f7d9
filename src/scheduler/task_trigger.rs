use crate::{error::Error as ChronodError, scheduler::CronExt, tasks::TaskSchedule};
use anyhow::bail;
use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use croner::Cron;
use std::time::Duration;

/// A concrete, resolved trigger computing the fire time(s) for a task schedule.
#[derive(Debug, Clone)]
pub enum TaskTrigger {
    /// Fires on a cron schedule. The pattern carries an explicit seconds field so that the timer
    /// engine fires at second zero, the way 5-field cron expressions are conventionally read.
    Cron(Cron),
    /// Fires with a fixed period.
    Interval(Duration),
    /// Fires once at the specified timestamp.
    OneShot(DateTime<Tz>),
}

impl TaskTrigger {
    /// Resolves a declarative schedule into a concrete trigger, validating the fields of the
    /// schedule variant. Validation failures are client errors naming the offending task. Note
    /// that one-time schedules with a past fire time resolve successfully: whether they still
    /// fire is a registration-time decision driven by the misfire grace window.
    pub fn resolve(task_id: &str, schedule: &TaskSchedule, timezone: Tz) -> anyhow::Result<Self> {
        match schedule {
            TaskSchedule::Cron { expression } => {
                let fields = expression.split_whitespace().collect::<Vec<_>>();
                if fields.len() != 5 {
                    bail!(ChronodError::client(format!(
                        "Task '{task_id}': cron expression must have exactly 5 fields \
                         (minute hour day month weekday), got {}: '{expression}'.",
                        fields.len()
                    )));
                }

                match Cron::parse_pattern(format!("0 {}", fields.join(" "))) {
                    Ok(cron) => Ok(Self::Cron(cron)),
                    Err(err) => bail!(ChronodError::client(format!(
                        "Task '{task_id}': invalid cron expression '{expression}': {err}"
                    ))),
                }
            }
            TaskSchedule::Interval { interval_seconds } => {
                if *interval_seconds == 0 {
                    bail!(ChronodError::client(format!(
                        "Task '{task_id}': interval must be greater than zero."
                    )));
                }
                Ok(Self::Interval(Duration::from_secs(*interval_seconds)))
            }
            TaskSchedule::Date { run_at } => {
                match TaskSchedule::resolve_run_at(run_at, timezone) {
                    Ok(run_at) => Ok(Self::OneShot(run_at)),
                    Err(err) => bail!(ChronodError::client(format!("Task '{task_id}': {err}"))),
                }
            }
        }
    }

    /// Computes up to `count` fire times strictly after the specified timestamp. One-shot
    /// triggers yield at most one timestamp, and none once their fire time has passed.
    pub fn next_occurrences(
        &self,
        after: DateTime<Tz>,
        count: usize,
    ) -> anyhow::Result<Vec<DateTime<Tz>>> {
        let mut occurrences = Vec::with_capacity(count);
        match self {
            Self::Cron(cron) => {
                let mut cursor = after;
                for _ in 0..count {
                    cursor = cron.find_next_occurrence(&cursor, false)?;
                    occurrences.push(cursor);
                }
            }
            Self::Interval(period) => {
                let period = TimeDelta::from_std(*period)?;
                let mut cursor = after;
                for _ in 0..count {
                    cursor = cursor + period;
                    occurrences.push(cursor);
                }
            }
            Self::OneShot(run_at) => {
                if *run_at > after && count > 0 {
                    occurrences.push(*run_at);
                }
            }
        }

        Ok(occurrences)
    }
}
