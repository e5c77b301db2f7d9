use anyhow::bail;
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::ToSchema;

/// Describes when a task should run. Exactly one variant is populated: providing fields that
/// belong to another variant fails deserialization rather than being silently ignored.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TaskSchedule {
    /// A recurring schedule described by a 5-field cron expression (minute hour day month weekday).
    Cron { expression: String },
    /// A recurring schedule with a fixed period.
    Interval { interval_seconds: u64 },
    /// A one-time schedule firing at an absolute timestamp. Timezone-naive timestamps are
    /// interpreted in the configured scheduler timezone.
    Date { run_at: String },
}

impl TaskSchedule {
    /// Returns the wire tag of the schedule type.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Cron { .. } => "cron",
            Self::Interval { .. } => "interval",
            Self::Date { .. } => "date",
        }
    }

    /// Indicates whether the schedule fires exactly once.
    pub fn is_one_time(&self) -> bool {
        matches!(self, Self::Date { .. })
    }

    /// Parses a `run_at` timestamp, localizing timezone-naive values to the specified timezone.
    /// Accepts RFC 3339 timestamps as well as `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` and
    /// bare `YYYY-MM-DD` forms.
    pub fn resolve_run_at(value: &str, timezone: Tz) -> anyhow::Result<DateTime<Tz>> {
        if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
            return Ok(date_time.with_timezone(&timezone));
        }

        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
            .or_else(|_| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map(|date| date.and_time(NaiveTime::MIN))
            });
        let Ok(naive) = naive else {
            bail!("Cannot parse '{value}' as an ISO-8601 timestamp.");
        };

        match timezone.from_local_datetime(&naive) {
            LocalResult::Single(date_time) => Ok(date_time),
            // Pick the earliest of the two timestamps a DST fold produces.
            LocalResult::Ambiguous(earliest, _) => Ok(earliest),
            LocalResult::None => {
                bail!("Timestamp '{value}' does not exist in the '{timezone}' timezone.")
            }
        }
    }
}

/// Raw representation used to validate that only fields of the declared schedule type are set.
#[derive(Deserialize)]
struct RawTaskSchedule {
    #[serde(rename = "type")]
    schedule_type: String,
    expression: Option<String>,
    interval_seconds: Option<u64>,
    run_at: Option<String>,
}

impl<'de> Deserialize<'de> for TaskSchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawTaskSchedule::deserialize(deserializer)?;
        match raw.schedule_type.as_str() {
            "cron" => {
                if raw.interval_seconds.is_some() {
                    return Err(de::Error::custom(
                        "Cannot specify interval_seconds for cron schedule type.",
                    ));
                }
                if raw.run_at.is_some() {
                    return Err(de::Error::custom(
                        "Cannot specify run_at for cron schedule type.",
                    ));
                }
                let Some(expression) = raw.expression else {
                    return Err(de::Error::custom(
                        "Cron expression is required for cron schedule type.",
                    ));
                };
                Ok(Self::Cron { expression })
            }
            "interval" => {
                if raw.expression.is_some() {
                    return Err(de::Error::custom(
                        "Cannot specify cron expression for interval schedule type.",
                    ));
                }
                if raw.run_at.is_some() {
                    return Err(de::Error::custom(
                        "Cannot specify run_at for interval schedule type.",
                    ));
                }
                let Some(interval_seconds) = raw.interval_seconds else {
                    return Err(de::Error::custom(
                        "Interval seconds is required for interval schedule type.",
                    ));
                };
                Ok(Self::Interval { interval_seconds })
            }
            "date" => {
                if raw.expression.is_some() {
                    return Err(de::Error::custom(
                        "Cannot specify cron expression for date schedule type.",
                    ));
                }
                if raw.interval_seconds.is_some() {
                    return Err(de::Error::custom(
                        "Cannot specify interval_seconds for date schedule type.",
                    ));
                }
                let Some(run_at) = raw.run_at else {
                    return Err(de::Error::custom(
                        "run_at is required for date schedule type.",
                    ));
                };
                Ok(Self::Date { run_at })
            }
            schedule_type => Err(de::Error::custom(format!(
                "Unknown schedule type: {schedule_type}."
            ))),
        }
    }
}
