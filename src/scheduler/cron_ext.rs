use croner::Cron;

/// Extends croner's `Cron` with the parsing settings used across the scheduler.
pub trait CronExt {
    /// Parses a cron pattern with an optional seconds field and day-of-month and day-of-week
    /// matched together.
    fn parse_pattern(pattern: impl AsRef<str>) -> anyhow::Result<Cron>;
}

impl CronExt for Cron {
    fn parse_pattern(pattern: impl AsRef<str>) -> anyhow::Result<Cron> {
        Ok(Cron::new(pattern.as_ref())
            .with_seconds_optional()
            .with_dom_and_dow()
            .parse()?)
    }
}
