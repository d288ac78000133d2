use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LogCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `certify log`.
pub async fn handle(action: &LogCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        LogCommands::Errors { since } => {
            let since = match since {
                Some(value) => parse_since(value)?,
                None => (Utc::now() - TimeDelta::hours(24)).naive_utc(),
            };
            let count = ctx.service.db().log_error_count(since).await?;
            output(
                &json!({ "since": since.format("%Y-%m-%d %H:%M:%S").to_string(), "errors": count }),
                flags.format,
            )
        }
        LogCommands::Recent { limit } => {
            output(&ctx.service.db().recent_log(*limit).await?, flags.format)
        }
    }
}

fn parse_since(value: &str) -> anyhow::Result<NaiveDateTime> {
    let value = value.trim();
    if let Ok(at) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(at);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|day| day.and_time(chrono::NaiveTime::MIN))
        .with_context(|| format!("invalid --since '{value}', expected YYYY-MM-DD [HH:MM:SS]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn since_accepts_date_or_datetime() {
        assert_eq!(
            parse_since("2026-03-01").unwrap().to_string(),
            "2026-03-01 00:00:00"
        );
        assert_eq!(
            parse_since("2026-03-01 08:30:00").unwrap().to_string(),
            "2026-03-01 08:30:00"
        );
        assert!(parse_since("yesterday").is_err());
    }
}
