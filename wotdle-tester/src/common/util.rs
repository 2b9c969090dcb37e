use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated list of vehicle ids.
pub fn parse_ids(s: &str) -> Result<Vec<i64>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<i64>()
                .with_context(|| format!("invalid vehicle id '{token}'"))
        })
        .collect()
}

/// Parse `--at`: an RFC 3339 instant, or a bare `YYYY-MM-DD` meaning noon UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("expected RFC 3339 or YYYY-MM-DD, got '{s}'"))?;
    let noon: NaiveDateTime = date
        .and_hms_opt(12, 0, 0)
        .context("invalid time of day")?;
    Ok(Utc.from_utc_datetime(&noon))
}
