// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Standard 5-field cron expression parsing and next-occurrence calculation (§4.2).
//!
//! Fields: minute (0-59) hour (0-23) day-of-month (1-31) month (1-12)
//! day-of-week (0-7, both 0 and 7 meaning Sunday). Supports commas, ranges
//! (`a-b`), and steps (`*/n` or `a-b/n`). Month and weekday names are not
//! supported (§4.2). The shorthand table (`@yearly`, `@monthly`, `@weekly`,
//! `@daily`/`@midnight`, `@hourly`) is expanded before field parsing.
//!
//! Day-of-month and day-of-week combine with POSIX cron's OR rule: when
//! *both* fields are restricted (not the bare wildcard `*`), a candidate
//! minute matches if it satisfies *either* field; if only one is
//! restricted, only that one constrains the date.
//!
//! Timezone handling: `next_after` takes a `local_offset_minutes` so callers
//! can evaluate expressions against a fixed local-time offset from UTC. This
//! is a deliberate simplification (no DST transition awareness) — see
//! DESIGN.md for the rationale.

use std::collections::BTreeSet;

/// A parsed cron expression, ready for repeated `next_after` queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    minutes: BTreeSet<u32>,
    hours: BTreeSet<u32>,
    doms: BTreeSet<u32>,
    months: BTreeSet<u32>,
    dows: BTreeSet<u32>,
    dom_wildcard: bool,
    dow_wildcard: bool,
    source: String,
}

/// Failure to parse a cron expression (§7 "Scheduling errors").
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid cron expression {expression:?}{}: {reason} (example: \"{example}\")",
    field.as_deref().map(|f| format!(" (field: {f})")).unwrap_or_default())]
pub struct CronParseError {
    pub field: Option<String>,
    pub expression: String,
    pub reason: String,
    pub example: String,
}

impl CronParseError {
    fn new(expression: &str, field: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_string),
            expression: expression.to_string(),
            reason: reason.into(),
            example: "0 0 * * *".to_string(),
        }
    }
}

fn expand_shorthand(expr: &str) -> &str {
    match expr.trim() {
        "@yearly" | "@annually" => "0 0 1 1 *",
        "@monthly" => "0 0 1 * *",
        "@weekly" => "0 0 * * 0",
        "@daily" | "@midnight" => "0 0 * * *",
        "@hourly" => "0 * * * *",
        other => other,
    }
}

/// Parse one field (e.g. `"*/15"`, `"1-5"`, `"2,4,6"`) into its value set.
///
/// Returns `(values, is_bare_wildcard)`.
fn parse_field(
    expr: &str,
    raw: &str,
    field_name: &str,
    min: u32,
    max: u32,
) -> Result<(BTreeSet<u32>, bool), CronParseError> {
    let mut values = BTreeSet::new();
    let mut any_wildcard = false;

    for item in raw.split(',') {
        let item = item.trim();
        if item.is_empty() {
            return Err(CronParseError::new(expr, Some(field_name), "empty field item"));
        }

        let (range_part, step) = match item.split_once('/') {
            Some((r, s)) => {
                let step: u32 = s.parse().map_err(|_| {
                    CronParseError::new(expr, Some(field_name), format!("invalid step {s:?}"))
                })?;
                if step == 0 {
                    return Err(CronParseError::new(expr, Some(field_name), "step cannot be 0"));
                }
                (r, step)
            }
            None => (item, 1),
        };

        let (lo, hi) = if range_part == "*" {
            any_wildcard = any_wildcard || step == 1;
            (min, max)
        } else if let Some((a, b)) = range_part.split_once('-') {
            let lo: u32 = a.parse().map_err(|_| {
                CronParseError::new(expr, Some(field_name), format!("invalid range start {a:?}"))
            })?;
            let hi: u32 = b.parse().map_err(|_| {
                CronParseError::new(expr, Some(field_name), format!("invalid range end {b:?}"))
            })?;
            if lo > hi {
                return Err(CronParseError::new(
                    expr,
                    Some(field_name),
                    format!("range start {lo} is greater than end {hi}"),
                ));
            }
            (lo, hi)
        } else {
            let n: u32 = range_part.parse().map_err(|_| {
                CronParseError::new(expr, Some(field_name), format!("invalid value {range_part:?}"))
            })?;
            (n, n)
        };

        if lo < min || hi > max {
            return Err(CronParseError::new(
                expr,
                Some(field_name),
                format!("value out of range {min}-{max}"),
            ));
        }

        let mut v = lo;
        while v <= hi {
            values.insert(v);
            v += step;
        }
    }

    Ok((values, any_wildcard))
}

impl CronSchedule {
    /// Parse a 5-field cron expression (or a recognized `@`-shorthand).
    pub fn parse(expr: &str) -> Result<Self, CronParseError> {
        let expanded = expand_shorthand(expr);
        let fields: Vec<&str> = expanded.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronParseError::new(
                expr,
                None,
                format!("expected 5 fields, got {}", fields.len()),
            ));
        }

        let (minutes, _) = parse_field(expr, fields[0], "minute", 0, 59)?;
        let (hours, _) = parse_field(expr, fields[1], "hour", 0, 23)?;
        let (doms, dom_wildcard) = parse_field(expr, fields[2], "day-of-month", 1, 31)?;
        let (months, _) = parse_field(expr, fields[3], "month", 1, 12)?;
        let (mut dows, dow_wildcard) = parse_field(expr, fields[4], "day-of-week", 0, 7)?;
        // Both 0 and 7 mean Sunday.
        if dows.remove(&7) {
            dows.insert(0);
        }

        if minutes.is_empty()
            || hours.is_empty()
            || doms.is_empty()
            || months.is_empty()
            || dows.is_empty()
        {
            return Err(CronParseError::new(expr, None, "field matches no values"));
        }

        Ok(Self { minutes, hours, doms, months, dows, dom_wildcard, dow_wildcard, source: expr.to_string() })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn date_matches(&self, dom: u32, dow: u32) -> bool {
        match (self.dom_wildcard, self.dow_wildcard) {
            (true, true) => true,
            (true, false) => self.dows.contains(&dow),
            (false, true) => self.doms.contains(&dom),
            (false, false) => self.doms.contains(&dom) || self.dows.contains(&dow),
        }
    }

    fn minute_matches(&self, min: u32, hour: u32, month: u32, dom: u32, dow: u32) -> bool {
        self.minutes.contains(&min)
            && self.hours.contains(&hour)
            && self.months.contains(&month)
            && self.date_matches(dom, dow)
    }

    /// Compute the first instant strictly after `after_epoch_ms` that matches,
    /// evaluated against a fixed local-time offset from UTC.
    ///
    /// Bounded to roughly eight years of minute-by-minute search so a
    /// malformed combination (e.g. Feb 30) fails loudly instead of looping
    /// forever.
    pub fn next_after(&self, after_epoch_ms: u64, local_offset_minutes: i64) -> Option<u64> {
        const MAX_MINUTES_SEARCHED: i64 = 8 * 366 * 24 * 60;
        let start_utc_minute = (after_epoch_ms / 60_000) as i64 + 1;

        for step in 0..MAX_MINUTES_SEARCHED {
            let utc_minute = start_utc_minute + step;
            let local_minute = utc_minute + local_offset_minutes;
            let (_, month, dom, hour, minute, dow) = civil_from_minute(local_minute);
            if self.minute_matches(minute, hour, month, dom, dow) {
                return Some((utc_minute as u64) * 60_000);
            }
        }
        None
    }
}

/// Convert minutes-since-epoch (in whatever frame the caller wants, e.g.
/// shifted by a fixed local offset) into `(year, month, day, hour, minute, dow)`
/// where `dow` is 0=Sunday..6=Saturday.
fn civil_from_minute(minute: i64) -> (i64, u32, u32, u32, u32, u32) {
    let day = minute.div_euclid(1440);
    let minute_of_day = minute.rem_euclid(1440);
    let hour = (minute_of_day / 60) as u32;
    let minute_of_hour = (minute_of_day % 60) as u32;
    let (y, m, d) = crate::id::civil_from_days(day);
    // 1970-01-01 (day 0) was a Thursday (index 4 in Sun=0..Sat=6).
    let dow = (day + 4).rem_euclid(7) as u32;
    (y, m, d, hour, minute_of_hour, dow)
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
