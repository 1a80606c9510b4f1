// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Duration string parsing (§6.2): `s`, `m`, `h`, `d` suffixes.

use std::time::Duration;

/// Parse a duration string like `"5m"`, `"1h"`, `"30s"`, `"2d"`.
///
/// A bare number with no suffix is treated as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    if num_str.is_empty() {
        return Err(format!("missing numeric value in duration: {s}"));
    }
    let num: u64 = num_str.parse().map_err(|_| format!("invalid number in duration: {s}"))?;

    let multiplier = match suffix.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        other => return Err(format!("unknown duration suffix: {other}")),
    };

    Ok(Duration::from_secs(num * multiplier))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
