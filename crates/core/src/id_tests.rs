// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn date_prefix_matches_known_epoch() {
    // 2024-06-15T23:59:30Z
    let epoch_ms = 1_718_495_970_000u64;
    assert_eq!(date_prefix(epoch_ms), "2024-06-15");
}

#[test]
fn date_prefix_epoch_zero_is_1970_01_01() {
    assert_eq!(date_prefix(0), "1970-01-01");
}

#[test]
fn job_id_has_expected_shape() {
    let id = JobId::new(1_718_495_970_000);
    let s = id.as_str();
    assert!(s.starts_with("job-2024-06-15-"));
    let suffix = s.rsplit('-').next().unwrap();
    assert_eq!(suffix.len(), 8);
    assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn job_id_generation_is_unique() {
    let a = JobId::new(1_000);
    let b = JobId::new(1_000);
    assert_ne!(a, b);
}
