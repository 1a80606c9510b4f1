// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human/JSON rendering for `herdctl` command output (§6.4).

use clap::ValueEnum;
use herdctl_core::{OutputRecord, OutputRecordKind, ScheduleState};
use herdctl_fleet::{AgentInfo, FleetStatus, TriggerOutcome};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a timestamp as relative time ("5s", "2m", "1h", "3d"), or "-" for
/// the zero/unset sentinel.
pub fn format_time_ago(epoch_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    let now_ms = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
    let elapsed_secs = now_ms.saturating_sub(epoch_ms) / 1000;
    if elapsed_secs < 60 {
        format!("{elapsed_secs}s")
    } else if elapsed_secs < 3600 {
        format!("{}m", elapsed_secs / 60)
    } else if elapsed_secs < 86_400 {
        format!("{}h", elapsed_secs / 3600)
    } else {
        format!("{}d", elapsed_secs / 86_400)
    }
}

pub fn print_fleet_status(status: &FleetStatus, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(status),
        OutputFormat::Text => {
            println!(
                "{} {}",
                crate::color::header("fleet:"),
                crate::color::literal(&status.lifecycle.to_string())
            );
            if let Some(started_at) = status.started_at {
                println!("  started {} ago", format_time_ago(started_at));
            }
            if status.agents.is_empty() {
                println!("  (no agents configured)");
                return;
            }
            let mut names: Vec<&String> = status.agents.keys().collect();
            names.sort();
            println!("\n{:<20} {:<10} {:<8} {:<8}", "AGENT", "STATUS", "RUNNING", "QUEUED");
            for name in names {
                let info = &status.agents[name];
                println!(
                    "{:<20} {:<10} {:<8} {:<8}",
                    name,
                    info.status.to_string(),
                    format!("{}/{}", info.running_count, info.max_concurrent),
                    info.queue_len
                );
            }
        }
    }
}

pub fn print_agent_info(info: &AgentInfo, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(info),
        OutputFormat::Text => {
            println!("{} {}", crate::color::header("agent:"), crate::color::literal(&info.name));
            println!("  status:          {}", info.status);
            println!("  running/limit:   {}/{}", info.running_count, info.max_concurrent);
            println!("  queued:          {}", info.queue_len);
            if let Some(job) = &info.current_job {
                println!("  current job:     {job}");
            }
            if let Some(job) = &info.last_job {
                println!("  last job:        {job}");
            }
            if let Some(message) = &info.error_message {
                println!("  error:           {message}");
            }
        }
    }
}

pub fn print_schedules(schedules: &HashMap<String, ScheduleState>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(schedules),
        OutputFormat::Text => {
            if schedules.is_empty() {
                println!("(no schedules)");
                return;
            }
            let mut names: Vec<&String> = schedules.keys().collect();
            names.sort();
            println!("{:<20} {:<10} {:<12} {:<12}", "SCHEDULE", "STATUS", "LAST RUN", "NEXT RUN");
            for name in names {
                let state = &schedules[name];
                println!(
                    "{:<20} {:<10} {:<12} {:<12}",
                    name,
                    state.status.to_string(),
                    state.last_run_at.map(format_time_ago).unwrap_or_else(|| "-".into()),
                    state.next_run_at.map(format_time_ago).unwrap_or_else(|| "-".into()),
                );
            }
        }
    }
}

pub fn print_trigger_outcome(outcome: &TriggerOutcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(outcome),
        OutputFormat::Text => {
            println!("{} {}", crate::color::header("job created:"), crate::color::literal(outcome.job_id.as_str()));
            println!("  agent:  {}", outcome.agent);
            if let Some(schedule) = &outcome.schedule {
                println!("  schedule: {schedule}");
            }
        }
    }
}

pub fn print_output_record(record: &OutputRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Text => {
            let kind = match record.kind {
                OutputRecordKind::System => "system",
                OutputRecordKind::Assistant => "assistant",
                OutputRecordKind::User => "user",
                OutputRecordKind::Tool => "tool",
                OutputRecordKind::Error => "error",
            };
            println!("[{kind}] {}", record.content.as_deref().unwrap_or(""));
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to serialize output as JSON: {err}"),
    }
}
