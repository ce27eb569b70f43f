use crate::api::{IntegrationApi, INTEGRATION_TYPE};
use crate::cli::confirm;
use crate::cli::report::{self, plural};
use crate::core::filter::{self, FilterPolicy};
use crate::core::models::{minutes_to_millis, Integration, RunSummary, UpdateOutcome};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

pub const DEFAULT_COLD_POLL_RATE_MINUTES: u32 = 15;
pub const DEFAULT_MISSING_LABEL: &str = "none";

const CONFIRM_PROMPT: &str = "\nProceed with updates? [y/N]: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub cold_poll_rate_minutes: u32,
    pub policy: FilterPolicy,
    pub missing_label: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cold_poll_rate_minutes: DEFAULT_COLD_POLL_RATE_MINUTES,
            policy: FilterPolicy::default(),
            missing_label: DEFAULT_MISSING_LABEL.to_string(),
        }
    }
}

/// Lists integrations, filters them, asks for confirmation and applies the
/// new cold poll rate. Failed updates do not stop the batch; they are
/// reported and turned into an error once every candidate has been tried.
pub async fn run<R: BufRead, W: Write>(
    api: &dyn IntegrationApi,
    options: &RunOptions,
    input: &mut R,
    out: &mut W,
) -> Result<RunSummary> {
    let listing = api.list_integrations().await?;

    let mut summary = RunSummary {
        found: listing.total,
        ..Default::default()
    };
    writeln!(
        out,
        "Found {} integration{} of type {}.",
        summary.found,
        plural(summary.found),
        INTEGRATION_TYPE
    )?;

    let outcome = filter::partition(listing.integrations, &options.policy);
    summary.filtered_disabled = outcome.disabled.len();
    summary.filtered_cold_poll_set = outcome.cold_poll_set.len();
    summary.filtered_streaming = outcome.streaming.len();
    summary.candidates = outcome.candidates.len();

    report::write_filter_summary(out, &outcome)?;

    if outcome.candidates.is_empty() {
        writeln!(
            out,
            "No integrations meet the provided criteria. No updates performed."
        )?;
        return Ok(summary);
    }

    let show_cold_poll_rate = options.policy.override_existing;
    report::write_preview(
        out,
        &outcome.candidates,
        show_cold_poll_rate,
        &options.missing_label,
    )?;

    summary.confirmed =
        confirm::prompt(input, out, CONFIRM_PROMPT).context("Failed to read confirmation")?;
    writeln!(out)?;

    if !summary.confirmed {
        writeln!(out, "Aborted. No updates performed.")?;
        return Ok(summary);
    }

    let outcomes =
        execute_updates(api, &outcome.candidates, options.cold_poll_rate_minutes).await;
    summary.updated = outcomes.iter().filter(|o| o.success).count();
    summary.failed = outcomes.len() - summary.updated;

    report::write_final_report(
        out,
        &outcomes,
        show_cold_poll_rate,
        options.cold_poll_rate_minutes,
    )?;
    out.flush()?;

    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} integration updates failed",
            summary.failed,
            summary.candidates
        );
    }

    Ok(summary)
}

/// Sends one update per candidate, in order, continuing past failures.
pub async fn execute_updates(
    api: &dyn IntegrationApi,
    candidates: &[Integration],
    target_minutes: u32,
) -> Vec<UpdateOutcome> {
    let millis = minutes_to_millis(target_minutes);
    let mut outcomes = Vec::with_capacity(candidates.len());

    for integration in candidates {
        let Some(id) = integration.id() else {
            continue;
        };

        let body = integration.with_cold_poll_rate_millis(millis);
        tracing::info!(id, cold_poll_rate = millis, "Updating integration");

        let error = match api.update_integration(id, &body).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(id, status = ?e.status(), error = %e, "Failed to update integration");
                Some(format!("{:#}", anyhow::Error::new(e)))
            }
        };

        outcomes.push(UpdateOutcome {
            id: id.to_string(),
            name: integration.name().map(str::to_string),
            success: error.is_none(),
            target_minutes,
            error,
        });
    }

    outcomes
}
