use crate::core::filter::FilterOutcome;
use crate::core::models::{Integration, UpdateOutcome};
use std::io::{self, Write};

const HEADER_ID: &str = "ID";
const HEADER_NAME: &str = "NAME";
const HEADER_COLD_POLL_RATE: &str = "COLD_POLL_RATE";
const COLUMN_GAP: &str = "  ";

pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Left-aligned columns padded to the widest cell, with a dashed rule under the header.
pub fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP)
    };

    writeln!(out, "{}", render(headers.to_vec()))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", render(rule.iter().map(String::as_str).collect()))?;

    for row in rows {
        let cells = (0..headers.len())
            .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
            .collect();
        writeln!(out, "{}", render(cells))?;
    }

    Ok(())
}

fn headers(show_cold_poll_rate: bool) -> Vec<&'static str> {
    if show_cold_poll_rate {
        vec![HEADER_ID, HEADER_NAME, HEADER_COLD_POLL_RATE]
    } else {
        vec![HEADER_ID, HEADER_NAME]
    }
}

pub fn write_filter_summary<W: Write>(out: &mut W, outcome: &FilterOutcome) -> io::Result<()> {
    let buckets = [
        ("disabled integrations", &outcome.disabled),
        (
            "integrations with cold poll rate already set",
            &outcome.cold_poll_set,
        ),
        (
            "integrations with metricStreamsSyncState==ENABLED",
            &outcome.streaming,
        ),
    ];

    for (label, ids) in buckets {
        if ids.is_empty() {
            continue;
        }
        writeln!(
            out,
            "Filtered out {} ({}): {}",
            label,
            ids.len(),
            ids.join(", ")
        )?;
    }

    Ok(())
}

/// Table of candidates shown before confirmation. The current poll rate column
/// only appears when existing values are about to be overridden.
pub fn write_preview<W: Write>(
    out: &mut W,
    candidates: &[Integration],
    show_cold_poll_rate: bool,
    missing_label: &str,
) -> io::Result<()> {
    let rows: Vec<Vec<String>> = candidates
        .iter()
        .filter_map(|integration| {
            let id = integration.id()?;
            let mut row = vec![
                id.to_string(),
                integration.name().unwrap_or_default().to_string(),
            ];
            if show_cold_poll_rate {
                row.push(integration.cold_poll_rate().display_minutes(missing_label));
            }
            Some(row)
        })
        .collect();

    writeln!(
        out,
        "\n{} integration{} queued for update:",
        rows.len(),
        plural(rows.len())
    )?;
    write_table(out, &headers(show_cold_poll_rate), &rows)
}

pub fn write_final_report<W: Write>(
    out: &mut W,
    outcomes: &[UpdateOutcome],
    show_cold_poll_rate: bool,
    target_minutes: u32,
) -> io::Result<()> {
    let updated: Vec<&UpdateOutcome> = outcomes.iter().filter(|o| o.success).collect();
    let failed: Vec<&UpdateOutcome> = outcomes.iter().filter(|o| !o.success).collect();

    if !outcomes.is_empty() && failed.is_empty() {
        return writeln!(
            out,
            "All updates succeeded. Adaptive polling is enabled and set to {} minutes",
            target_minutes
        );
    }

    if updated.is_empty() {
        writeln!(out, "Updated 0 integrations")?;
    } else {
        writeln!(
            out,
            "Updated {} integration{}:",
            updated.len(),
            plural(updated.len())
        )?;
        let rows: Vec<Vec<String>> = updated
            .iter()
            .map(|o| {
                let mut row = vec![o.id.clone(), o.name.clone().unwrap_or_default()];
                if show_cold_poll_rate {
                    row.push(o.target_minutes.to_string());
                }
                row
            })
            .collect();
        write_table(out, &headers(show_cold_poll_rate), &rows)?;
    }

    if !failed.is_empty() {
        writeln!(
            out,
            "Failed to update {} integration{}:",
            failed.len(),
            plural(failed.len())
        )?;
        for outcome in failed {
            writeln!(
                out,
                "  {}: {}",
                outcome.id,
                outcome.error.as_deref().unwrap_or("unknown error")
            )?;
        }
    }

    Ok(())
}
