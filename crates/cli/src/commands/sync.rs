//! `kinds`, `preview` and `sync`.

use shop_sync_core::{ResourceKind, SyncDirection, SyncReport};
use shop_sync_dashboard::AppState;
use shop_sync_dashboard::sync::DiffPreview;

use super::{CommandError, Output};

#[derive(serde::Serialize)]
struct KindRow {
    kind: ResourceKind,
    create: bool,
    update: bool,
}

/// List registered kinds.
pub fn kinds(state: &AppState, output: Output) -> Result<(), CommandError> {
    let rows: Vec<KindRow> = state
        .orchestrator()
        .registry()
        .kinds()
        .map(|(kind, caps)| KindRow {
            kind,
            create: caps.create,
            update: caps.update,
        })
        .collect();

    output.emit(&rows, |rows| {
        rows.iter()
            .map(|row| {
                let mode = match (row.create, row.update) {
                    (true, true) => "create + update",
                    (false, true) => "update only",
                    (true, false) => "create only",
                    (false, false) => "report only",
                };
                format!("{:<16} {mode}", row.kind.slug())
            })
            .collect()
    })
}

/// Print a read-only diff.
pub async fn preview(
    state: &AppState,
    kind: ResourceKind,
    direction: SyncDirection,
    output: Output,
) -> Result<(), CommandError> {
    let preview = state.orchestrator().preview(kind, direction).await?;
    output.emit(&preview, preview_lines)
}

/// Run a sync and print its report.
///
/// Fails with [`CommandError::ItemsFailed`] when any item failed, so the
/// process exits non-zero.
pub async fn sync(
    state: &AppState,
    kind: ResourceKind,
    direction: SyncDirection,
    output: Output,
) -> Result<(), CommandError> {
    let report = state.orchestrator().run(kind, direction).await?;
    output.emit(&report, report_lines)?;

    if report.total_failed > 0 {
        return Err(CommandError::ItemsFailed(report.total_failed));
    }
    Ok(())
}

fn preview_lines(preview: &DiffPreview) -> Vec<String> {
    let summary = &preview.summary;
    let mut lines = vec![format!(
        "{} ({}): {} -> {}",
        preview.kind,
        preview.direction.label(),
        preview.source,
        preview.target
    )];
    lines.extend(summary.missing_in_target.iter().map(|t| format!("  + {t}")));
    lines.extend(
        summary
            .differing
            .iter()
            .map(|d| format!("  ~ {} [{}]", d.title, d.changed_fields.join(", "))),
    );
    lines.extend(
        summary
            .invalid
            .iter()
            .map(|i| format!("  ! {} ({})", i.title, i.reason)),
    );
    lines.push(format!(
        "{} missing, {} differing, {} matching, {} invalid",
        summary.missing_in_target.len(),
        summary.differing.len(),
        summary.matching.len(),
        summary.invalid.len()
    ));
    lines
}

fn report_lines(report: &SyncReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .filter(|o| !matches!(o.status, shop_sync_core::OutcomeStatus::Unchanged))
        .map(|o| format!("  {}: {}", o.title, o.status))
        .collect();
    lines.push(report.message.clone());
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use shop_sync_core::{OutcomeStatus, SyncOutcome};

    #[test]
    fn test_report_lines_skip_unchanged() {
        let report = SyncReport::from_outcomes(
            ResourceKind::Tags,
            SyncDirection::StageToProd,
            vec![
                SyncOutcome::new(Some("a".into()), "A", OutcomeStatus::Unchanged),
                SyncOutcome::new(Some("b".into()), "B", OutcomeStatus::Failed("HTTP 422".into())),
            ],
        );

        let lines = report_lines(&report);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "  B: failed: HTTP 422");
        assert_eq!(lines[1], report.message);
    }
}
