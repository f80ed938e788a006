//! One formatting run, from locating the timesheet to writing the output
//!
//! Stages run strictly in order and every failure ends the run. The
//! redacted intermediate lives in a temporary directory next to the program
//! and is removed when the run ends, whether it succeeded or not.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::info;

use crate::config::Settings;
use crate::diagnostics::{DiagnosticContext, RunState};
use crate::error::Result;
use crate::locate::find_latest_file;
use crate::names::{load_excluded_names, ExcludedName};
use crate::naming::output_path;
use crate::pdf::{find_excluded_pages, merge, redact, ExcludedPages, MergeSummary};

/// File name of the redacted intermediate inside its temporary directory
const INTERMEDIATE_NAME: &str = "redacted.pdf";

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub excluded: ExcludedPages,
    pub summary: MergeSummary,
}

/// Run every stage, recording progress in `ctx`.
///
/// `started` is the run timestamp used in the output file name.
pub fn run(settings: &Settings, started: &NaiveDateTime, ctx: &mut DiagnosticContext) -> Result<RunOutcome> {
    match run_stages(settings, started, ctx) {
        Ok(outcome) => {
            ctx.advance(RunState::Done)?;
            Ok(outcome)
        }
        Err(e) => {
            ctx.record("error", &e);
            ctx.fail();
            Err(e)
        }
    }
}

fn run_stages(settings: &Settings, started: &NaiveDateTime, ctx: &mut DiagnosticContext) -> Result<RunOutcome> {
    let source = find_latest_file(&settings.search)?;
    let output = output_path(&settings.output_dir, &settings.output_prefix, started, &source);
    ctx.record("source", source.display());
    ctx.record("output", output.display());
    ctx.advance(RunState::Located)?;

    let mut names = load_excluded_names(&settings.excluded_names_dir, &settings.excluded_names_file)?;
    ctx.record("excluded_names", names.len());

    info!(source = %source.display(), "reading pages");
    let excluded = find_excluded_pages(&source, &mut names)?;
    ctx.record("excluded_pages", format!("{:?}", excluded.iter().collect::<Vec<_>>()));
    ctx.record(
        "unmatched_names",
        names.iter().map(ExcludedName::as_str).collect::<Vec<_>>().join(", "),
    );
    ctx.advance(RunState::Classified)?;

    let work_dir = tempfile::Builder::new()
        .prefix("ts-format-")
        .tempdir_in(&settings.work_dir)?;
    let intermediate = work_dir.path().join(INTERMEDIATE_NAME);
    ctx.record("intermediate", intermediate.display());

    info!("removing footer");
    let source_pages = redact(&source, &settings.redaction, &intermediate)?;
    ctx.record("source_pages", source_pages);
    ctx.advance(RunState::Redacted)?;

    info!(watermark = %settings.watermark.display(), "adding signature lines");
    let summary = merge(&intermediate, &settings.watermark, &excluded, &output)?;
    ctx.record("written_pages", summary.written_pages);
    ctx.advance(RunState::Merged)?;

    work_dir.close()?;

    Ok(RunOutcome {
        source,
        output,
        excluded,
        summary,
    })
}
