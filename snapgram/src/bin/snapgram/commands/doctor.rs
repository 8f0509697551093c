use anyhow::{Context, Result};
use snapgram::{DocumentStore, workflows::integrity::check_integrity};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Integrity",
    commands: &[
        "snapgram doctor                      # report follow, bookmark and like-counter drift",
        "snapgram doctor --output json",
    ],
}];

/// Reports dual-write drift. Exits non-zero when drift is found so it can gate scripts.
pub async fn handle_doctor<S: DocumentStore>(ctx: &AppContext<S>, output: &OutputManager) -> Result<bool> {
    let report = check_integrity(&ctx.client).await.context("Integrity scan failed")?;

    output.heading("Integrity");
    output.key_value("users checked", &report.users_checked.to_string());
    output.key_value("posts checked", &report.posts_checked.to_string());

    if report.is_clean() {
        output.success("No drift found");
        if output.is_json() {
            output.display(&report)?;
        }
    } else {
        output.warning(&format!("{} drift(s) found; they are reported, not repaired", report.drifts.len()));
        output.display(&report)?;
    }
    Ok(report.is_clean())
}
