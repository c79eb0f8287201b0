//! `panther exec`.

use anyhow::{Context, Result, bail};
use panther_core::Order;
use panther_exec::CommandDispatch;
use panther_settings::PantherSettings;

use crate::cli::ExecArgs;
use crate::render;

pub async fn run(settings: &PantherSettings, args: ExecArgs) -> Result<()> {
    let command = args.command.join(" ");
    let order = Order::broadcast(args.targets.iter().map(String::as_str), &command);

    let session = super::session_factory(settings)?.for_cmd();
    let channel = session
        .connect()
        .await
        .context("failed to open exec session")?;

    let mut dispatch = CommandDispatch::new(order);
    let outcome = dispatch.run(&channel, render::print_line).await;
    session.disconnect().await?;
    let report = outcome.context("command dispatch failed")?;

    if !report.is_done() {
        bail!(
            "only {} of {} command(s) finished before the session closed",
            report.completed,
            report.expected
        );
    }
    if report.failed > 0 {
        bail!("{} of {} command(s) failed", report.failed, report.expected);
    }
    Ok(())
}
