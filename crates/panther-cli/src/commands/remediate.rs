//! `panther remediate`.

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use panther_core::{Severity, Target};
use panther_exec::{RemediationPlan, ScanBoard, remediate};
use panther_settings::PantherSettings;

use crate::cli::RemediateArgs;
use crate::render;

pub async fn run(settings: &PantherSettings, args: RemediateArgs) -> Result<()> {
    let factory = super::session_factory(settings)?;
    let scan_session = factory.for_scan(Target::hosts([args.host.as_str()]));
    let scan = scan_session
        .connect()
        .await
        .context("failed to open scan session")?;

    let batch = scan
        .subscribe()
        .next()
        .await
        .context("scan session closed before sending results")?
        .context("scan stream failed")?;
    let mut board = ScanBoard::new();
    board.apply_batch(batch);

    let Some(row) = board.row(&args.host) else {
        scan_session.disconnect().await?;
        bail!("no scan result for host '{}'", args.host);
    };
    let severities: Vec<Severity> = if args.severity.is_empty() {
        Severity::ACTIONABLE.to_vec()
    } else {
        args.severity.iter().copied().map(Severity::from).collect()
    };
    let plan = RemediationPlan::for_severities(row, &severities);
    print!("{}", render::findings(row));

    if plan.is_empty() {
        println!("nothing to remediate on {}", args.host);
        scan_session.disconnect().await?;
        return Ok(());
    }

    let package_manager = args
        .package_manager
        .unwrap_or_else(|| settings.exec.package_manager.clone());
    let install = plan.command(&package_manager);
    println!(
        "[{}] {}",
        install.target,
        install.command.as_deref().unwrap_or_default()
    );
    if args.dry_run {
        scan_session.disconnect().await?;
        return Ok(());
    }

    let cmd_session = factory.for_cmd();
    let outcome = remediate(&cmd_session, &scan, &plan, &package_manager, render::print_line).await;
    scan_session.disconnect().await?;
    let report = outcome.context("remediation failed")?;

    if !report.is_done() {
        bail!("install did not finish before the session closed");
    }
    if report.failed > 0 {
        bail!("install failed on {}", args.host);
    }
    println!("re-scan requested for {}", args.host);
    Ok(())
}
