//! `panther scan`.

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use panther_core::Target;
use panther_exec::ScanBoard;
use panther_settings::PantherSettings;

use crate::cli::ScanArgs;
use crate::render;

pub async fn run(settings: &PantherSettings, args: ScanArgs) -> Result<()> {
    let session = super::session_factory(settings)?.for_scan(Target::parse(&args.watch));
    let channel = session
        .connect()
        .await
        .context("failed to open scan session")?;
    let mut batches = channel.subscribe();
    let mut board = ScanBoard::new();
    let term = args.search.unwrap_or_default();

    loop {
        tokio::select! {
            next = batches.next() => match next {
                Some(Ok(batch)) => {
                    board.apply_batch(batch);
                    print!("{}", render::scan_table(board.search(&term)));
                    if !args.follow {
                        break;
                    }
                    println!();
                }
                Some(Err(e)) => return Err(e).context("scan stream failed"),
                None => {
                    if let Some(outcome) = channel.close_outcome() {
                        if !outcome.is_normal() {
                            bail!("scan session ended: {outcome}");
                        }
                    }
                    return Ok(());
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.disconnect().await?;
    Ok(())
}
