//! `panther hosts`.

use std::time::Duration;

use anyhow::{Context, Result};
use panther_core::{Host, LoginCredential, Target};
use panther_hosts::{HostDirectory, HostTable, HttpHostDirectory, delete_batch};
use panther_settings::PantherSettings;

use crate::cli::{AddHostArgs, HostsCommand};
use crate::render;

pub async fn run(settings: &PantherSettings, action: HostsCommand) -> Result<()> {
    let endpoint = settings
        .host_url()
        .context("invalid host endpoint in settings")?;
    let directory = HttpHostDirectory::new(
        endpoint,
        Duration::from_millis(settings.hosts.request_timeout_ms),
    )
    .context("failed to build HTTP client")?;

    match action {
        HostsCommand::List { names } => {
            let target = if names.is_empty() {
                Target::All
            } else {
                Target::hosts(names)
            };
            let mut table = HostTable::new();
            table
                .refresh(&directory, &target)
                .await
                .context("failed to fetch hosts")?;
            print!("{}", render::host_table(table.hosts()));
        }
        HostsCommand::Delete { names } => {
            let deleted = delete_batch(&directory, &names).await?;
            println!("deleted {deleted} host(s)");
        }
        HostsCommand::Add(args) => {
            let host = new_host(args);
            let stored = directory
                .create(&host)
                .await
                .with_context(|| format!("failed to add host '{}'", host.name()))?;
            println!("added {}", stored.name());
        }
    }
    Ok(())
}

fn new_host(args: AddHostArgs) -> Host {
    let mut host = Host::new(args.name);
    host.ssh_addr = Some(args.addr);
    host.ssh_port = Some(args.port);
    host.ssh_cred = match args.password {
        Some(password) => LoginCredential::with_password(args.user, &password),
        None => LoginCredential {
            user: Some(args.user),
            pass: None,
        },
    };
    host.comment = args.comment;
    host
}
