//! `mailview` - headless message viewer
//!
//! Drives the load pipeline against a local `SQLite` store and a simulated
//! remote service, printing view events to the terminal.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod commands;
mod fetcher;
mod printer;
mod seed;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mailview_core::{
    AttachmentSink, Collaborators, ContentStore, FileSystemSink, LoadCoordinator, MessageId,
    MessageOrder, RemoteFetcher, SqliteContentStore, ViewCommand, ViewEvent, ViewerSettings,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::Parsed;
use fetcher::SimulatedFetcher;

/// How long the simulated service takes per request.
const FETCH_DELAY: Duration = Duration::from_millis(1500);

fn database_path() -> PathBuf {
    std::env::var_os("MAILVIEW_DB").map_or_else(
        || {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mailview")
                .join("mail.db")
        },
        PathBuf::from,
    )
}

fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("mailview")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailview=debug,mailview_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting mailview");

    let settings = ViewerSettings::load()
        .await
        .context("failed to load viewer settings")?;

    let db_path = database_path();
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let store = Arc::new(
        SqliteContentStore::new(&db_path.to_string_lossy())
            .await
            .with_context(|| format!("failed to open {}", db_path.display()))?,
    );

    let mut order = MessageOrder::from_store(&store, seed::DEMO_MAILBOX).await?;
    if order.is_empty() {
        seed::seed_demo(&store, &cache_dir()).await?;
        order = MessageOrder::from_store(&store, seed::DEMO_MAILBOX).await?;
    }

    let first = std::env::args()
        .nth(1)
        .map(|arg| arg.parse().map(MessageId))
        .transpose()
        .context("message id must be a number")?
        .or_else(|| order.first());

    let fetcher = SimulatedFetcher::new(Arc::clone(&store), cache_dir(), FETCH_DELAY);
    let sink = FileSystemSink::new(settings.resolved_download_dir());
    let collaborators = Collaborators {
        store: store as Arc<dyn ContentStore>,
        fetcher: Arc::new(fetcher) as Arc<dyn RemoteFetcher>,
        sink: Arc::new(sink) as Arc<dyn AttachmentSink>,
        cursor: Some(Box::new(order)),
    };

    let (coordinator, mut events) = LoadCoordinator::new(collaborators, settings);
    let handle = coordinator.handle();
    let view = tokio::spawn(coordinator.run());

    let (abandoned_tx, mut abandoned) = oneshot::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(line) = printer::describe(&event) {
                println!("{line}");
            }
            if event == ViewEvent::AbandonView {
                let _ = abandoned_tx.send(());
                break;
            }
        }
    });

    match first {
        Some(id) => {
            handle.send(ViewCommand::Focus {
                id,
                allow_remote_fetch: true,
            });
        }
        None => println!("Mailbox is empty."),
    }
    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    handle.close();
                    break;
                };
                match commands::parse(&line) {
                    Ok(Some(Parsed::Command(command))) => {
                        let quit = command == ViewCommand::Close;
                        if !handle.send(command) || quit {
                            break;
                        }
                    }
                    Ok(Some(Parsed::Help)) => println!("{}", commands::HELP),
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
            _ = &mut abandoned => {
                handle.close();
                break;
            }
        }
    }

    view.await?;
    printer.abort();
    info!("mailview stopped");
    Ok(())
}
