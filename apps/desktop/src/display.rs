use std::{io::Write, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use client_core::{DisplayPresenter, StatusClient, StoreConnection};
use tracing::{info, warn};

use crate::render;

/// Passive display: redraws on every pushed record and once a second for the clock.
pub async fn run(connection: Arc<StoreConnection>) -> Result<()> {
    let mut client = StatusClient::start_display(connection).await;
    if !client.is_subscribed() {
        warn!("display: no live subscription, showing last known status");
    }
    info!("display: started");

    let mut changes = client.view().changes();
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    loop {
        let frame = DisplayPresenter::present(&changes.borrow_and_update(), &Local::now());
        print!("{}", render::display_screen(&frame));
        std::io::stdout().flush().context("failed to flush stdout")?;

        tokio::select! {
            _ = tick.tick() => {}
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    client.shutdown();
    info!("display: stopped");
    Ok(())
}
