mod config;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Parser;
use panel_core::{
    view::{PanelControl, UiMode},
    worker::UnsupportedWorkerHost,
    Navigator, PanelController,
};
use shared::domain::{CsrfToken, DoorId};
use tokio::sync::mpsc;
use tracing::info;

/// Buzzes one door on the intercom server and prints every panel snapshot
/// until the feedback clears.
#[derive(Parser, Debug)]
struct Args {
    /// Door to buzz, e.g. `innerGlass`.
    #[arg(long)]
    door: String,

    /// Overrides the configured intercom base URL.
    #[arg(long)]
    server_url: Option<String>,

    /// Overrides the configured CSRF token.
    #[arg(long)]
    csrf_token: Option<String>,
}

struct ExitNavigator {
    tx: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Navigator for ExitNavigator {
    async fn redirect(&self, location: &str) {
        let _ = self.tx.send(location.to_string());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(token) = args.csrf_token {
        settings.csrf_token = Some(token);
    }

    let Some(token) = settings.csrf_token else {
        bail!("no CSRF token configured; pass --csrf-token or set PANEL__CSRF_TOKEN");
    };
    let csrf = CsrfToken::new(token).context("invalid CSRF token")?;

    let layout: Vec<PanelControl> = settings
        .doors
        .iter()
        .map(|door| PanelControl::bound(format!("buzz-{door}"), door.clone()))
        .chain([PanelControl::unbound("logout")])
        .collect();

    let (redirect_tx, mut redirect_rx) = mpsc::unbounded_channel();
    let navigator = Arc::new(ExitNavigator { tx: redirect_tx });
    let panel = PanelController::with_http_transport(
        layout,
        &settings.server_url,
        navigator,
        Arc::new(UnsupportedWorkerHost),
    )
    .context("failed to set up the buzzer transport")?;

    let mut views = panel.subscribe();
    panel.register_background_worker();

    info!(
        door = args.door.as_str(),
        server = settings.server_url.as_str(),
        "buzzing door"
    );
    panel.activate_door(DoorId::new(args.door.clone()), csrf).await?;

    loop {
        tokio::select! {
            view = views.recv() => {
                let view = view.context("view stream closed")?;
                println!("{}", serde_json::to_string(&view)?);
                if view.mode == UiMode::Idle {
                    break;
                }
            }
            Some(location) = redirect_rx.recv() => {
                bail!("session expired; log in at {location}");
            }
        }
    }

    Ok(())
}
