use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use aibattery_core::refresh::UsageView;

use super::host::TrayHost;
use super::icon::render_icon;
use super::menu::{build_menu, tray_title, TrayAction};
use crate::config::Settings;
use crate::source::build_refresher;

/// State owned by the tray loop
#[derive(Debug, Default)]
pub struct TrayState {
    pub view: UsageView,
}

/// Tray surface: refresh loop driving a `TrayHost`
pub struct TrayApp<H: TrayHost> {
    settings: Settings,
    host: H,
    state: TrayState,
}

impl<H: TrayHost> TrayApp<H> {
    pub fn new(settings: Settings, host: H) -> Self {
        Self {
            settings,
            host,
            state: TrayState::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn state(&self) -> &TrayState {
        &self.state
    }

    /// Run until a quit action or Ctrl-C
    pub async fn run(&mut self, mut actions: mpsc::Receiver<TrayAction>) -> Result<()> {
        let refresher = build_refresher(
            &self.settings.source,
            self.settings.tray.refresh_interval_secs,
        );
        let (handle, mut events) = refresher.start();
        let mut actions_open = true;

        info!("Tray started");
        self.publish()?;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.state.view.apply(event, Utc::now());
                        self.publish()?;
                    }
                    None => break,
                },
                action = actions.recv(), if actions_open => match action {
                    Some(TrayAction::Refresh) => {
                        if !self.state.view.is_loading() && handle.request() {
                            self.state.view.begin();
                            self.publish()?;
                        }
                    }
                    Some(TrayAction::Quit) => break,
                    None => {
                        debug!("Tray action channel closed");
                        actions_open = false;
                    }
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        info!("Tray stopped");
        Ok(())
    }

    /// Push title, menu and icon to the host
    fn publish(&mut self) -> Result<()> {
        let view = &self.state.view;
        self.host.set_title(&tray_title(view))?;
        self.host
            .set_menu(&build_menu(view, self.settings.tray.bar_width, Utc::now()))?;

        if let Some(ref snapshot) = view.snapshot {
            let icon = render_icon(
                snapshot.session.battery().percent_remaining,
                snapshot.weekly.battery().percent_remaining,
            );
            if let Err(e) = self.host.set_icon(&icon) {
                warn!("Failed to update tray icon: {:#}", e);
            }
        }
        Ok(())
    }
}
