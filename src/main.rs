use std::io::IsTerminal;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aibattery::config::{Config, OutputMode, Settings};
use aibattery::output::{print_json, print_simple};
use aibattery::tray::{spawn_stdin_actions, TerminalTrayHost, TrayApp};
use aibattery::ui::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let mode = cli.output_mode(interactive);

    // Setup logging
    setup_logging(cli.debug, mode);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    match mode {
        OutputMode::Json => print_json(&settings).await,
        OutputMode::Simple => print_simple(&settings).await,
        OutputMode::Tray => {
            let host = TerminalTrayHost::new(std::io::stdout(), settings.tray.icon_path.clone());
            let mut tray = TrayApp::new(settings, host);
            tray.run(spawn_stdin_actions()).await
        }
        OutputMode::Interactive => {
            let mut app = App::new(settings);
            app.run().await
        }
    }
}

fn setup_logging(debug: bool, mode: OutputMode) {
    // Logs go to stderr so stdout stays clean for JSON. The TUI owns the
    // terminal, so it only logs errors unless debugging.
    let filter = if debug {
        EnvFilter::new("aibattery=debug,aibattery_core=debug")
    } else if mode == OutputMode::Interactive {
        EnvFilter::new("aibattery=error,aibattery_core=error")
    } else {
        EnvFilter::new("aibattery=info,aibattery_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
