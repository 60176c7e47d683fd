use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod drive;
mod menu;

use drive::{ClientConfig, DriveAuth, HubDrive, ResourceDirs, SettingsStore, Workspace};
use menu::{DriveContext, Menu};

#[derive(Parser, Debug)]
#[command(name = "drive-client", version, about = "Interactive Google Drive client")]
struct Cli {
    /// Name shown in the banners
    #[arg(default_value = "drive")]
    client_name: String,
}

/// Loads the settings document. `None` means no command can run and the
/// reason has been written to `out`.
fn load_settings(config: &ClientConfig, out: &mut impl Write) -> Option<SettingsStore> {
    match SettingsStore::load(config.settings_path()) {
        Ok(settings) => Some(settings),
        Err(e) => {
            error!("Settings unavailable: {}", e);
            let _ = writeln!(out, "{}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let home = dirs::home_dir().context("Could not determine the home directory")?;
    let config = ClientConfig::new(cli.client_name, home);

    println!("=== Welcome to the {} client ===", config.client_name);

    let mut stdout = std::io::stdout();
    let Some(mut settings) = load_settings(&config, &mut stdout) else {
        return Ok(ExitCode::from(1));
    };

    let hub = match DriveAuth::create_hub(&config).await {
        Ok(hub) => hub,
        Err(e) => {
            error!("Authentication failed: {}", e);
            println!("{}", e);
            return Ok(ExitCode::from(1));
        }
    };
    let drive = HubDrive::new(hub);

    match Workspace::new(&drive).init(&mut settings).await {
        Ok(outcome) => println!("{}", outcome),
        Err(e) => println!("{}", e),
    }

    let resources = ResourceDirs::new(config.resource_dirs.clone());
    let mut ctx = DriveContext {
        config: &config,
        drive: &drive,
        resources: &resources,
        settings,
    };

    Menu::new(BufReader::new(tokio::io::stdin()), std::io::stdout())
        .run(&mut ctx)
        .await
        .context("Console I/O failed")?;

    println!("=== Goodbye from the {} client ===", config.client_name);
    Ok(ExitCode::SUCCESS)
}
