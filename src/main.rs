use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

use city_of_choices::api::http::HttpBackend;
use city_of_choices::api::local::LocalBackend;
use city_of_choices::config::settings_io::{load_settings, save_settings, settings_path};
use city_of_choices::engine::engine::spawn_engine;
use city_of_choices::engine::protocol::EngineCommand;
use city_of_choices::engine::session::GameSession;
use city_of_choices::ui::app::MyApp;

const GUEST_NAME: &str = "Wanderer";

#[derive(Debug, Parser)]
#[command(name = "city-of-choices", version)]
#[command(about = "Desktop client for the City of Choices story game")]
struct Args {
    /// Base URL of the story service, including the /api prefix
    #[arg(long)]
    base_url: Option<String>,

    /// Play offline against a story file instead of the service
    #[arg(long)]
    offline: Option<PathBuf>,

    /// Random spread added to each stat change (0 disables it)
    #[arg(long)]
    stat_variance: Option<u8>,

    /// Write the resulting settings back to the settings file
    #[arg(long)]
    save_settings: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(path) = args.offline {
        settings.offline_story = Some(path);
    }
    if let Some(variance) = args.stat_variance {
        settings.stat_variance = variance;
    }
    if args.save_settings {
        save_settings(&settings)?;
        log::info!("settings written to {}", settings_path().display());
    }

    let ui_scale = settings.ui_scale;
    let (cmd_tx, resp_rx) = match settings.offline_story.clone() {
        Some(path) => {
            log::info!("playing offline from {}", path.display());
            let backend = LocalBackend::from_path(&path)?.with_guest(GUEST_NAME);
            let (tx, rx) = spawn_engine(GameSession::new(backend, &settings));
            // The guest is signed in already.
            tx.send(EngineCommand::Start)
                .context("engine thread exited before starting")?;
            (tx, rx)
        }
        None => {
            log::info!("using story service at {}", settings.base_url);
            let backend = HttpBackend::new(settings.clone());
            spawn_engine(GameSession::new(backend, &settings))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "City of Choices",
        options,
        Box::new(move |_cc| Ok(Box::new(MyApp::new(cmd_tx, resp_rx, ui_scale)))),
    )
    .map_err(|err| anyhow::anyhow!("window failed: {err}"))
}
