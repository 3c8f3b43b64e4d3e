//! Tabchat - cross-tab chat console
//!
//! Opens the profile store, starts one simulated tab and reads commands
//! from stdin. Extra tabs share the store and broadcast hub.

use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use tabchat_bus::BusHub;
use tabchat_core::{Database, KeyValueStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod auth;
mod config;
mod console;

use auth::SessionAuth;
use config::AppConfig;
use console::{parse_command, Console};

fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting Tabchat");

    let mut console = match build_console(&config) {
        Ok(console) => console,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut console) {
        tracing::error!("Console failed: {}", e);
    }
    console.shutdown();
}

fn build_console(config: &AppConfig) -> tabchat_core::Result<Console> {
    let data_dir = config.data_dir()?;
    fs::create_dir_all(&data_dir)?;

    let db_path = config.profile_db_path()?;
    tracing::info!(path = %db_path.display(), "Opening profile store");
    let store: Arc<dyn KeyValueStore> = Arc::new(Mutex::new(Database::open(&db_path)?));

    let hub = BusHub::new(config.chat.bus_capacity);
    let auth = SessionAuth::new(store.clone(), config.chat.user_key.clone());
    Console::new(config.chat.clone(), store, hub, auth)
}

fn run(console: &mut Console) -> tabchat_core::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "Type /help for commands")?;

    loop {
        write!(stdout, "{}", console.prompt())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let Some(command) = parse_command(&line) else {
            continue;
        };
        if !console.execute(command, &mut stdout)? {
            break;
        }
    }
    Ok(())
}
