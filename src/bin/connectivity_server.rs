use copper_connect::server::{handle_line, ServerState};
use copper_connect::ConnectivitySettings;
use std::io::{self, BufRead, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional settings file as the only argument
    let settings = match std::env::args().nth(1) {
        Some(path) => ConnectivitySettings::from_json_file(&path)?,
        None => ConnectivitySettings::default(),
    };

    info!("Starting connectivity server...");
    let mut state = ServerState::with_settings(settings);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Error reading stdin: {}", e);
                continue;
            }
        };

        let response = match handle_line(&mut state, &line) {
            Some(r) => r,
            None => continue,
        };

        let json = serde_json::to_string(&response)?;
        writeln!(stdout, "{}", json)?;
        stdout.flush()?;
    }

    info!("Shutting down...");
    Ok(())
}
