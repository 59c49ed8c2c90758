mod action;
mod app;
mod app_state;
mod component;
mod components;
mod controller;
mod focus;
mod form;
mod job_tracker;
mod session;
mod song_table;
mod theme;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ytag_proto::client::ApiClient;
use ytag_proto::config::Config;

#[derive(Parser, Debug)]
#[command(name = "ytag", about = "Look up, tag and convert videos into songs")]
struct CliArgs {
    /// Backend base URL, API prefix included.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Tagger name recorded when the form leaves it blank.
    #[arg(long)]
    pub tagger: Option<String>,

    /// Config file to read instead of the default one.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Load the config file and lay the command line over it.
fn load_config(args: &CliArgs) -> anyhow::Result<Config> {
    let path = args.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&path)?;
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(tagger) = &args.tagger {
        config.tagger.name = tagger.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let data_dir = ytag_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = ytag_proto::platform::log_path();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides; connection-level chatter from the HTTP and
    // WebSocket stacks stays at warn.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "debug,hyper_util=warn,reqwest=warn,hyper=warn,tungstenite=warn,tokio_tungstenite=warn"
            .to_string()
    });
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("ytag log: {}", log_path.display());
    tracing::info!("ytag starting…");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("config unreadable, using defaults: {}", e);
            eprintln!("ytag: config unreadable ({}), using defaults", e);
            let mut config = Config::default();
            if let Some(url) = args.api_url {
                config.api.base_url = url;
            }
            if let Some(tagger) = args.tagger {
                config.tagger.name = tagger;
            }
            config
        }
    };

    let client = ApiClient::new(
        &config.api.base_url,
        &config.api.convert_path,
        Duration::from_secs(config.api.request_timeout_secs),
    )?;

    app::App::new(client, &config, log_path).run().await?;

    Ok(())
}
