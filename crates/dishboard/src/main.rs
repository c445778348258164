//! `dishboard` command-line front end: runs the server or talks to one.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dishboard::{init_logging, render_dishes, render_state};
use dishboard_client::{
    ConnectionState, Dashboard, DishClient, ReconnectPolicy, Subscriber, SyncPhase,
};
use dishboard_config::{DishboardConfig, LayeredConfigOptions};
use dishboard_protocol::{CreateDish, DishPatch};
use dishboard_server::{DishServer, shutdown_signal};
use log::{debug, info};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Command-line options for dishboard.
#[derive(Parser)]
#[command(name = "dishboard", version)]
struct Cli {
    /// Optional path to a dishboard.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// API base URL, overriding the configured client URL
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Port override
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print every dish ordered by name
    List,
    /// Create a dish
    Create {
        dish_id: String,
        dish_name: String,
        image_url: String,
        #[arg(long)]
        published: bool,
    },
    /// Replace some fields of a dish
    Update {
        dish_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        published: Option<bool>,
    },
    /// Delete a dish
    Delete { dish_id: String },
    /// Flip the publish flag of a dish
    Toggle { dish_id: String },
    /// Show the collection and keep it current from live events
    Watch,
    /// Check that the server is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let api_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.client.api_url.clone());
    let client = DishClient::new(api_url);
    match cli.command {
        Command::Serve { port } => serve(config, port).await?,
        Command::List => {
            let response = client.list().await.context("failed to list dishes")?;
            println!("{}", render_dishes(&response.data));
        }
        Command::Create {
            dish_id,
            dish_name,
            image_url,
            published,
        } => {
            let body = CreateDish::new(dish_id, dish_name, image_url).published(published);
            let response = client.create(&body).await.context("create failed")?;
            println!("{}", response.message);
            println!("{}", render_dishes(&[response.data]));
        }
        Command::Update {
            dish_id,
            name,
            image,
            published,
        } => {
            let patch = DishPatch {
                dish_name: name,
                image_url: image,
                is_published: published,
            };
            let response = client
                .update(&dish_id, &patch)
                .await
                .context("update failed")?;
            println!("{}", response.message);
            println!("{}", render_dishes(&[response.data]));
        }
        Command::Delete { dish_id } => {
            let response = client.delete(&dish_id).await.context("delete failed")?;
            println!("{}", response.message);
        }
        Command::Toggle { dish_id } => {
            let response = client.toggle(&dish_id).await.context("toggle failed")?;
            println!("{}", response.message);
            println!("{}", render_dishes(&[response.data]));
        }
        Command::Watch => watch(client, &config).await?,
        Command::Health => {
            let response = client.health().await.context("health check failed")?;
            println!("{} ({})", response.message, response.timestamp.to_rfc3339());
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DishboardConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = path {
        info!("loading config with runtime layer: {}", path.display());
        options = options.with_runtime_path(path);
    }
    let layered = DishboardConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

async fn serve(mut config: DishboardConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    info!(
        "starting server (address={}, store={})",
        config.server.bind_address(),
        config.store.url
    );
    let server = DishServer::bind(&config)
        .await
        .context("failed to start server")?;
    server
        .serve(shutdown_signal())
        .await
        .context("server terminated")?;
    Ok(())
}

async fn watch(client: DishClient, config: &DishboardConfig) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new(client, config.client.notice_limit);
    if let SyncPhase::Failed { message } = dashboard.mount().await {
        bail!("failed to load dishes: {message}");
    }
    println!("{}", render_dishes(dashboard.dishes()));

    let url = dashboard.client().websocket_url()?;
    let (sender, mut events) = mpsc::channel(64);
    let subscriber = Subscriber::spawn(
        url,
        ReconnectPolicy::from(&config.client.reconnect),
        sender,
    );
    let mut state = subscriber.watch_state();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if dashboard.handle_event(&event) {
                    println!("-- {} {}", event.name(), event.dish_id());
                    println!("{}", render_dishes(dashboard.dishes()));
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                println!("-- {}", render_state(current));
                if current == ConnectionState::Disconnected {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    subscriber.stop();
    Ok(())
}
