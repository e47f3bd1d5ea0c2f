use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use connection::spawn_server_connection_process;
use console_cmd::{ConsoleCmd, HELP};
use console_input::console_input_thread;
use console_view::{ConsoleMapView, PopupFormat};
use marker_sync::{EventReceiver, MapView, MarkerStore};
use msgs::{discover_server::find_local_server, Location};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod connection;
mod console_cmd;
mod console_input;
mod console_view;
mod server_address;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Follows the bus fleet from the terminal")]
struct Args {
    /// Tracker server as host:port or URL; discovered over mDNS when omitted
    #[arg(long, env = "TRACKER_SERVER")]
    server: Option<String>,

    /// How long to look for a server over mDNS
    #[arg(long, default_value = "5")]
    discover_timeout_secs: u64,

    /// Print popups as the HTML a map widget would show
    #[arg(long)]
    html_popups: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let server = match args.server {
        Some(server) => server,
        None => discover(Duration::from_secs(args.discover_timeout_secs)).await?,
    };

    // connect before taking the snapshot, events pushed meanwhile wait in the channel
    let (server_to_main, mut main_from_server) = mpsc::channel(100);
    let to_server = spawn_server_connection_process(&server_address::ws_url(&server), server_to_main).await?;

    let http_client = reqwest::Client::new();
    let locations = fetch_locations(&http_client, &server_address::http_base(&server)).await?;
    let mut store = MarkerStore::from_locations(&locations);
    tracing::info!("placed {} markers", store.len());

    let popup_format = if args.html_popups { PopupFormat::Html } else { PopupFormat::Text };
    let mut receiver = EventReceiver::new(ConsoleMapView::new(std::io::stdout(), popup_format));
    let replayed = drain_pending(&mut receiver, &mut store, &mut main_from_server);
    if replayed > 0 {
        tracing::debug!("replayed {replayed} events received while loading markers");
    }

    let mut console_receiver = console_input_thread();
    println!("{HELP}");

    loop {
        tokio::select! {
            frame = main_from_server.recv() => {
                let Some(frame) = frame else {
                    tracing::info!("connection lost, exiting");
                    break;
                };
                receiver.handle_frame(&mut store, &frame);
            }
            line = console_receiver.recv() => {
                let Some(line) = line else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match ConsoleCmd::parse(line) {
                    Ok(cmd) => run_cmd(cmd, &store, &mut receiver, &to_server).await?,
                    Err(err) => println!("err: {err}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

/// Applies every frame that is already queued, returns how many there were.
fn drain_pending<V: MapView>(receiver: &mut EventReceiver<V>, store: &mut MarkerStore, frames: &mut mpsc::Receiver<String>) -> usize {
    let mut count = 0;
    while let Ok(frame) = frames.try_recv() {
        receiver.handle_frame(store, &frame);
        count += 1;
    }
    count
}

async fn run_cmd<V: MapView>(
    cmd: ConsoleCmd,
    store: &MarkerStore,
    receiver: &mut EventReceiver<V>,
    to_server: &mpsc::Sender<String>,
) -> anyhow::Result<()> {
    match cmd {
        ConsoleCmd::Send(msg) => {
            let frame = msg.encode().context("could not encode message")?;
            to_server.send(frame).await.context("connection to server is closed")?;
        }
        ConsoleCmd::Markers => {
            for id in store.sorted_ids() {
                let Some(marker) = store.get(id) else { continue };
                let lock = if marker.locked { " (locked)" } else { "" };
                println!(
                    "{id}: bus {} on {} at ({}, {}){lock}",
                    marker.label.bus_number, marker.label.route_name, marker.position.lat, marker.position.lng
                );
            }
        }
        ConsoleCmd::Show(id) => match store.get(id.as_str()) {
            Some(marker) => receiver.view_mut().bind_popup(&marker.id, &marker.label),
            None => println!("no marker {id}"),
        },
        ConsoleCmd::Help => println!("{HELP}"),
    }
    Ok(())
}

async fn discover(timeout: Duration) -> anyhow::Result<String> {
    tracing::info!("looking for a tracker server over mDNS");
    let found = tokio::task::spawn_blocking(move || find_local_server(timeout))
        .await
        .context("discovery task failed")??;
    match found {
        Some(server) => {
            tracing::info!("found server at {server}");
            Ok(server)
        }
        None => bail!("no tracker server found, pass --server"),
    }
}

async fn fetch_locations(client: &reqwest::Client, base_url: &str) -> anyhow::Result<Vec<Location>> {
    let url = format!("{base_url}/api/locations");
    let locations = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("could not reach {url}"))?
        .error_for_status()?
        .json::<Vec<Location>>()
        .await
        .context("server sent an invalid fleet")?;
    Ok(locations)
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init();
    }
}
