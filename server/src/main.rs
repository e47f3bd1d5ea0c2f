use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use context::TrackerContext;
use discoverable_service::{register_mdns, ServiceDaemon};
use fleet::Fleet;
use geocode::{Geocoder, DEFAULT_NOMINATIM_URL};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warp::reject::Rejection;

mod context;
mod fleet;
mod geocode;
mod handler;
mod tracking;
mod ws;

type Result<T> = std::result::Result<T, Rejection>;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Pushes live bus positions to dashboards")]
struct Args {
    /// HTTP and websocket port
    #[arg(long, env = "TRACKER_PORT", default_value = "5000")]
    port: u16,

    /// JSON list of buses to track instead of the bundled fleet
    #[arg(long, env = "TRACKER_FLEET")]
    fleet: Option<PathBuf>,

    /// Nominatim instance used for reverse geocoding
    #[arg(long, env = "TRACKER_GEOCODER_URL", default_value = DEFAULT_NOMINATIM_URL)]
    geocoder_url: String,

    /// Skip reverse geocoding, every place is "Unknown Location"
    #[arg(long)]
    no_geocode: bool,

    /// Do not announce the server over mDNS
    #[arg(long)]
    no_mdns: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let fleet = match &args.fleet {
        Some(path) => Fleet::load(path)?,
        None => Fleet::seeded()?,
    };
    tracing::info!("tracking {} buses", fleet.len());

    let geocoder = if args.no_geocode {
        Geocoder::Disabled
    } else {
        Geocoder::nominatim(&args.geocoder_url)?
    };

    let context_ref = TrackerContext::new(fleet, geocoder).into_ref();
    let routes = handler::routes(context_ref);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("could not listen for ctrl-c: {e}");
            }
        })
        .with_context(|| format!("failed to bind to port {}, is another server running?", args.port))?;

    tracing::info!("listening on http://{addr}");

    let _mdns = if args.no_mdns {
        None
    } else {
        announce(args.port)
    };

    server.await;
    tracing::info!("server stopped");
    Ok(())
}

fn announce(port: u16) -> Option<ServiceDaemon> {
    let local_ip = match local_ip_address::local_ip() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::warn!("no local network address, skipping mDNS announcement: {e}");
            return None;
        }
    };
    tracing::info!("network: http://{local_ip}:{port}");

    match register_mdns(msgs::SERVICE_TYPE, "bus_tracker", local_ip, port) {
        Ok(mdns) => {
            tracing::info!("announced via mDNS as {}", msgs::SERVICE_TYPE);
            Some(mdns)
        }
        Err(e) => {
            tracing::warn!("mDNS announcement failed: {e:#}");
            None
        }
    }
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
