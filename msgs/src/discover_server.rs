use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};

use anyhow::Context;
use mdns_sd::{ServiceDaemon, ServiceEvent};

use crate::SERVICE_TYPE;

/// Browses mDNS for a tracker server and returns its `host:port`.
///
/// Blocks the calling thread for at most `timeout`.
pub fn find_local_server(timeout: Duration) -> anyhow::Result<Option<String>> {
    let mdns = ServiceDaemon::new().context("could not start mDNS daemon")?;
    let receiver = mdns.browse(SERVICE_TYPE).context("could not browse for tracker servers")?;

    let deadline = Instant::now() + timeout;
    let mut found = None;

    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match receiver.recv_timeout(remaining) {
            Ok(ServiceEvent::ServiceResolved(info)) => {
                let addresses = info.get_addresses();
                let addr = addresses
                    .iter()
                    .find(|addr| addr.is_ipv4())
                    .or_else(|| addresses.iter().next());
                if let Some(addr) = addr {
                    found = Some(SocketAddr::new(*addr, info.get_port()).to_string());
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }

    if let Err(e) = mdns.shutdown() {
        tracing::debug!("mDNS daemon shutdown failed: {e}");
    }
    Ok(found)
}
