use std::net::IpAddr;

use anyhow::Context;
use mdns_sd::ServiceInfo;

pub use mdns_sd::ServiceDaemon;

/// Announces `instance_name` under `service_type` on the local network.
///
/// The announcement lives as long as the returned daemon.
pub fn register_mdns(service_type: &str, instance_name: &str, ip: IpAddr, port: u16) -> anyhow::Result<ServiceDaemon> {
    let mdns = ServiceDaemon::new().context("could not start mDNS daemon")?;

    let host_name = format!("{ip}.local.");
    let properties = [("path", "/api/ws")];

    let service = ServiceInfo::new(
        service_type,
        instance_name,
        &host_name,
        ip,
        port,
        &properties[..],
    ).context("invalid mDNS service description")?;

    mdns.register(service).context("could not register mDNS service")?;
    Ok(mdns)
}
