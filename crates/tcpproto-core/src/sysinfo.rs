//! The `SYSINFO` payload a client may attach to every outbound request.
//!
//! Collection is treated as opaque by the wire protocol: the server never
//! interprets the JSON blob, it only stores and forwards it to whatever
//! middleware or callback wants it (via `request.headers["SYSINFO"]`).

use mac_address::get_mac_address;
use serde::Serialize;
use sysinfo::System;

/// A snapshot of the local machine, serialized as the `SYSINFO` header
/// value.
#[derive(Debug, Clone, Serialize)]
pub struct SysInfo {
    /// The machine's hostname.
    pub hostname: String,
    /// The OS platform/distribution name.
    pub platform: String,
    /// The first detected CPU's brand string.
    pub cpu: String,
    /// Total RAM, in megabytes.
    pub ram: u64,
    /// Combined capacity of all detected disks, in megabytes.
    pub disk: u64,
    /// The primary network interface's MAC address, if one could be found.
    pub macaddr: Option<String>,
}

impl SysInfo {
    /// Collects a fresh snapshot from the local machine.
    #[must_use]
    pub fn collect() -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        let hostname = System::host_name().unwrap_or_default();
        let platform = System::long_os_version().unwrap_or_else(|| System::name().unwrap_or_default());
        let cpu = system.cpus().first().map(|c| c.brand().trim().to_string()).unwrap_or_default();
        let ram = system.total_memory() / 1024 / 1024;
        let disk = sysinfo::Disks::new_with_refreshed_list()
            .iter()
            .map(sysinfo::Disk::total_space)
            .sum::<u64>()
            / 1024
            / 1024;
        let macaddr = get_mac_address().ok().flatten().map(|addr| addr.to_string());

        Self { hostname, platform, cpu, ram, disk, macaddr }
    }

    /// Serializes this snapshot to the JSON string carried in the `SYSINFO`
    /// header.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
