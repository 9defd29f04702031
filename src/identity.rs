//! Best-effort network identity of the machine writing log entries.

use std::net::IpAddr;

use local_ip_address::local_ip;
use sysinfo::System;

pub const FALLBACK_ADDRESS: &str = "127.0.0.1";
pub const FALLBACK_HOST: &str = "localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub address: String,
    pub host: String,
}

impl CallerIdentity {
    pub fn new(address: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            host: host.into(),
        }
    }
}

impl Default for CallerIdentity {
    fn default() -> Self {
        Self::new(FALLBACK_ADDRESS, FALLBACK_HOST)
    }
}

/// Something that can say where a log write comes from. Implementations
/// never fail; they hand back the loopback defaults instead.
pub trait IdentitySource: Send + Sync {
    fn resolve(&self) -> CallerIdentity;
}

/// Looks up the local IP address and host name on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalIdentity;

impl IdentitySource for LocalIdentity {
    fn resolve(&self) -> CallerIdentity {
        resolve_caller_identity()
    }
}

/// A fixed identity resolves to itself.
impl IdentitySource for CallerIdentity {
    fn resolve(&self) -> CallerIdentity {
        self.clone()
    }
}

pub fn resolve_caller_identity() -> CallerIdentity {
    from_lookups(local_ip().map_err(|e| e.to_string()), System::host_name())
}

fn from_lookups(address: Result<IpAddr, String>, host: Option<String>) -> CallerIdentity {
    let address = match address {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            log::debug!("Local IP lookup failed, using {FALLBACK_ADDRESS}: {e}");
            FALLBACK_ADDRESS.to_string()
        }
    };
    let host = host
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| FALLBACK_HOST.to_string());

    CallerIdentity { address, host }
}
