use std::net::IpAddr;

use thiserror::Error;

use crate::netbox::{Endpoint, Inventory, LookupError};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to look up {hostname} in {}", .endpoint.name())]
    Lookup {
        endpoint: Endpoint,
        hostname: String,
        source: LookupError,
    },

    #[error("Host {0} not found in NetBox")]
    NotFound(String),
}

#[derive(Debug, PartialEq, Eq)]
pub struct Resolved {
    pub address: IpAddr,
    pub endpoint: Endpoint,
}

/// Searches each endpoint in order and stops at the first record found.
///
/// A failed lookup ends the search immediately. Only an empty result moves on to the next endpoint.
pub fn resolve(inventory: &impl Inventory, hostname: &str) -> Result<Resolved, ResolveError> {
    for endpoint in Endpoint::SEARCH_ORDER {
        let address = inventory
            .lookup(endpoint, hostname)
            .map_err(|source| ResolveError::Lookup {
                endpoint,
                hostname: hostname.to_string(),
                source,
            })?;

        match address {
            Some(address) => {
                log::debug!("Found {hostname} in {}: {address}", endpoint.name());
                return Ok(Resolved { address, endpoint });
            }
            None => log::debug!("No match for {hostname} in {}", endpoint.name()),
        }
    }

    Err(ResolveError::NotFound(hostname.to_string()))
}
