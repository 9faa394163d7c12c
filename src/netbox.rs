use std::net::IpAddr;

use ipnet::IpNet;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Error fetching data from NetBox: {0}")]
    Transport(#[from] ureq::Transport),

    #[error("Non-200 response from NetBox: {code} {text}")]
    Status { code: u16, text: String },

    #[error("Error reading response body: {0}")]
    Body(#[from] std::io::Error),

    #[error("Error decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Record for {0} has no primary IP")]
    NoPrimaryIp(String),

    #[error("Error parsing primary IP address {address:?}: {source}")]
    Address {
        address: String,
        source: ipnet::AddrParseError,
    },
}

/// The record categories NetBox can hold a host under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Devices,
    VirtualMachines,
}

impl Endpoint {
    /// Devices win over virtual machines when a name exists in both.
    pub const SEARCH_ORDER: [Endpoint; 2] = [Endpoint::Devices, Endpoint::VirtualMachines];

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Devices => "/api/dcim/devices/",
            Endpoint::VirtualMachines => "/api/virtualization/virtual-machines/",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Devices => "devices",
            Endpoint::VirtualMachines => "virtual machines",
        }
    }
}

/// Something that can answer "what is the primary IP of this host?" for one endpoint.
///
/// `Ok(None)` means the endpoint has no record of that name, which is not an error.
pub trait Inventory {
    fn lookup(&self, endpoint: Endpoint, hostname: &str) -> Result<Option<IpAddr>, LookupError>;
}

#[derive(Debug, Deserialize)]
struct RecordList {
    results: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    primary_ip: Option<PrimaryIp>,
}

#[derive(Debug, Deserialize)]
struct PrimaryIp {
    address: String,
}

pub struct NetboxClient {
    agent: ureq::Agent,
    config: Config,
}

impl NetboxClient {
    pub fn new(config: Config) -> Self {
        // The token must survive same-host redirects such as http -> https.
        let agent = ureq::AgentBuilder::new()
            .redirect_auth_headers(ureq::RedirectAuthHeaders::SameHost)
            .build();

        Self { agent, config }
    }
}

impl Inventory for NetboxClient {
    fn lookup(&self, endpoint: Endpoint, hostname: &str) -> Result<Option<IpAddr>, LookupError> {
        let url = self.config.endpoint_url(endpoint);
        log::debug!("Querying {url} for {hostname}");

        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Token {}", self.config.api_token))
            .set("Accept", "application/json")
            .query("name", hostname)
            .query("limit", "1")
            .call()
            .map_err(|error| match error {
                ureq::Error::Status(code, response) => LookupError::Status {
                    code,
                    text: response.status_text().to_string(),
                },
                ureq::Error::Transport(transport) => LookupError::Transport(transport),
            })?;

        // Only a plain 200 carries a record list.
        if response.status() != 200 {
            return Err(LookupError::Status {
                code: response.status(),
                text: response.status_text().to_string(),
            });
        }

        let body = response.into_string()?;
        first_primary_ip(&body, hostname)
    }
}

fn first_primary_ip(body: &str, hostname: &str) -> Result<Option<IpAddr>, LookupError> {
    let records: RecordList = serde_json::from_str(body)?;

    let Some(record) = records.results.into_iter().next() else {
        return Ok(None);
    };

    let primary_ip = record
        .primary_ip
        .ok_or_else(|| LookupError::NoPrimaryIp(hostname.to_string()))?;

    parse_primary_ip(&primary_ip.address)
        .map(Some)
        .map_err(|source| LookupError::Address {
            address: primary_ip.address,
            source,
        })
}

/// Takes the address part of a CIDR string such as `10.0.0.5/24`.
pub fn parse_primary_ip(address: &str) -> Result<IpAddr, ipnet::AddrParseError> {
    let network: IpNet = address.parse()?;
    Ok(network.addr().to_canonical())
}
