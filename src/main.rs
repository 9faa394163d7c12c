use anyhow::{Context, Result};

use crate::{
    config::{Config, ConfigError},
    netbox::{Inventory, NetboxClient},
    ssh::SshTarget,
};

mod arguments;
mod config;
mod netbox;
mod resolve;
mod ssh;

fn main() {
    let args = argh::from_env();

    colog::init();

    if let Err(error) = application(args) {
        log::error!("Fatal error: {:?}", error);
        std::process::exit(1);
    }
}

fn application(args: arguments::NbSsh) -> Result<()> {
    log::debug!("NetBox SSH v{}", std::env!("CARGO_PKG_VERSION"));

    match find_target(args, Config::from_env, NetboxClient::new)? {
        Some(target) => target
            .connect()
            .context("Failed to initiate ssh connection"),
        None => Ok(()),
    }
}

/// Works out where to ssh to. `None` means usage was printed and there is nothing to connect to.
fn find_target<I: Inventory>(
    args: arguments::NbSsh,
    load_config: impl FnOnce() -> Result<Config, ConfigError>,
    open_inventory: impl FnOnce(Config) -> I,
) -> Result<Option<SshTarget>> {
    // A usage mistake is not treated as a failure.
    let Some(hostname) = args.single_hostname().map(str::to_string) else {
        println!("{}", arguments::USAGE);
        return Ok(None);
    };

    let config = load_config().context("Failed to read NetBox configuration")?;
    let inventory = open_inventory(config);

    let resolved = resolve::resolve(&inventory, &hostname)
        .with_context(|| format!("Failed to resolve {hostname}"))?;
    log::debug!(
        "Resolved {hostname} to {} ({})",
        resolved.address,
        resolved.endpoint.name()
    );

    Ok(Some(SshTarget::new(args.username, resolved.address)))
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, net::IpAddr};

    use super::*;
    use crate::{
        arguments::NbSsh,
        netbox::{Endpoint, LookupError},
        resolve::ResolveError,
    };

    /// Knows a single device and records every query made against it.
    #[derive(Default)]
    struct RecordingInventory {
        device: Option<IpAddr>,
        queries: RefCell<Vec<Endpoint>>,
    }

    impl Inventory for &RecordingInventory {
        fn lookup(
            &self,
            endpoint: Endpoint,
            _hostname: &str,
        ) -> Result<Option<IpAddr>, LookupError> {
            self.queries.borrow_mut().push(endpoint);

            Ok(match endpoint {
                Endpoint::Devices => self.device,
                Endpoint::VirtualMachines => None,
            })
        }
    }

    fn args(username: Option<&str>, hostname: &[&str]) -> NbSsh {
        NbSsh {
            username: username.map(str::to_string),
            hostname: hostname.iter().map(|name| name.to_string()).collect(),
        }
    }

    fn config() -> Result<Config, ConfigError> {
        Ok(Config {
            netbox_url: "https://netbox.example.com".into(),
            api_token: "secret".into(),
        })
    }

    #[test]
    fn usage_skips_everything() {
        let inventory = RecordingInventory::default();

        for hostname in [&[][..], &["web01", "web02"][..]] {
            let target = find_target(
                args(Some("alice"), hostname),
                || panic!("configuration read on a usage error"),
                |_| &inventory,
            )
            .unwrap();

            assert_eq!(target, None);
        }
        assert!(inventory.queries.borrow().is_empty());
    }

    #[test]
    fn missing_configuration_skips_lookup() {
        let inventory = RecordingInventory::default();

        let error = find_target(
            args(None, &["web01"]),
            || Config::from_lookup(|_| None),
            |_| &inventory,
        )
        .unwrap_err();

        assert_eq!(
            error.downcast_ref::<ConfigError>(),
            Some(&ConfigError::Missing("NETBOX_URL"))
        );
        assert!(inventory.queries.borrow().is_empty());
    }

    #[test]
    fn unknown_host_has_no_target() {
        let inventory = RecordingInventory::default();

        let error = find_target(args(None, &["ghost"]), config, |_| &inventory).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<ResolveError>(),
            Some(ResolveError::NotFound(hostname)) if hostname == "ghost"
        ));
        assert_eq!(
            *inventory.queries.borrow(),
            vec![Endpoint::Devices, Endpoint::VirtualMachines]
        );
    }

    #[test]
    fn resolved_target() {
        let inventory = RecordingInventory {
            device: Some("10.0.0.5".parse().unwrap()),
            ..Default::default()
        };

        let target = find_target(args(None, &["web01"]), config, |_| &inventory).unwrap();
        assert_eq!(target.unwrap().to_string(), "10.0.0.5");

        let target =
            find_target(args(Some("alice"), &["web01"]), config, |_| &inventory).unwrap();
        assert_eq!(target.unwrap().to_string(), "alice@10.0.0.5");
    }
}
