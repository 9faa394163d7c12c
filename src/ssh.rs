use std::{
    fmt,
    net::IpAddr,
    process::{Command, Stdio},
};

use anyhow::{bail, Context, Result};

/// The `[user@]address` destination handed to ssh.
#[derive(Debug, PartialEq, Eq)]
pub struct SshTarget {
    pub username: Option<String>,
    pub address: IpAddr,
}

impl SshTarget {
    pub fn new(username: Option<String>, address: IpAddr) -> Self {
        // An empty `-u ""` means no username, same as leaving the flag off.
        let username = username.filter(|username| !username.is_empty());
        Self { username, address }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new("ssh");
        command.arg(self.to_string());

        command
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdin(Stdio::inherit());

        command
    }

    /// Runs an interactive ssh session, blocking until it exits.
    pub fn connect(&self) -> Result<()> {
        log::info!("Connecting to {self}");

        let mut child = self.command().spawn().context("Failed to spawn ssh.")?;

        let result = child
            .wait()
            .context("Failed to wait for ssh to complete.")?;

        if !result.success() {
            bail!("Ssh unsuccessful: {result}");
        }

        Ok(())
    }
}

impl fmt::Display for SshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(username) => write!(f, "{username}@{}", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}
