use argh::FromArgs;

pub const USAGE: &str = "Usage: nbssh [-u username] <hostname>";

#[derive(FromArgs, PartialEq, Debug)]
/// Look up a host's primary IP in NetBox and ssh into it.
pub struct NbSsh {
    #[argh(option, short = 'u')]
    /// username for the ssh connection
    pub username: Option<String>,

    #[argh(positional)]
    /// name of the device or virtual machine in NetBox
    pub hostname: Vec<String>,
}

impl NbSsh {
    /// Exactly one hostname is accepted. Anything else is a usage error.
    pub fn single_hostname(&self) -> Option<&str> {
        match self.hostname.as_slice() {
            [hostname] => Some(hostname.as_str()),
            _ => None,
        }
    }
}
