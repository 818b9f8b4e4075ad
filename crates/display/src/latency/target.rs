use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

pub const DEFAULT_GAME_PORT: u16 = 25565;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("server address has no host")]
    EmptyHost,
    #[error("invalid port in server address: {0:?}")]
    InvalidPort(String),
    #[error("unbalanced bracket in server address: {0:?}")]
    UnbalancedBracket(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
}

impl ConnectionTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn parse(address: &str) -> Result<Self, TargetError> {
        Self::parse_with_default(address, DEFAULT_GAME_PORT)
    }

    /// Accepts `host`, `host:port`, `[v6]`, `[v6]:port` and bare IPv6
    /// literals. A missing port falls back to `default_port`.
    pub fn parse_with_default(address: &str, default_port: u16) -> Result<Self, TargetError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(TargetError::EmptyHost);
        }

        let (host, port) = if let Some(rest) = address.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| TargetError::UnbalancedBracket(address.to_string()))?;
            let port = match tail {
                "" => default_port,
                _ => match tail.strip_prefix(':') {
                    Some(port) => parse_port(port)?,
                    None => return Err(TargetError::InvalidPort(tail.to_string())),
                },
            };
            (host, port)
        } else {
            match address.matches(':').count() {
                0 => (address, default_port),
                1 => {
                    let (host, port) = address
                        .split_once(':')
                        .ok_or(TargetError::EmptyHost)?;
                    (host, parse_port(port)?)
                }
                _ => (address, default_port),
            }
        };

        if host.trim().is_empty() {
            return Err(TargetError::EmptyHost);
        }

        Ok(Self::new(host.trim(), port))
    }

    pub fn resolve(&self) -> io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .collect();
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} resolved to no addresses", self.host),
            ));
        }
        Ok(addrs)
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

fn parse_port(port: &str) -> Result<u16, TargetError> {
    match port.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(TargetError::InvalidPort(port.to_string())),
        Ok(port) => Ok(port),
    }
}
