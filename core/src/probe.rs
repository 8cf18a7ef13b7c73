//! The lifecycle contract between the scan engine and a probe module.
//!
//! The engine drives a probe in a fixed order:
//! `set` (zero or more times) -> `init` -> per target `make_payload` / `payload_len`
//! -> `handle_response` -> `close`. Only `set`, `init` and `close` take `&mut self`;
//! everything in between reads the probe, so one initialised probe can be shared
//! across worker tasks behind an `Arc`.

use crate::{ConfigError, OutItem, PayloadError};
use std::fmt;

/// Default capacity of the payload buffer the engine hands to `make_payload`.
pub const PAYLOAD_SIZE: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind { Tcp, Udp }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Boolean, accepts enable/disable style tokens.
    Flag,
    /// Free-form string argument.
    Arg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeParam {
    pub name: &'static str,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

impl ProbeTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ProbeTarget { host: host.into(), port }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

pub trait Probe: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> ProbeKind;

    fn params(&self) -> &'static [ProbeParam];

    /// Apply one named parameter. Must be called before `init`.
    fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError>;

    fn init(&mut self);

    /// Render the request for `target` into `buf` and return the bytes written.
    fn make_payload(&self, target: &ProbeTarget, buf: &mut [u8]) -> Result<usize, PayloadError>;

    /// Length `make_payload` would produce with a `PAYLOAD_SIZE` buffer.
    fn payload_len(&self, target: &ProbeTarget) -> Result<usize, PayloadError> {
        let mut scratch = [0u8; PAYLOAD_SIZE];
        self.make_payload(target, &mut scratch)
    }

    /// Classify whatever the peer sent back, possibly nothing.
    fn handle_response(&self, target: &ProbeTarget, px: &[u8]) -> OutItem;

    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_display() {
        assert_eq!(ProbeTarget::new("10.0.0.1", 11434).to_string(), "10.0.0.1:11434");
        assert_eq!(ProbeTarget::new("::1", 8000).to_string(), "[::1]:8000");
    }
}
