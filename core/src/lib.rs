//! Core engine types shared by the toolbox binary and its probe modules.

pub mod error;
pub mod output;
pub mod ports;
pub mod probe;
pub mod ratelimiter;

pub use error::{parse_flag, ConfigError, PayloadError};
pub use output::{OutItem, OutLevel, ProbeReport, ReportValue, CLASSIFICATION_SIZE};
pub use probe::{ParamKind, Probe, ProbeKind, ProbeParam, ProbeTarget, PAYLOAD_SIZE};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
