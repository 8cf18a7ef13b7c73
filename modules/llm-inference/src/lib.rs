//! Fingerprint open LLM inference servers (Ollama, vLLM, llama.cpp, Triton,
//! LM Studio, GPT4All, generic OpenAI-compatible APIs) from a single
//! `GET /v1/models` exchange.

pub mod classify;
pub mod config;
pub mod endpoints;
pub mod request;
pub mod signatures;

pub use classify::{classify, classify_response, Classification};
pub use config::{LlmInferenceConf, DEFAULT_USER_AGENT};
pub use signatures::Service;

use toolbox_core::{ConfigError, OutItem, PayloadError, Probe, ProbeKind, ProbeParam, ProbeTarget};
use tracing::info;

pub const PROBE_NAME: &str = "llm-inference";

/// Engine-facing adapter. Holds the run's configuration and nothing else.
#[derive(Debug, Default)]
pub struct LlmInferenceProbe {
    conf: LlmInferenceConf,
}

impl LlmInferenceProbe {
    pub fn new() -> Self { Self::default() }

    pub fn conf(&self) -> &LlmInferenceConf { &self.conf }
}

impl Probe for LlmInferenceProbe {
    fn name(&self) -> &'static str { PROBE_NAME }

    fn kind(&self) -> ProbeKind { ProbeKind::Tcp }

    fn params(&self) -> &'static [ProbeParam] { config::PARAMS }

    fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        self.conf.set(name, value)
    }

    fn init(&mut self) {
        self.conf.init();
        info!(
            user_agent = self.conf.user_agent(),
            aggressive = self.conf.aggressive(),
            metrics = self.conf.metrics(),
            detect_version = self.conf.detect_version(),
            "llm-inference probe initialized"
        );
    }

    fn make_payload(&self, _target: &ProbeTarget, buf: &mut [u8]) -> Result<usize, PayloadError> {
        request::build_request(&self.conf, buf)
    }

    fn payload_len(&self, _target: &ProbeTarget) -> Result<usize, PayloadError> {
        request::request_length(&self.conf)
    }

    fn handle_response(&self, _target: &ProbeTarget, px: &[u8]) -> OutItem {
        classify::classify_response(px, self.conf.detect_version())
    }

    fn close(&mut self) {
        self.conf.teardown();
        info!("llm-inference probe closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata() {
        let probe = LlmInferenceProbe::new();
        assert_eq!(probe.name(), "llm-inference");
        assert_eq!(probe.kind(), ProbeKind::Tcp);
        let names: Vec<&str> = probe.params().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["aggressive", "metrics", "detect-version", "user-agent"]);
    }

    #[test]
    fn close_resets_configuration() {
        let mut probe = LlmInferenceProbe::new();
        probe.set("user-agent", "x/1").unwrap();
        probe.init();
        probe.close();
        assert_eq!(probe.conf(), &LlmInferenceConf::default());
    }

    #[test]
    fn close_without_init() {
        let mut probe = LlmInferenceProbe::new();
        probe.close();
        assert_eq!(probe.conf(), &LlmInferenceConf::default());
    }
}
