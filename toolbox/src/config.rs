use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct LlmConfig {
    pub ports: Option<String>,
    pub timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
    pub qps: Option<u32>,
    pub retries: Option<u32>,
    pub format: Option<String>,
    pub aggressive: Option<bool>,
    pub metrics: Option<bool>,
    pub detect_version: Option<bool>,
    pub user_agent: Option<String>,
}

impl LlmConfig {
    /// Probe parameters in `(name, value)` form, ready for `Probe::set`.
    pub fn probe_args(&self) -> Vec<(String, String)> {
        let flag = |b: bool| if b { "enable" } else { "disable" }.to_string();
        let mut args = Vec::new();
        if let Some(v) = self.aggressive { args.push(("aggressive".to_string(), flag(v))); }
        if let Some(v) = self.metrics { args.push(("metrics".to_string(), flag(v))); }
        if let Some(v) = self.detect_version { args.push(("detect-version".to_string(), flag(v))); }
        if let Some(ua) = &self.user_agent { args.push(("user-agent".to_string(), ua.clone())); }
        args
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub llm: Option<LlmConfig>,
}

pub fn parse_config(s: &str) -> Option<Config> {
    match serde_yaml::from_str(s) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(error = %e, "ignoring malformed config");
            None
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new("toolbox.yaml");
            if p.exists() { p.to_path_buf() } else { return None; }
        }
    };
    let s = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read config");
            return None;
        }
    };
    parse_config(&s)
}
