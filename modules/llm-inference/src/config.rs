use toolbox_core::{parse_flag, ConfigError, ParamKind, ProbeParam};
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = concat!("LLM-Scanner/", env!("CARGO_PKG_VERSION"));

pub static PARAMS: &[ProbeParam] = &[
    ProbeParam { name: "aggressive", kind: ParamKind::Flag },
    ProbeParam { name: "metrics", kind: ParamKind::Flag },
    ProbeParam { name: "detect-version", kind: ParamKind::Flag },
    ProbeParam { name: "user-agent", kind: ParamKind::Arg },
];

/// Settings for one scan run. Written by `set` and `init`, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmInferenceConf {
    user_agent: Option<String>,
    aggressive: bool,
    metrics: bool,
    /// `None` until the operator sets it; `init` turns that into enabled.
    detect_version: Option<bool>,
    /// Reserved for cycling through the endpoint catalog. Always 0.
    probe_idx: usize,
}

impl LlmInferenceConf {
    pub fn new() -> Self { Self::default() }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        match name {
            "aggressive" => self.aggressive = parse_flag(name, value)?,
            "metrics" => self.metrics = parse_flag(name, value)?,
            "detect-version" => self.detect_version = Some(parse_flag(name, value)?),
            // the previous string is dropped on assignment
            "user-agent" => self.user_agent = Some(value.to_string()),
            _ => return Err(ConfigError::UnknownParam(name.to_string())),
        }
        debug!(param = name, value, "llm-inference parameter set");
        Ok(())
    }

    /// Fill in defaults for anything the operator left unset.
    pub fn init(&mut self) {
        if self.user_agent.is_none() {
            self.user_agent = Some(DEFAULT_USER_AGENT.to_string());
        }
        if self.detect_version.is_none() {
            self.detect_version = Some(true);
        }
        self.probe_idx = 0;
    }

    /// Release everything and return to the unconfigured state.
    pub fn teardown(&mut self) {
        *self = Self::default();
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn aggressive(&self) -> bool { self.aggressive }

    pub fn metrics(&self) -> bool { self.metrics }

    pub fn detect_version(&self) -> bool { self.detect_version.unwrap_or(true) }

    pub fn probe_idx(&self) -> usize { self.probe_idx }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_after_init() {
        let mut conf = LlmInferenceConf::new();
        conf.init();
        assert_eq!(conf.user_agent(), DEFAULT_USER_AGENT);
        assert!(DEFAULT_USER_AGENT.starts_with("LLM-Scanner/"));
        assert!(conf.detect_version());
        assert!(!conf.aggressive());
        assert!(!conf.metrics());
        assert_eq!(conf.probe_idx(), 0);
    }

    #[test]
    fn explicit_values_survive_init() {
        let mut conf = LlmInferenceConf::new();
        conf.set("detect-version", "disable").unwrap();
        conf.set("aggressive", "enable").unwrap();
        conf.set("user-agent", "curl/8.0").unwrap();
        conf.init();
        assert!(!conf.detect_version());
        assert!(conf.aggressive());
        assert_eq!(conf.user_agent(), "curl/8.0");
    }

    #[test]
    fn user_agent_replaced_not_duplicated() {
        let mut conf = LlmInferenceConf::new();
        conf.set("user-agent", "first").unwrap();
        conf.set("user-agent", "second").unwrap();
        assert_eq!(conf.user_agent, Some("second".to_string()));
        conf.init();
        assert_eq!(conf.user_agent(), "second");
    }

    #[test]
    fn any_string_is_a_user_agent() {
        let mut conf = LlmInferenceConf::new();
        conf.set("user-agent", "").unwrap();
        conf.set("user-agent", "disable").unwrap();
        assert_eq!(conf.user_agent(), "disable");
    }

    #[test]
    fn bad_flag_token_rejected() {
        let mut conf = LlmInferenceConf::new();
        let err = conf.set("metrics", "sometimes").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));
        assert!(!conf.metrics());
        assert!(matches!(conf.set("verbose", "enable"), Err(ConfigError::UnknownParam(_))));
    }

    #[test]
    fn teardown_without_init() {
        let mut conf = LlmInferenceConf::new();
        conf.teardown();
        assert_eq!(conf, LlmInferenceConf::default());

        conf.set("user-agent", "x").unwrap();
        conf.set("metrics", "on").unwrap();
        conf.init();
        conf.teardown();
        assert_eq!(conf, LlmInferenceConf::default());
    }

    #[test]
    fn params_cover_every_option() {
        let mut conf = LlmInferenceConf::new();
        for p in PARAMS {
            let value = match p.kind { ParamKind::Flag => "enable", ParamKind::Arg => "ua" };
            conf.set(p.name, value).unwrap();
        }
    }
}
