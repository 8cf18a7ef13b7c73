//! Ordered body signatures for known LLM inference servers.
//!
//! Rules are checked top to bottom and the first hit wins, so a body that
//! mentions both `ollama` and `vllm` is Ollama. New servers go at the position
//! matching their priority; no control flow changes are needed.

use memchr::memmem;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Ollama,
    Vllm,
    LlamaCpp,
    Triton,
    LmStudio,
    Gpt4All,
    OpenAiCompatible,
    Unknown,
}

impl Service {
    pub fn label(&self) -> &'static str {
        match self {
            Service::Ollama => "Ollama",
            Service::Vllm => "vLLM",
            Service::LlamaCpp => "Llama.cpp",
            Service::Triton => "NVIDIA-Triton",
            Service::LmStudio => "LM-Studio",
            Service::Gpt4All => "GPT4All",
            Service::OpenAiCompatible => "OpenAI-Compatible-API",
            Service::Unknown => "unknown-llm",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Keywords {
    /// At least one needle present.
    Any(&'static [&'static [u8]]),
    /// Every needle present.
    All(&'static [&'static [u8]]),
}

impl Keywords {
    pub fn matches(&self, body: &[u8]) -> bool {
        match self {
            Keywords::Any(needles) => needles.iter().any(|n| contains(body, n)),
            Keywords::All(needles) => needles.iter().all(|n| contains(body, n)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub service: Service,
    pub keywords: Keywords,
    /// Extra needle that marks the body as carrying version information.
    pub version_marker: Option<&'static [u8]>,
}

pub static SIGNATURES: &[Signature] = &[
    Signature {
        service: Service::Ollama,
        keywords: Keywords::Any(&[b"\"models\":", b"ollama"]),
        version_marker: Some(b"\"version\":"),
    },
    Signature {
        service: Service::Vllm,
        keywords: Keywords::Any(&[b"vllm", b"\"object\":\"list\""]),
        version_marker: None,
    },
    Signature {
        service: Service::LlamaCpp,
        keywords: Keywords::Any(&[b"llama", b"ggml", b"gguf"]),
        version_marker: None,
    },
    Signature {
        service: Service::Triton,
        keywords: Keywords::Any(&[b"triton", b"\"ready\":true"]),
        version_marker: None,
    },
    Signature {
        service: Service::LmStudio,
        keywords: Keywords::Any(&[b"lm-studio", b"lmstudio"]),
        version_marker: None,
    },
    Signature {
        service: Service::Gpt4All,
        keywords: Keywords::Any(&[b"gpt4all"]),
        version_marker: None,
    },
    Signature {
        service: Service::OpenAiCompatible,
        keywords: Keywords::All(&[b"\"data\":[", b"\"id\":"]),
        version_marker: None,
    },
];

/// Exact, case-sensitive byte search. A needle longer than the haystack never matches.
pub fn contains(hay: &[u8], needle: &[u8]) -> bool {
    memmem::find(hay, needle).is_some()
}

/// First signature in priority order that matches `body`.
pub fn match_body(body: &[u8]) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|sig| sig.keywords.matches(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_of(body: &[u8]) -> Service {
        match_body(body).map(|s| s.service).unwrap_or(Service::Unknown)
    }

    #[test]
    fn search_window_smaller_than_needle() {
        assert!(!contains(b"tri", b"triton"));
        assert!(!contains(b"", b"ollama"));
        assert!(contains(b"xxtritonxx", b"triton"));
    }

    #[test]
    fn search_is_case_sensitive() {
        assert!(!contains(b"OLLAMA", b"ollama"));
        assert_eq!(service_of(b"Ollama server"), Service::LlamaCpp);
    }

    #[test]
    fn each_rule_fires() {
        assert_eq!(service_of(b"Ollama is running ollama"), Service::Ollama);
        assert_eq!(service_of(br#"{"models":[]}"#), Service::Ollama);
        assert_eq!(service_of(b"served by vllm"), Service::Vllm);
        assert_eq!(service_of(b"model.gguf"), Service::LlamaCpp);
        assert_eq!(service_of(b"ggml backend"), Service::LlamaCpp);
        assert_eq!(service_of(b"nvidia triton"), Service::Triton);
        assert_eq!(service_of(b"lmstudio-community"), Service::LmStudio);
        assert_eq!(service_of(b"lm-studio"), Service::LmStudio);
        assert_eq!(service_of(b"gpt4all api"), Service::Gpt4All);
        assert_eq!(service_of(br#"{"data":[{"id":"m"}]}"#), Service::OpenAiCompatible);
    }

    #[test]
    fn generic_rule_needs_both_keywords() {
        assert_eq!(service_of(br#"{"data":[]}"#), Service::Unknown);
        assert_eq!(service_of(br#"{"id":"x"}"#), Service::Unknown);
    }

    #[test]
    fn earlier_rule_wins() {
        assert_eq!(service_of(b"ollama and vllm"), Service::Ollama);
        assert_eq!(service_of(b"vllm serving a llama model"), Service::Vllm);
        assert_eq!(service_of(b"triton with gpt4all"), Service::Triton);
    }

    #[test]
    fn labels_fit_classification_field() {
        for sig in SIGNATURES {
            assert!(sig.service.label().len() <= toolbox_core::CLASSIFICATION_SIZE);
        }
        assert_eq!(Service::Unknown.to_string(), "unknown-llm");
    }
}
