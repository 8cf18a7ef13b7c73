//! Known API endpoints of LLM inference servers.

use crate::signatures::Service;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub method: &'static str,
    /// Server family the endpoint is documented for.
    pub family: Service,
}

pub static ENDPOINTS: &[Endpoint] = &[
    Endpoint { path: "/api/tags", method: "GET", family: Service::Ollama },
    Endpoint { path: "/api/version", method: "GET", family: Service::Ollama },
    Endpoint { path: "/v1/models", method: "GET", family: Service::OpenAiCompatible },
    Endpoint { path: "/models", method: "GET", family: Service::OpenAiCompatible },
    Endpoint { path: "/health", method: "GET", family: Service::OpenAiCompatible },
    Endpoint { path: "/v2/health/ready", method: "GET", family: Service::Triton },
    Endpoint { path: "/v2/models", method: "GET", family: Service::Triton },
];

/// Index into `ENDPOINTS` of the endpoint every request targets.
pub const CANONICAL: usize = 2;

pub fn canonical() -> &'static Endpoint { &ENDPOINTS[CANONICAL] }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_is_v1_models() {
        let ep = canonical();
        assert_eq!(ep.method, "GET");
        assert_eq!(ep.path, "/v1/models");
    }

    #[test]
    fn paths_are_absolute_and_unique() {
        for (i, ep) in ENDPOINTS.iter().enumerate() {
            assert!(ep.path.starts_with('/'));
            assert!(ENDPOINTS[i + 1..].iter().all(|o| o.path != ep.path));
        }
    }
}
