use anyhow::{anyhow, Result};

/// Ports LLM inference servers listen on out of the box:
/// LM Studio, GPT4All, vLLM / llama.cpp / Triton HTTP, Triton gRPC, Triton metrics, Ollama.
pub const LLM_DEFAULT_PORTS: &[u16] = &[1234, 4891, 8000, 8001, 8002, 11434];

/// Parse a comma-separated list of ports/ranges (e.g., "8000,11434", "8000-8002,1234").
pub fn parse_ports(spec: &str) -> Result<Vec<u16>> {
    let mut ports = Vec::new();
    for part in spec.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let s: u16 = start.trim().parse()?;
            let e: u16 = end.trim().parse()?;
            if s == 0 || e == 0 || s > e {
                return Err(anyhow!("invalid port range: {}", part));
            }
            ports.extend(s..=e);
        } else {
            let p: u16 = part.parse()?;
            if p == 0 {
                return Err(anyhow!("invalid port: {}", part));
            }
            ports.push(p);
        }
    }
    if ports.is_empty() {
        return Err(anyhow!("no ports in '{}'", spec));
    }
    ports.sort_unstable();
    ports.dedup();
    Ok(ports)
}

pub fn default_llm_ports() -> Vec<u16> { LLM_DEFAULT_PORTS.to_vec() }
