use anyhow::{anyhow, Result};
use ipnet::IpNet;
use std::io::BufRead;
use toolbox_core::ProbeTarget;

/// One target line: a single host, or a network whose addresses are
/// produced on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSpec {
    Name(String),
    Net(IpNet),
}

impl HostSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.contains('/') {
            let net: IpNet = spec.parse().map_err(|e| anyhow!("invalid CIDR '{}': {}", spec, e))?;
            return Ok(HostSpec::Net(net));
        }
        if spec.is_empty() {
            return Err(anyhow!("empty target"));
        }
        Ok(HostSpec::Name(spec.to_string()))
    }

    pub fn hosts(&self) -> Box<dyn Iterator<Item = String> + Send> {
        match self {
            HostSpec::Name(h) => Box::new(std::iter::once(h.clone())),
            HostSpec::Net(net) => Box::new(net.hosts().map(|ip| ip.to_string())),
        }
    }
}

/// Newline-delimited host specs; blank lines and `#` comments are skipped.
pub fn read_hosts<R: BufRead>(reader: R) -> Result<Vec<HostSpec>> {
    let mut specs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') { continue; }
        specs.push(HostSpec::parse(t)?);
    }
    Ok(specs)
}

/// Every (host, port) pair, host-major, expanded as it is consumed.
pub fn cross(specs: Vec<HostSpec>, ports: Vec<u16>) -> impl Iterator<Item = ProbeTarget> + Send {
    specs.into_iter().flat_map(move |spec| {
        let ports = ports.clone();
        spec.hosts().flat_map(move |h| {
            ports.clone().into_iter().map(move |p| ProbeTarget::new(h.clone(), p))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(spec: &str) -> Vec<String> {
        HostSpec::parse(spec).unwrap().hosts().collect()
    }

    #[test]
    fn single_host() {
        assert_eq!(HostSpec::parse(" gpu-box ").unwrap(), HostSpec::Name("gpu-box".into()));
        assert_eq!(hosts("gpu-box"), vec!["gpu-box".to_string()]);
        assert!(HostSpec::parse("  ").is_err());
    }

    #[test]
    fn cidr_hosts() {
        assert_eq!(hosts("10.1.0.0/30"), vec!["10.1.0.1".to_string(), "10.1.0.2".to_string()]);
        assert!(HostSpec::parse("10.1.0.0/99").is_err());
    }

    #[test]
    fn hosts_file() {
        let input = "# lab\n\n192.168.1.5\n10.0.0.0/31\n";
        let specs = read_hosts(input.as_bytes()).unwrap();
        assert_eq!(specs.len(), 2);
        let all: Vec<String> = specs.iter().flat_map(|s| s.hosts()).collect();
        assert_eq!(all, vec!["192.168.1.5", "10.0.0.0", "10.0.0.1"]);
    }

    #[test]
    fn cross_product() {
        let specs = vec![HostSpec::Name("a".into()), HostSpec::Name("b".into())];
        let t: Vec<ProbeTarget> = cross(specs, vec![8000, 11434]).collect();
        assert_eq!(t.len(), 4);
        assert_eq!(t[1], ProbeTarget::new("a", 11434));
        assert_eq!(t[2], ProbeTarget::new("b", 8000));
    }

    #[test]
    fn large_network_expands_lazily() {
        // a /8 holds ~16M hosts; only the first few are ever materialised
        let specs = vec![HostSpec::parse("10.0.0.0/8").unwrap()];
        let first: Vec<ProbeTarget> = cross(specs, vec![11434]).take(2).collect();
        assert_eq!(first, vec![ProbeTarget::new("10.0.0.1", 11434), ProbeTarget::new("10.0.0.2", 11434)]);
    }
}
