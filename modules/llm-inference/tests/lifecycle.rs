use llm_inference::{LlmInferenceProbe, DEFAULT_USER_AGENT};
use std::sync::Arc;
use std::thread;
use toolbox_core::{ConfigError, PayloadError, Probe, ProbeTarget, PAYLOAD_SIZE};

fn ollama_reply() -> Vec<u8> {
    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"models\":[{\"name\":\"llama3:8b\"}],\"version\":\"0.3.12\"}".to_vec()
}

#[test]
fn full_scan_run() {
    let mut probe = LlmInferenceProbe::new();
    probe.set("aggressive", "enable").unwrap();
    probe.init();

    let target = ProbeTarget::new("127.0.0.1", 11434);
    let mut buf = [0u8; PAYLOAD_SIZE];
    let n = probe.make_payload(&target, &mut buf).unwrap();
    assert_eq!(probe.payload_len(&target).unwrap(), n);
    let text = std::str::from_utf8(&buf[..n]).unwrap();
    assert!(text.starts_with("GET /v1/models HTTP/1.1\r\n"));
    assert!(text.contains(&format!("User-Agent: {}\r\n", DEFAULT_USER_AGENT)));
    assert!(text.ends_with("Connection: close\r\n\r\n"));

    let item = probe.handle_response(&target, &ollama_reply());
    assert!(!item.no_output);
    assert_eq!(item.classification, "Ollama");
    assert_eq!(item.evidence, "version-detected");

    probe.close();
}

#[test]
fn teardown_with_no_targets() {
    let mut probe = LlmInferenceProbe::new();
    probe.init();
    probe.close();
}

#[test]
fn configuration_errors_surface() {
    let mut probe = LlmInferenceProbe::new();
    assert!(matches!(probe.set("detect-version", "perhaps"), Err(ConfigError::InvalidFlag { .. })));
    assert!(matches!(probe.set("endpoint", "/api/tags"), Err(ConfigError::UnknownParam(_))));
}

#[test]
fn small_engine_buffer_yields_no_payload() {
    let mut probe = LlmInferenceProbe::new();
    probe.init();
    let target = ProbeTarget::new("127.0.0.1", 8000);
    let mut buf = [0u8; 16];
    assert!(matches!(probe.make_payload(&target, &mut buf), Err(PayloadError::TooLarge { capacity: 16, .. })));
}

#[test]
fn shared_across_workers_after_init() {
    let mut probe = LlmInferenceProbe::new();
    probe.set("user-agent", "worker-test/1").unwrap();
    probe.init();
    let probe = Arc::new(probe);

    let handles: Vec<_> = (0..8u16)
        .map(|i| {
            let probe = probe.clone();
            thread::spawn(move || {
                let target = ProbeTarget::new("10.0.0.1", 8000 + i);
                let len = probe.payload_len(&target).unwrap();
                let item = probe.handle_response(&target, &ollama_reply());
                (len, item.classification)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(results[0].1, "Ollama");
}
