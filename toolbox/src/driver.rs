//! Drives a probe over TCP: connect, send the payload, collect the reply,
//! hand it back to the probe for classification.

use anyhow::{anyhow, Result};
use rand::{thread_rng, Rng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;
use toolbox_core::ratelimiter::RateLimiter;
use toolbox_core::{OutItem, Probe, ProbeTarget, PAYLOAD_SIZE};
use tracing::{debug, warn};

/// Upper bound on bytes collected from one peer.
pub const MAX_RESPONSE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    pub max_response: usize,
}

impl Default for DriverOptions {
    fn default() -> Self {
        DriverOptions {
            timeout: Duration::from_millis(1500),
            retries: 0,
            retry_delay: Duration::from_millis(50),
            max_response: MAX_RESPONSE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub target: ProbeTarget,
    /// A `Failure` item with an `error` report entry when no response could be handled.
    pub item: OutItem,
    pub started_at: String,
    pub duration_ms: u128,
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}

async fn connect_with_retries(target: &ProbeTarget, opts: &DriverOptions) -> Result<TcpStream> {
    let addr = (target.host.as_str(), target.port);
    let mut attempts = 0;
    loop {
        match timeout(opts.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => return Ok(stream),
            Ok(Err(e)) if attempts >= opts.retries => return Err(e.into()),
            Err(_) if attempts >= opts.retries => return Err(anyhow!("connect timed out")),
            _ => {}
        }
        attempts += 1;
        let base = opts.retry_delay.as_millis() as u64;
        let exp = base.saturating_mul(1u64 << attempts.min(6));
        let jitter = thread_rng().gen_range(0..(exp / 4 + 1));
        debug!(%target, attempts, "connect failed, retrying");
        tokio::time::sleep(Duration::from_millis(exp + jitter)).await;
    }
}

/// Send `payload` and read until EOF, `max_response` bytes, or the timeout.
/// Whatever arrived before the deadline is returned, possibly nothing.
pub async fn exchange(target: &ProbeTarget, payload: &[u8], opts: &DriverOptions) -> Result<Vec<u8>> {
    let mut stream = connect_with_retries(target, opts).await?;
    timeout(opts.timeout, stream.write_all(payload)).await??;

    let deadline = Instant::now() + opts.timeout;
    let mut resp = Vec::new();
    let mut chunk = [0u8; 4096];
    while resp.len() < opts.max_response {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() { break; }
        match timeout(remaining, stream.read(&mut chunk)).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(n)) => {
                let take = n.min(opts.max_response - resp.len());
                resp.extend_from_slice(&chunk[..take]);
            }
            // reset after partial data still leaves something to classify
            Ok(Err(e)) if resp.is_empty() => return Err(e.into()),
            Ok(Err(_)) => break,
        }
    }
    Ok(resp)
}

pub async fn probe_target<P: Probe + ?Sized>(probe: &P, target: ProbeTarget, opts: &DriverOptions) -> ProbeOutcome {
    let started_at = now_rfc3339();
    let start = Instant::now();
    let mut buf = [0u8; PAYLOAD_SIZE];
    let result = match probe.make_payload(&target, &mut buf) {
        Ok(n) => exchange(&target, &buf[..n], opts).await,
        Err(e) => {
            warn!(%target, error = %e, "cannot probe target");
            Err(e.into())
        }
    };
    let item = match result {
        Ok(resp) => probe.handle_response(&target, &resp),
        Err(e) => OutItem::failure(&e.to_string()),
    };
    ProbeOutcome { target, item, started_at, duration_ms: start.elapsed().as_millis() }
}

/// Probe targets as they are pulled from `targets`, with bounded concurrency
/// and optional global pacing. Outcomes arrive on the returned channel in
/// completion order; the channel closes once every target is done.
///
/// A worker keeps its concurrency permit until its outcome is accepted, so a
/// slow reader bounds the number of outcomes held in memory.
pub fn probe_many<P, I>(
    probe: Arc<P>,
    targets: I,
    opts: DriverOptions,
    concurrency: usize,
    qps: Option<RateLimiter>,
) -> mpsc::Receiver<ProbeOutcome>
where
    P: Probe + 'static,
    I: IntoIterator<Item = ProbeTarget>,
    I::IntoIter: Send + 'static,
{
    let concurrency = concurrency.max(1);
    let (tx, rx) = mpsc::channel::<ProbeOutcome>(concurrency);
    let targets = targets.into_iter();
    let opts = Arc::new(opts);

    tokio::spawn(async move {
        let sem = Arc::new(Semaphore::new(concurrency));
        for target in targets {
            let Ok(permit) = sem.clone().acquire_owned().await else { break };
            if tx.is_closed() { break; }
            if let Some(q) = &qps { q.acquire().await; }
            let tx = tx.clone();
            let probe = probe.clone();
            let opts = opts.clone();
            tokio::spawn(async move {
                let outcome = probe_target(probe.as_ref(), target, &opts).await;
                drop(probe);
                let _ = tx.send(outcome).await;
                drop(permit);
            });
        }
        drop(probe);
    });
    rx
}
