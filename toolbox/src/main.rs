use anyhow::Result;
#[cfg(feature = "llm")]
use anyhow::anyhow;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
#[cfg(feature = "llm")]
use tracing::info;

mod config;
#[cfg(feature = "llm")]
mod driver;
mod logging;
#[cfg(feature = "llm")]
mod render;
mod targets;

#[cfg(feature = "llm")]
use render::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "toolbox", version, about = "Fingerprint open LLM inference services")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./toolbox.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit logs as JSON on stderr
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// List available probes and their parameters
    #[cfg(feature = "llm")]
    Probes,
    /// Probe TCP ports for LLM inference servers (Ollama, vLLM, llama.cpp, Triton, ...)
    #[cfg(feature = "llm")]
    Llm {
        /// Target host, IP or CIDR
        #[arg(conflicts_with = "targets")]
        target: Option<String>,
        /// File with newline-delimited hosts/CIDRs (comments with # and blanks ignored)
        #[arg(long, value_name = "FILE", conflicts_with = "target")]
        targets: Option<PathBuf>,
        /// Ports: comma/range list (e.g., 8000,11434 or 8000-8002). Default: well-known LLM ports.
        #[arg(long)]
        ports: Option<String>,
        /// Connect/read timeout per target in milliseconds [default: 1500]
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Max concurrent probes [default: 256]
        #[arg(long)]
        concurrency: Option<usize>,
        /// QPS cap for probe launches; 0 disables pacing [default: 0]
        #[arg(long)]
        qps: Option<u32>,
        /// Connect retries per target [default: 0]
        #[arg(long)]
        retries: Option<u32>,
        /// Base delay between retries in milliseconds
        #[arg(long, default_value_t = 50)]
        retry_delay_ms: u64,
        /// Probe parameters (aggressive, metrics, detect-version, user-agent) as NAME, NAME=VALUE
        /// or "-NAME VALUE"; one value may carry several, e.g. "-aggressive -detect-version". Repeatable.
        #[arg(long = "probe-arg", value_name = "ARGS", allow_hyphen_values = true)]
        probe_args: Vec<String>,
        /// Output format: text, json, or jsonl [default: text]
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Output file (overwrites). Stdout if omitted.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Write CSV instead of text/json (requires --out)
        #[arg(long, default_value_t = false)]
        csv: bool,
        /// Also show targets that did not answer with HTTP
        #[arg(long, default_value_t = false)]
        all: bool,
    },
}

/// Split one `--probe-arg` value into parameters. A token starting with `-`
/// (or the first token) names a parameter, optionally as `NAME=VALUE`; bare
/// words after it are joined into its value. A bare name is a flag set to enable.
#[cfg_attr(not(feature = "llm"), allow(dead_code))]
fn split_probe_args(arg: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for tok in arg.split_whitespace() {
        match out.last_mut() {
            Some((_, value)) if !tok.starts_with('-') => {
                if !value.is_empty() { value.push(' '); }
                value.push_str(tok);
            }
            _ => {
                let tok = tok.trim_start_matches('-');
                out.push(match tok.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (tok.to_string(), String::new()),
                });
            }
        }
    }
    out
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);
    #[cfg(feature = "llm")]
    let loaded_cfg = config::load_config(cli.config.as_deref());
    #[cfg(not(feature = "llm"))]
    let _loaded_cfg: Option<config::Config> = None;
    match cli.command {
        Commands::Version => {
            println!("toolbox {} (core {})", env!("CARGO_PKG_VERSION"), toolbox_core::version());
        }
        #[cfg(feature = "llm")]
        Commands::Probes => {
            use toolbox_core::{ParamKind, Probe};
            let probe = llm_inference::LlmInferenceProbe::new();
            println!("{} ({:?})", probe.name(), probe.kind());
            for p in probe.params() {
                let kind = match p.kind { ParamKind::Flag => "flag", ParamKind::Arg => "arg" };
                println!("  -{} <{}>", p.name, kind);
            }
        }
        #[cfg(feature = "llm")]
        Commands::Llm { target, targets, mut ports, timeout_ms, concurrency, qps, retries, retry_delay_ms, probe_args, format, out, csv, all } => {
            use std::sync::Arc;
            use std::time::Duration;
            use toolbox_core::Probe;

            let file_cfg = loaded_cfg.and_then(|c| c.llm).unwrap_or_default();
            if ports.is_none() { ports = file_cfg.ports.clone(); }
            let timeout_ms = timeout_ms.or(file_cfg.timeout_ms).unwrap_or(1500);
            let concurrency = concurrency.or(file_cfg.concurrency).unwrap_or(256);
            let qps = qps.or(file_cfg.qps).unwrap_or(0);
            let retries = retries.or(file_cfg.retries).unwrap_or(0);
            let format = format
                .or_else(|| file_cfg.format.as_deref().map(OutputFormat::from_config))
                .unwrap_or(OutputFormat::Text);

            // file parameters first so the command line wins
            let mut probe = llm_inference::LlmInferenceProbe::new();
            let cli_args = probe_args.iter().flat_map(|a| split_probe_args(a));
            for (name, value) in file_cfg.probe_args().into_iter().chain(cli_args) {
                probe.set(&name, &value).map_err(|e| anyhow!("probe {}: {}", llm_inference::PROBE_NAME, e))?;
            }

            let ports_vec = match ports {
                Some(spec) => toolbox_core::ports::parse_ports(&spec)?,
                None => toolbox_core::ports::default_llm_ports(),
            };
            let hosts = if let Some(t) = target {
                vec![crate::targets::HostSpec::parse(&t)?]
            } else if let Some(path) = targets {
                let fh = std::fs::File::open(&path)?;
                crate::targets::read_hosts(std::io::BufReader::new(fh))?
            } else {
                return Err(anyhow!("provide a target or --targets <file>"));
            };
            let work = crate::targets::cross(hosts, ports_vec);

            type Sink = render::OutcomeWriter<Box<dyn std::io::Write>>;
            let mut writer = match out {
                Some(path) if csv => Sink::csv(Box::new(std::fs::File::create(&path)?))?,
                Some(path) => Sink::lines(Box::new(std::io::BufWriter::new(std::fs::File::create(&path)?)), format),
                None if csv => return Err(anyhow!("--csv requires --out <file>")),
                None => Sink::lines(Box::new(std::io::stdout().lock()), format),
            };

            probe.init();
            let opts = driver::DriverOptions {
                timeout: Duration::from_millis(timeout_ms),
                retries,
                retry_delay: Duration::from_millis(retry_delay_ms),
                ..Default::default()
            };
            let rt = tokio::runtime::Runtime::new()?;
            let probe = Arc::new(probe);
            let shared = probe.clone();
            // outcomes are written as they complete, in completion order
            let written = rt.block_on(async {
                let limiter = if qps == 0 { None } else { Some(toolbox_core::ratelimiter::RateLimiter::new(qps)) };
                let mut rx = driver::probe_many(shared, work, opts, concurrency, limiter);
                let (mut seen, mut reported) = (0usize, 0usize);
                while let Some(o) = rx.recv().await {
                    seen += 1;
                    if all || render::visible(&o) {
                        writer.write(&o)?;
                        reported += 1;
                    }
                }
                Ok::<_, anyhow::Error>((seen, reported))
            });
            // runtime shutdown drops every worker's handle on the probe
            drop(rt);
            match Arc::try_unwrap(probe) {
                Ok(mut probe) => probe.close(),
                Err(_) => tracing::warn!("probe still shared at shutdown, skipping close"),
            }

            let (seen, reported) = written?;
            writer.finish()?;
            info!(targets = seen, reported, "llm probe finished");
        }
    }
    Ok(())
}
