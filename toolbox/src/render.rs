use crate::driver::ProbeOutcome;
use anyhow::Result;
use std::io::Write;
use toolbox_core::{OutLevel, ReportValue};

#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum OutputFormat { Text, Json, Jsonl }

impl OutputFormat {
    pub fn from_config(s: &str) -> Self {
        match s { "json" => OutputFormat::Json, "jsonl" => OutputFormat::Jsonl, _ => OutputFormat::Text }
    }
}

/// Failures and unsuppressed records; what the operator sees without `--all`.
pub fn visible(o: &ProbeOutcome) -> bool {
    !o.item.no_output
}

fn text_entry(o: &ProbeOutcome, name: &str) -> Option<String> {
    match o.item.report.get(name)? {
        ReportValue::Banner(b) => Some(String::from_utf8_lossy(b).into_owned()),
        ReportValue::Text(t) => Some(t.clone()),
    }
}

fn status(o: &ProbeOutcome) -> Option<u16> {
    text_entry(o, "status")?.parse().ok()
}

fn error(o: &ProbeOutcome) -> Option<String> {
    if o.item.level != OutLevel::Failure { return None; }
    text_entry(o, "error")
}

pub fn to_json(o: &ProbeOutcome) -> serde_json::Value {
    let classification = Some(o.item.classification.as_str()).filter(|c| !c.is_empty());
    serde_json::json!({
        "target": o.target.host,
        "port": o.target.port,
        "level": o.item.level.as_str(),
        "classification": classification,
        "evidence": o.item.evidence,
        "status": status(o),
        "banner": text_entry(o, "banner"),
        "started_at": o.started_at,
        "duration_ms": o.duration_ms,
        "error": error(o),
    })
}

pub fn to_text(o: &ProbeOutcome) -> String {
    let i = &o.item;
    if i.level == OutLevel::Failure {
        return format!("{} error: {}", o.target, error(o).unwrap_or_else(|| "unreachable".into()));
    }
    if i.no_output {
        return format!("{} no-response", o.target);
    }
    if i.evidence.is_empty() {
        format!("{} {} ({} ms)", o.target, i.classification, o.duration_ms)
    } else {
        format!("{} {} [{}] ({} ms)", o.target, i.classification, i.evidence, o.duration_ms)
    }
}

/// Writes outcomes one at a time as they arrive. JSON arrays are opened on the
/// first record and closed by `finish`.
pub enum OutcomeWriter<W: Write> {
    Lines { w: W, format: OutputFormat, written: usize },
    Csv(csv::Writer<W>),
}

impl<W: Write> OutcomeWriter<W> {
    pub fn lines(w: W, format: OutputFormat) -> Self {
        OutcomeWriter::Lines { w, format, written: 0 }
    }

    pub fn csv(w: W) -> Result<Self> {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(["target","port","level","classification","evidence","status","started_at","duration_ms","error"])?;
        Ok(OutcomeWriter::Csv(wtr))
    }

    pub fn write(&mut self, o: &ProbeOutcome) -> Result<()> {
        match self {
            OutcomeWriter::Lines { w, format: OutputFormat::Text, .. } => writeln!(w, "{}", to_text(o))?,
            OutcomeWriter::Lines { w, format: OutputFormat::Jsonl, .. } => {
                writeln!(w, "{}", serde_json::to_string(&to_json(o))?)?
            }
            OutcomeWriter::Lines { w, format: OutputFormat::Json, written } => {
                let sep = if *written == 0 { "[\n" } else { ",\n" };
                write!(w, "{}{}", sep, serde_json::to_string_pretty(&to_json(o))?)?;
                *written += 1;
            }
            OutcomeWriter::Csv(wtr) => wtr.write_record([
                o.target.host.clone(),
                o.target.port.to_string(),
                o.item.level.as_str().to_string(),
                o.item.classification.clone(),
                o.item.evidence.clone(),
                status(o).map(|s| s.to_string()).unwrap_or_default(),
                o.started_at.clone(),
                o.duration_ms.to_string(),
                error(o).unwrap_or_default(),
            ])?,
        }
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        match self {
            OutcomeWriter::Lines { mut w, format: OutputFormat::Json, written } => {
                if written == 0 { writeln!(w, "[]")?; } else { writeln!(w, "\n]")?; }
                w.flush()?;
            }
            OutcomeWriter::Lines { mut w, .. } => w.flush()?,
            OutcomeWriter::Csv(mut wtr) => wtr.flush()?,
        }
        Ok(())
    }
}
