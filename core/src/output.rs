//! Output record handed back to the engine after a response is handled.

/// Maximum byte length of `OutItem::classification`.
pub const CLASSIFICATION_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutLevel {
    #[default]
    Info,
    Success,
    Failure,
}

impl OutLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutLevel::Info => "info",
            OutLevel::Success => "success",
            OutLevel::Failure => "failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportValue {
    Text(String),
    Banner(Vec<u8>),
}

/// Ordered named entries attached to a record as supporting evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    entries: Vec<(String, ReportValue)>,
}

impl ProbeReport {
    pub fn append_text(&mut self, name: &str, value: impl Into<String>) {
        self.entries.push((name.to_string(), ReportValue::Text(value.into())));
    }

    pub fn append_banner(&mut self, name: &str, bytes: &[u8]) {
        self.entries.push((name.to_string(), ReportValue::Banner(bytes.to_vec())));
    }

    pub fn get(&self, name: &str) -> Option<&ReportValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutItem {
    pub level: OutLevel,
    /// Set when the engine should emit nothing for this target.
    pub no_output: bool,
    pub classification: String,
    pub evidence: String,
    pub report: ProbeReport,
}

impl OutItem {
    /// A record the engine drops silently.
    pub fn suppressed() -> Self {
        OutItem { no_output: true, ..Default::default() }
    }

    /// A record for a target the engine could not exchange data with.
    pub fn failure(reason: &str) -> Self {
        let mut item = OutItem { level: OutLevel::Failure, ..Default::default() };
        item.report.append_text("error", reason);
        item
    }

    /// Store `label`, cut to `CLASSIFICATION_SIZE` bytes on a char boundary.
    pub fn set_classification(&mut self, label: &str) {
        let mut end = label.len().min(CLASSIFICATION_SIZE);
        while !label.is_char_boundary(end) { end -= 1; }
        self.classification = label[..end].to_string();
    }
}
