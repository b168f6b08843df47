//! Diagnostics
//!
//! Collects warnings and errors reported while transforming, reconciling and
//! sampling taxonomy tables. Components receive a `&mut Diagnostics` and push
//! into it. Every item is also emitted as a tracing event, which the
//! binaries route to the log file (see [`crate::logging`]); the counters end
//! up in the run summaries.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing reported conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Relations ===
    /// A relation endpoint URI was never registered
    UnknownUri,
    /// Both relation endpoints resolve to the same concept
    SelfReference,

    // === Lineage ===
    /// No prior-version row shares the join key
    LineageMiss,

    // === Sampling ===
    /// SKILLTYPE is neither competence nor knowledge
    UnknownSkillCategory,
    /// A relation points at a skill id missing from skills.csv
    UnknownSkill,

    // === General ===
    /// The run aborted on a fatal error
    Aborted,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownUri => "W001",
            Self::SelfReference => "W002",
            Self::LineageMiss => "W003",
            Self::UnknownSkillCategory => "W004",
            Self::UnknownSkill => "W005",
            Self::Aborted => "E001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Aborted => Severity::Error,

            Self::UnknownUri
            | Self::SelfReference
            | Self::LineageMiss
            | Self::UnknownSkillCategory
            | Self::UnknownSkill => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single reported condition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Table or component the condition came from (e.g. "Skills Hierarchy")
    pub source: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Offending row or value, serialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl DiagnosticItem {
    pub fn new(
        source: impl Into<String>,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            code,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.source, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, ": {}", ctx)?;
        }
        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Accumulator for everything reported during one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item, mirroring it to the tracing subscriber
    pub fn push(&mut self, item: DiagnosticItem) {
        match item.severity() {
            Severity::Warning => tracing::warn!("{}", item),
            Severity::Error => tracing::error!("{}", item),
        }
        self.items.push(item);
    }

    /// Report a warning with the serialized offending row
    pub fn warn_row<T: Serialize>(
        &mut self,
        source: &str,
        code: DiagnosticCode,
        message: impl Into<String>,
        row: &T,
    ) {
        let ctx = serde_json::to_string(row).unwrap_or_else(|_| "<unserializable row>".to_string());
        self.push(DiagnosticItem::new(source, code, message).with_context(ctx));
    }

    /// Report a warning without row context
    pub fn warning(&mut self, source: &str, code: DiagnosticCode, message: impl Into<String>) {
        self.push(DiagnosticItem::new(source, code, message));
    }

    /// Record a fatal error so it lands in the log next to the warnings
    pub fn error(&mut self, source: &str, message: impl Into<String>) {
        self.push(DiagnosticItem::new(source, DiagnosticCode::Aborted, message));
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items with the given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Counters for run summaries
    pub fn counts(&self) -> DiagnosticCounts {
        DiagnosticCounts {
            warnings: self.warning_count(),
            errors: self.error_count(),
        }
    }

    /// Drop all items, e.g. between the complete and the sample export
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Warning/error counters as surfaced in run summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticCounts {
    pub warnings: usize,
    pub errors: usize,
}
