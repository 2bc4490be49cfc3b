use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of non-fatal conditions a confirmation can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningKind {
    TourPast,
    TourFull,
    TourCancelled,
    TourDeleted,
    Oversubscribed,
    InvalidHeights,
    UnknownHeights,
    NoName,
    NoEmail,
    PaymentNotRecorded,
    ConfirmationNotRecorded,
    CustomerEmailFailed,
    OperatorEmailFailed,
    TeamsLookupFailed,
    ViewRenderFailed,
}

impl WarningKind {
    pub fn code(&self) -> &'static str {
        match self {
            WarningKind::TourPast => "tour:past",
            WarningKind::TourFull => "tour:full",
            WarningKind::TourCancelled => "tour:cancelled",
            WarningKind::TourDeleted => "tour:deleted",
            WarningKind::Oversubscribed => "riders:oversubscribed",
            WarningKind::InvalidHeights => "riders:invalid-heights",
            WarningKind::UnknownHeights => "riders:unknown-heights",
            WarningKind::NoName => "contact:no-name",
            WarningKind::NoEmail => "contact:no-email",
            WarningKind::PaymentNotRecorded => "order:payment-recorded",
            WarningKind::ConfirmationNotRecorded => "order:confirmation-sent",
            WarningKind::CustomerEmailFailed => "email:customer",
            WarningKind::OperatorEmailFailed => "email:operator",
            WarningKind::TeamsLookupFailed => "teams:lookup",
            WarningKind::ViewRenderFailed => "view:render",
        }
    }

    /// Blocking warnings suppress the automatic customer email.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            WarningKind::TourPast
                | WarningKind::TourFull
                | WarningKind::TourCancelled
                | WarningKind::TourDeleted
                | WarningKind::Oversubscribed
                | WarningKind::InvalidHeights
                | WarningKind::NoName
                | WarningKind::NoEmail
        )
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A recorded warning with optional diagnostic detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub detail: Option<String>,
}

impl Warning {
    pub fn new(kind: WarningKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: WarningKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }
}

impl From<WarningKind> for Warning {
    fn from(kind: WarningKind) -> Self {
        Warning::new(kind)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}({})", self.kind.code(), detail),
            None => f.write_str(self.kind.code()),
        }
    }
}

impl Serialize for Warning {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Duplicate-free warnings for one request, keyed by kind.
///
/// Recording a kind twice keeps the first detail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningSet {
    entries: BTreeMap<WarningKind, Warning>,
}

impl WarningSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, warning: impl Into<Warning>) {
        let warning = warning.into();
        self.entries.entry(warning.kind).or_insert(warning);
    }

    pub fn contains(&self, kind: WarningKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn has_blocking(&self) -> bool {
        self.entries.keys().any(WarningKind::is_blocking)
    }

    pub fn blocking(&self) -> impl Iterator<Item = &Warning> {
        self.entries.values().filter(|w| w.kind.is_blocking())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Comma-separated codes, for log lines and email summaries.
    pub fn codes(&self) -> String {
        self.entries
            .keys()
            .map(WarningKind::code)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for WarningSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.entries.values().map(Warning::to_string).collect();
        f.write_str(&rendered.join(" "))
    }
}

impl Serialize for WarningSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.entries.values())
    }
}
