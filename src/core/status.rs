//! Docstatus state machine and the derived status fields.

use serde::{Deserialize, Serialize};

use super::error::RecordError;
use super::types::Record;

/// Authoritative document state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocStatus {
    /// 0, editable.
    #[default]
    Draft,
    /// 1, submitted (a submitted record is "Billed").
    Submitted,
    /// 2, cancelled and terminal.
    Cancelled,
}

impl DocStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Submitted => 1,
            Self::Cancelled => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Draft),
            1 => Some(Self::Submitted),
            2 => Some(Self::Cancelled),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Apply a lifecycle action.
    ///
    /// Draft → Submitted on submit, Submitted → Cancelled on cancel, and a
    /// Cancelled document may be amended into a new Draft. Everything else
    /// is rejected.
    pub fn transition(self, action: Action) -> Result<DocStatus, RecordError> {
        match (self, action) {
            (Self::Draft, Action::Submit) => Ok(Self::Submitted),
            (Self::Submitted, Action::Cancel) => Ok(Self::Cancelled),
            (Self::Cancelled, Action::Amend) => Ok(Self::Draft),
            (from, action) => Err(RecordError::Precondition(format!(
                "cannot {} a {} document",
                action.verb(),
                from.label()
            ))),
        }
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle actions driven by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Cancel,
    Amend,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Cancel => "cancel",
            Self::Amend => "amend",
        }
    }
}

/// Presentation-only status shown for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordStatus {
    #[default]
    Draft,
    Billed,
    Cancelled,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Billed => "Billed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// List-view indicator colour.
    pub fn indicator_color(&self) -> &'static str {
        match self {
            Self::Draft => "grey",
            Self::Billed => "green",
            Self::Cancelled => "red",
        }
    }

    pub fn from_docstatus(docstatus: DocStatus) -> Self {
        match docstatus {
            DocStatus::Draft => Self::Draft,
            DocStatus::Submitted => Self::Billed,
            DocStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recompute `record.status`.
///
/// A new record keeps whatever status it carries, except that a new record
/// created from an amendment is always "Draft".
pub fn set_status(record: &mut Record) {
    if record.is_new {
        if record.amended_from.is_some() {
            record.status = RecordStatus::Draft;
        }
        return;
    }
    record.status = RecordStatus::from_docstatus(record.docstatus);
}

/// Billing state of an invoice, rolled up from its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BillingStatus {
    #[default]
    NotBilled,
    PartlyBilled,
    FullyBilled,
    /// Billed beyond the configured allowance.
    Overbilled,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotBilled => "Not Billed",
            Self::PartlyBilled => "Partly Billed",
            Self::FullyBilled => "Fully Billed",
            Self::Overbilled => "Overbilled",
        }
    }
}

impl std::fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
