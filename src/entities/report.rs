//! RPT record type - Test report awaiting approval and communication

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::record::Record;

/// Approval state of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum FinalStatus {
    #[default]
    Draft,
    ReadyForApproval,
    Approved,
    Rejected,
}

impl FinalStatus {
    pub fn all() -> &'static [FinalStatus] {
        &[
            FinalStatus::Draft,
            FinalStatus::ReadyForApproval,
            FinalStatus::Approved,
            FinalStatus::Rejected,
        ]
    }
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinalStatus::Draft => write!(f, "draft"),
            FinalStatus::ReadyForApproval => write!(f, "ready_for_approval"),
            FinalStatus::Approved => write!(f, "approved"),
            FinalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for FinalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(FinalStatus::Draft),
            "ready_for_approval" | "ready" => Ok(FinalStatus::ReadyForApproval),
            "approved" => Ok(FinalStatus::Approved),
            "rejected" => Ok(FinalStatus::Rejected),
            _ => Err(format!(
                "Invalid final status: {}. Use draft, ready_for_approval, approved, or rejected",
                s
            )),
        }
    }
}

/// Delivery state of an approved report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum CommStatus {
    #[default]
    Pending,
    Dispatched,
    Delivered,
}

impl std::fmt::Display for CommStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommStatus::Pending => write!(f, "pending"),
            CommStatus::Dispatched => write!(f, "dispatched"),
            CommStatus::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for CommStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(CommStatus::Pending),
            "dispatched" => Ok(CommStatus::Dispatched),
            "delivered" => Ok(CommStatus::Delivered),
            _ => Err(format!(
                "Invalid communication status: {}. Use pending, dispatched, or delivered",
                s
            )),
        }
    }
}

/// Channel a report is communicated through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum CommChannel {
    Courier,
    InPerson,
    #[default]
    Email,
}

impl std::fmt::Display for CommChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommChannel::Courier => write!(f, "courier"),
            CommChannel::InPerson => write!(f, "in_person"),
            CommChannel::Email => write!(f, "email"),
        }
    }
}

impl std::str::FromStr for CommChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "courier" => Ok(CommChannel::Courier),
            "in_person" | "inperson" => Ok(CommChannel::InPerson),
            "email" => Ok(CommChannel::Email),
            _ => Err(format!(
                "Invalid communication channel: {}. Use courier, in_person, or email",
                s
            )),
        }
    }
}

/// A report produced from a lab test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier (RPT-...)
    pub id: RecordId,

    /// Owning lab test (LAB-...)
    pub test: RecordId,

    /// Customer asked for the sample to be re-tested
    #[serde(default)]
    pub retesting_requested: bool,

    /// Approval state
    #[serde(default)]
    pub final_status: FinalStatus,

    /// Who approved the report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    /// Delivery state
    #[serde(default)]
    pub comm_status: CommStatus,

    /// Delivery channel
    #[serde(default)]
    pub comm_channel: CommChannel,

    /// Accounts were told the report is ready for billing
    #[serde(default)]
    pub communicated_to_accounts: bool,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Last update timestamp
    pub updated: DateTime<Utc>,
}

impl Record for Report {
    const PREFIX: RecordPrefix = RecordPrefix::Rpt;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn status(&self) -> String {
        self.final_status.to_string()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn updated(&self) -> DateTime<Utc> {
        self.updated
    }
}

impl Report {
    /// Start a draft report for a lab test
    pub fn new(test: RecordId) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(RecordPrefix::Rpt),
            test,
            retesting_requested: false,
            final_status: FinalStatus::default(),
            approved_by: None,
            comm_status: CommStatus::default(),
            comm_channel: CommChannel::default(),
            communicated_to_accounts: false,
            created: now,
            updated: now,
        }
    }

    /// Approve the report on behalf of `approver`
    pub fn approve(mut self, approver: impl Into<String>) -> Self {
        self.final_status = FinalStatus::Approved;
        self.approved_by = Some(approver.into());
        self
    }
}
