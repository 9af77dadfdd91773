//! Timeline derivation
//!
//! A chain is projected onto a fixed order of eleven stages. Each stage has a
//! completion predicate over the chain. Milestone stages gate the walk: the
//! first milestone whose predicate fails ends it and every later stage stays
//! pending. `forwarded` and `central` are routing stages that a sample may
//! skip, so a failed predicate there leaves the stage pending without ending
//! the walk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chain::Chain;
use crate::entities::{CommStatus, FinalStatus, InvoiceStatus, TestStatus};

/// One named position in the sample lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Forwarded,
    Central,
    LabQueued,
    InProgress,
    Completed,
    ReportReady,
    Approved,
    Communicated,
    Invoiced,
    Paid,
}

impl Stage {
    /// Every stage in lifecycle order
    pub const ALL: [Stage; 11] = [
        Stage::Received,
        Stage::Forwarded,
        Stage::Central,
        Stage::LabQueued,
        Stage::InProgress,
        Stage::Completed,
        Stage::ReportReady,
        Stage::Approved,
        Stage::Communicated,
        Stage::Invoiced,
        Stage::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Forwarded => "forwarded",
            Stage::Central => "central",
            Stage::LabQueued => "lab_queued",
            Stage::InProgress => "in_progress",
            Stage::Completed => "completed",
            Stage::ReportReady => "report_ready",
            Stage::Approved => "approved",
            Stage::Communicated => "communicated",
            Stage::Invoiced => "invoiced",
            Stage::Paid => "paid",
        }
    }

    /// Static label shown for stages not reached yet
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Received => "Received at Branch",
            Stage::Forwarded => "Forwarded to Central",
            Stage::Central => "Received at Central",
            Stage::LabQueued => "Lab Queued",
            Stage::InProgress => "In Progress",
            Stage::Completed => "Completed",
            Stage::ReportReady => "Report Ready",
            Stage::Approved => "Report Approved",
            Stage::Communicated => "Communicated",
            Stage::Invoiced => "Invoiced",
            Stage::Paid => "Paid",
        }
    }

    /// Whether a failed predicate on this stage ends the walk
    pub fn is_milestone(&self) -> bool {
        !matches!(self, Stage::Forwarded | Stage::Central)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("Unknown stage: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Current => write!(f, "current"),
            StepStatus::Pending => write!(f, "pending"),
        }
    }
}

/// A stage as it appears in a derived timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub stage: Stage,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    /// Last stage whose predicate held
    pub current_stage: Stage,
    pub steps: Vec<Step>,
}

/// A satisfied predicate: when it happened and how to describe it
struct Reached {
    at: DateTime<Utc>,
    description: String,
}

/// Derive the timeline of a chain. Pure: the same chain always yields the
/// same timeline.
pub fn derive(chain: &Chain) -> Timeline {
    let mut current_stage = Stage::Received;
    let mut halted = false;
    let mut steps = Vec::with_capacity(Stage::ALL.len());

    for stage in Stage::ALL {
        let reached = if halted { None } else { evaluate(stage, chain) };
        match reached {
            Some(Reached { at, description }) => {
                current_stage = stage;
                steps.push(Step {
                    stage,
                    status: StepStatus::Completed,
                    timestamp: Some(at),
                    description,
                });
            }
            None => {
                halted |= stage.is_milestone();
                steps.push(Step {
                    stage,
                    status: StepStatus::Pending,
                    timestamp: None,
                    description: stage.label().to_string(),
                });
            }
        }
    }

    Timeline {
        current_stage,
        steps,
    }
}

fn evaluate(stage: Stage, chain: &Chain) -> Option<Reached> {
    let intake = &chain.intake;
    match stage {
        Stage::Received => Some(Reached {
            at: intake.created,
            description: format!("Received at {} branch", intake.branch),
        }),
        Stage::Forwarded => intake.forward_to_central.then(|| Reached {
            at: intake.created,
            description: "Forwarded to central lab".to_string(),
        }),
        Stage::Central => None,
        Stage::LabQueued => chain.test.as_ref().map(|test| Reached {
            at: test.created,
            description: format!("Queued for testing as {}", test.lab_doc_no),
        }),
        Stage::InProgress => {
            let test = chain.test.as_ref()?;
            testing_started(test.status).then(|| Reached {
                at: test.updated,
                description: "Testing started".to_string(),
            })
        }
        Stage::Completed => {
            let test = chain.test.as_ref()?;
            testing_finished(test.status).then(|| Reached {
                at: test.updated,
                description: "Testing completed".to_string(),
            })
        }
        Stage::ReportReady => chain.report.as_ref().map(|report| Reached {
            at: report.created,
            description: "Report prepared".to_string(),
        }),
        Stage::Approved => {
            let report = chain.report.as_ref()?;
            report_approved(report.final_status).then(|| Reached {
                at: report.updated,
                description: match &report.approved_by {
                    Some(approver) => format!("Report approved by {}", approver),
                    None => "Report approved".to_string(),
                },
            })
        }
        Stage::Communicated => {
            let report = chain.report.as_ref()?;
            report_communicated(report.comm_status).then(|| Reached {
                at: report.updated,
                description: format!("Report {} via {}", report.comm_status, report.comm_channel),
            })
        }
        Stage::Invoiced => chain.invoice.as_ref().map(|invoice| Reached {
            at: invoice.created,
            description: format!("Invoice {} raised", invoice.invoice_no),
        }),
        Stage::Paid => {
            let invoice = chain.invoice.as_ref()?;
            invoice_paid(invoice.status).then(|| Reached {
                at: invoice.paid_at.unwrap_or(invoice.updated),
                description: format!("Invoice {} paid", invoice.invoice_no),
            })
        }
    }
}

fn testing_started(status: TestStatus) -> bool {
    match status {
        TestStatus::InProgress | TestStatus::Completed => true,
        TestStatus::Queued | TestStatus::Failed | TestStatus::NeedsRetest | TestStatus::OnHold => {
            false
        }
    }
}

fn testing_finished(status: TestStatus) -> bool {
    match status {
        TestStatus::Completed => true,
        TestStatus::Queued
        | TestStatus::InProgress
        | TestStatus::Failed
        | TestStatus::NeedsRetest
        | TestStatus::OnHold => false,
    }
}

fn report_approved(status: FinalStatus) -> bool {
    match status {
        FinalStatus::Approved => true,
        FinalStatus::Draft | FinalStatus::ReadyForApproval | FinalStatus::Rejected => false,
    }
}

fn report_communicated(status: CommStatus) -> bool {
    match status {
        CommStatus::Dispatched | CommStatus::Delivered => true,
        CommStatus::Pending => false,
    }
}

fn invoice_paid(status: InvoiceStatus) -> bool {
    match status {
        InvoiceStatus::Paid => true,
        InvoiceStatus::Draft
        | InvoiceStatus::Issued
        | InvoiceStatus::Sent
        | InvoiceStatus::Cancelled => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::chain::load;
    use crate::tracking::resolver::resolve;
    use crate::tracking::test_support::ReaderFixture;

    fn chain_for(fx: &ReaderFixture, query: &str) -> Chain {
        let entry = resolve(&fx.reader, query).unwrap().unwrap();
        load(&fx.reader, &entry).unwrap().unwrap()
    }

    fn statuses(timeline: &Timeline) -> Vec<(Stage, StepStatus)> {
        timeline.steps.iter().map(|s| (s.stage, s.status)).collect()
    }

    fn completed(timeline: &Timeline) -> Vec<Stage> {
        timeline
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .map(|s| s.stage)
            .collect()
    }

    #[test]
    fn test_stage_round_trip_names() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
        assert_eq!(
            serde_json::to_string(&Stage::LabQueued).unwrap(),
            "\"lab_queued\""
        );
        assert!("queued".parse::<Stage>().is_err());
    }

    #[test]
    fn test_intake_only_local_sample() {
        let mut fx = ReaderFixture::new();
        fx.intake(Some("AWB1"), false);

        let timeline = derive(&chain_for(&fx, "AWB1"));
        assert_eq!(timeline.current_stage, Stage::Received);
        assert_eq!(timeline.steps.len(), 11);
        assert_eq!(completed(&timeline), vec![Stage::Received]);

        let forwarded = &timeline.steps[1];
        assert_eq!(forwarded.stage, Stage::Forwarded);
        assert_eq!(forwarded.status, StepStatus::Pending);
        assert_eq!(forwarded.timestamp, None);
        assert_eq!(forwarded.description, "Forwarded to Central");
    }

    #[test]
    fn test_forwarded_sample_in_testing() {
        let mut fx = ReaderFixture::new();
        let intake = fx.intake(Some("AWB1"), true);
        fx.test(&intake, TestStatus::InProgress);

        let timeline = derive(&chain_for(&fx, "AWB1"));
        assert_eq!(timeline.current_stage, Stage::InProgress);
        assert_eq!(
            completed(&timeline),
            vec![
                Stage::Received,
                Stage::Forwarded,
                Stage::LabQueued,
                Stage::InProgress
            ]
        );
        assert_eq!(timeline.steps[2].status, StepStatus::Pending);
        assert_eq!(timeline.steps[5].stage, Stage::Completed);
        assert_eq!(timeline.steps[5].status, StepStatus::Pending);
    }

    #[test]
    fn test_local_sample_skips_routing_stages() {
        let mut fx = ReaderFixture::new();
        let intake = fx.intake(None, false);
        fx.test(&intake, TestStatus::Queued);

        let timeline = derive(&chain_for(&fx, &intake.to_string()));
        assert_eq!(timeline.current_stage, Stage::LabQueued);
        assert_eq!(completed(&timeline), vec![Stage::Received, Stage::LabQueued]);
    }

    #[test]
    fn test_full_chain_reaches_invoiced() {
        let mut fx = ReaderFixture::new();
        let intake = fx.intake(Some("AWB1"), true);
        let test = fx.test(&intake, TestStatus::Completed);
        let report = fx.report(&test);
        {
            let r = fx.report_mut(&report);
            r.final_status = FinalStatus::Approved;
            r.approved_by = Some("Dr. Rao".to_string());
            r.comm_status = CommStatus::Dispatched;
        }
        fx.invoice(&report, "INV-2024-0001", InvoiceStatus::Sent);

        let timeline = derive(&chain_for(&fx, "AWB1"));
        assert_eq!(timeline.current_stage, Stage::Invoiced);

        let by_stage: Vec<_> = statuses(&timeline);
        for (stage, status) in &by_stage {
            let expected = match stage {
                Stage::Central | Stage::Paid => StepStatus::Pending,
                _ => StepStatus::Completed,
            };
            assert_eq!(*status, expected, "stage {stage}");
        }
        assert_eq!(timeline.steps[7].description, "Report approved by Dr. Rao");
        assert_eq!(timeline.steps[8].description, "Report dispatched via email");
    }

    #[test]
    fn test_failed_test_halts_walk() {
        let mut fx = ReaderFixture::new();
        let intake = fx.intake(None, true);
        let test = fx.test(&intake, TestStatus::Failed);
        // A report on a failed test cannot pull the timeline past testing
        let report = fx.report(&test);
        fx.report_mut(&report).final_status = FinalStatus::Approved;

        let timeline = derive(&chain_for(&fx, &intake.to_string()));
        assert_eq!(timeline.current_stage, Stage::LabQueued);
        assert_eq!(
            completed(&timeline),
            vec![Stage::Received, Stage::Forwarded, Stage::LabQueued]
        );
    }

    #[test]
    fn test_timestamps_follow_their_sources() {
        let mut fx = ReaderFixture::new();
        let intake = fx.intake(None, false);
        let test = fx.test(&intake, TestStatus::Completed);
        let report = fx.report(&test);
        {
            let r = fx.report_mut(&report);
            r.final_status = FinalStatus::Approved;
            r.comm_status = CommStatus::Delivered;
        }
        let invoice = fx.invoice(&report, "INV-2024-0002", InvoiceStatus::Paid);
        let chain = chain_for(&fx, &invoice.to_string());
        let test_rec = chain.test.clone().unwrap();
        let invoice_rec = chain.invoice.clone().unwrap();

        let timeline = derive(&chain);
        assert_eq!(timeline.current_stage, Stage::Paid);
        assert_eq!(timeline.steps[0].timestamp, Some(chain.intake.created));
        assert_eq!(timeline.steps[3].timestamp, Some(test_rec.created));
        assert_eq!(timeline.steps[4].timestamp, Some(test_rec.updated));
        assert_eq!(timeline.steps[5].timestamp, Some(test_rec.updated));
        // No payment time recorded: falls back to the invoice update time
        assert_eq!(timeline.steps[10].timestamp, Some(invoice_rec.updated));

        let paid_at = fx.tick();
        fx.invoice_mut(&invoice).paid_at = Some(paid_at);
        let timeline = derive(&chain_for(&fx, &invoice.to_string()));
        assert_eq!(timeline.steps[10].timestamp, Some(paid_at));
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let mut fx = ReaderFixture::new();
        let intake = fx.intake(Some("AWB1"), true);
        let test = fx.test(&intake, TestStatus::Completed);
        fx.report(&test);

        let chain = chain_for(&fx, "AWB1");
        let first = derive(&chain);
        let second = derive(&chain);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.steps).unwrap(),
            serde_json::to_string(&second.steps).unwrap()
        );
    }

    #[test]
    fn test_milestones_form_completed_prefix() {
        let comm = [CommStatus::Pending, CommStatus::Dispatched, CommStatus::Delivered];

        for forwarded in [false, true] {
            for test_status in TestStatus::all() {
                for final_status in FinalStatus::all() {
                    for comm_status in comm {
                        for invoice_status in InvoiceStatus::all() {
                            let mut fx = ReaderFixture::new();
                            let intake = fx.intake(None, forwarded);
                            let test = fx.test(&intake, *test_status);
                            let report = fx.report(&test);
                            {
                                let r = fx.report_mut(&report);
                                r.final_status = *final_status;
                                r.comm_status = comm_status;
                            }
                            fx.invoice(&report, "INV-2024-0009", *invoice_status);

                            let timeline = derive(&chain_for(&fx, &intake.to_string()));
                            let mut seen_pending = false;
                            for step in timeline.steps.iter().filter(|s| s.stage.is_milestone()) {
                                match step.status {
                                    StepStatus::Pending => seen_pending = true,
                                    _ => assert!(
                                        !seen_pending,
                                        "{} completed after a pending milestone",
                                        step.stage
                                    ),
                                }
                            }

                            let last_completed = timeline
                                .steps
                                .iter()
                                .filter(|s| s.status == StepStatus::Completed)
                                .last()
                                .map(|s| s.stage);
                            assert_eq!(last_completed, Some(timeline.current_stage));
                            assert!(timeline
                                .steps
                                .iter()
                                .all(|s| s.status != StepStatus::Current));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_pending_steps_carry_labels_only() {
        let mut fx = ReaderFixture::new();
        fx.intake(Some("AWB1"), false);

        let timeline = derive(&chain_for(&fx, "AWB1"));
        for step in timeline.steps.iter().skip(1) {
            assert_eq!(step.status, StepStatus::Pending);
            assert!(step.timestamp.is_none());
            assert_eq!(step.description, step.stage.label());
        }
    }
}
