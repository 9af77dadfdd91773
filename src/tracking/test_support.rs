//! In-memory record reader for engine unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{RecordReader, TrackError};
use crate::core::cache::{CachedIntake, CachedInvoice, CachedReport, CachedTest};
use crate::core::identity::{RecordId, RecordPrefix};
use crate::entities::{
    CommChannel, CommStatus, FinalStatus, InvoiceStatus, ReceivingMode, TestStatus,
};

#[derive(Debug, Default)]
pub struct MemoryReader {
    pub intakes: Vec<CachedIntake>,
    pub tests: Vec<CachedTest>,
    pub reports: Vec<CachedReport>,
    pub invoices: Vec<CachedInvoice>,
    fail: bool,
}

impl MemoryReader {
    /// A reader whose every lookup fails like a dead database
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), TrackError> {
        if self.fail {
            return Err(TrackError::StoreUnavailable("database is locked".to_string()));
        }
        Ok(())
    }
}

impl RecordReader for MemoryReader {
    fn intake_by_awb(&self, awb: &str) -> Result<Option<CachedIntake>, TrackError> {
        self.check()?;
        Ok(self
            .intakes
            .iter()
            .find(|i| i.courier_awb.as_deref() == Some(awb))
            .cloned())
    }

    fn intake_by_id(&self, id: &RecordId) -> Result<Option<CachedIntake>, TrackError> {
        self.check()?;
        Ok(self.intakes.iter().find(|i| &i.id == id).cloned())
    }

    fn test_by_id(&self, id: &RecordId) -> Result<Option<CachedTest>, TrackError> {
        self.check()?;
        Ok(self.tests.iter().find(|t| &t.id == id).cloned())
    }

    fn report_by_id(&self, id: &RecordId) -> Result<Option<CachedReport>, TrackError> {
        self.check()?;
        Ok(self.reports.iter().find(|r| &r.id == id).cloned())
    }

    fn invoice_by_number(&self, number: &str) -> Result<Option<CachedInvoice>, TrackError> {
        self.check()?;
        Ok(self.invoices.iter().find(|i| i.invoice_no == number).cloned())
    }

    fn invoice_by_id(&self, id: &RecordId) -> Result<Option<CachedInvoice>, TrackError> {
        self.check()?;
        Ok(self.invoices.iter().find(|i| &i.id == id).cloned())
    }

    fn first_test_of(&self, intake: &RecordId) -> Result<Option<CachedTest>, TrackError> {
        self.check()?;
        Ok(self
            .tests
            .iter()
            .filter(|t| &t.intake_id == intake)
            .min_by(|a, b| (a.created, &a.id).cmp(&(b.created, &b.id)))
            .cloned())
    }

    fn first_report_of(&self, test: &RecordId) -> Result<Option<CachedReport>, TrackError> {
        self.check()?;
        Ok(self
            .reports
            .iter()
            .filter(|r| &r.test_id == test)
            .min_by(|a, b| (a.created, &a.id).cmp(&(b.created, &b.id)))
            .cloned())
    }

    fn first_invoice_of(&self, report: &RecordId) -> Result<Option<CachedInvoice>, TrackError> {
        self.check()?;
        Ok(self
            .invoices
            .iter()
            .filter(|i| &i.report_id == report)
            .min_by(|a, b| (a.created, &a.id).cmp(&(b.created, &b.id)))
            .cloned())
    }
}

/// Builds chains with strictly increasing timestamps
pub struct ReaderFixture {
    pub reader: MemoryReader,
    clock: DateTime<Utc>,
}

impl ReaderFixture {
    pub fn new() -> Self {
        Self {
            reader: MemoryReader::default(),
            clock: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    /// Advance the fixture clock by one minute and return it
    pub fn tick(&mut self) -> DateTime<Utc> {
        self.clock += Duration::minutes(1);
        self.clock
    }

    pub fn intake(&mut self, awb: Option<&str>, forwarded: bool) -> RecordId {
        let at = self.tick();
        let id = RecordId::new(RecordPrefix::Rcpt);
        self.reader.intakes.push(CachedIntake {
            id: id.clone(),
            courier_awb: awb.map(String::from),
            forward_to_central: forwarded,
            branch: "Mumbai".to_string(),
            company: "Acme Foods".to_string(),
            receiving_mode: if awb.is_some() {
                ReceivingMode::Courier
            } else {
                ReceivingMode::Person
            },
            created: at,
            updated: at,
        });
        id
    }

    pub fn test(&mut self, intake: &RecordId, status: TestStatus) -> RecordId {
        let created = self.tick();
        let updated = self.tick();
        let id = RecordId::new(RecordPrefix::Lab);
        self.reader.tests.push(CachedTest {
            id: id.clone(),
            intake_id: intake.clone(),
            lab_doc_no: "LAB-2024-001".to_string(),
            status,
            created,
            updated,
        });
        id
    }

    pub fn report(&mut self, test: &RecordId) -> RecordId {
        let at = self.tick();
        let id = RecordId::new(RecordPrefix::Rpt);
        self.reader.reports.push(CachedReport {
            id: id.clone(),
            test_id: test.clone(),
            final_status: FinalStatus::Draft,
            approved_by: None,
            comm_status: CommStatus::Pending,
            comm_channel: CommChannel::Email,
            created: at,
            updated: at,
        });
        id
    }

    pub fn invoice(&mut self, report: &RecordId, number: &str, status: InvoiceStatus) -> RecordId {
        let at = self.tick();
        let id = RecordId::new(RecordPrefix::Invc);
        self.reader.invoices.push(CachedInvoice {
            id: id.clone(),
            report_id: report.clone(),
            invoice_no: number.to_string(),
            status,
            issued_at: at,
            paid_at: None,
            created: at,
            updated: at,
        });
        id
    }

    pub fn report_mut(&mut self, id: &RecordId) -> &mut CachedReport {
        self.reader
            .reports
            .iter_mut()
            .find(|r| &r.id == id)
            .expect("report exists in fixture")
    }

    pub fn invoice_mut(&mut self, id: &RecordId) -> &mut CachedInvoice {
        self.reader
            .invoices
            .iter_mut()
            .find(|i| &i.id == id)
            .expect("invoice exists in fixture")
    }

    pub fn test_mut(&mut self, id: &RecordId) -> &mut CachedTest {
        self.reader
            .tests
            .iter_mut()
            .find(|t| &t.id == id)
            .expect("test exists in fixture")
    }
}
