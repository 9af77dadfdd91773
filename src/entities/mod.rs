//! Record type definitions
//!
//! TrackLite follows a sample through four linked record kinds:
//!
//! - [`Intake`] - Receipt of samples at a branch (root of every chain)
//! - [`LabTest`] - Lab test run on the received samples
//! - [`Report`] - Test report, its approval and its communication
//! - [`Invoice`] - Invoice raised for an approved report

pub mod intake;
pub mod invoice;
pub mod lab_test;
pub mod report;

pub use intake::{Intake, ReceivingMode};
pub use invoice::{Invoice, InvoiceStatus};
pub use lab_test::{LabTest, TestStatus};
pub use report::{CommChannel, CommStatus, FinalStatus, Report};
