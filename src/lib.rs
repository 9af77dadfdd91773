//! TrackLite: sample tracking timelines for a testing laboratory
//!
//! Intake receipts, lab tests, reports and invoices are kept as plain YAML
//! files. A tracking query (courier AWB, invoice number or record ID) is
//! resolved against a SQLite index of those files and answered with the
//! sample's status timeline and downloadable documents.

pub mod cli;
pub mod core;
pub mod entities;
pub mod tracking;
pub mod yaml;
