//! Data models for documents, extraction results, metrics and reports.

pub mod config;
pub mod document;
pub mod extraction;
pub mod metrics;
pub mod report;
