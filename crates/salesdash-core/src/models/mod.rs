//! Data models for sales sheets, invoices and configuration.

pub mod config;
pub mod invoice;
pub mod sales;
