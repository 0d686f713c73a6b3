//! Reconcile the grammar lesson report and the resource index with the
//! publication status held by the remote video catalog.

pub mod config;
pub mod error;
pub mod index;
pub mod job;
pub mod remote;
pub mod report;
pub mod status;
