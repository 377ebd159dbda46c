//! Core domain types
//!
//! These types describe a job as the runner sees it while it drives the job
//! through the remote lifecycle, independent of the wire format.

pub mod environment;
pub mod job;
