//! CIS Core
//!
//! Core types shared by the CIS client and runner.
//!
//! This crate contains:
//! - Domain types: Jobs, batches, job statuses and repositories
//! - DTOs: Wire records exchanged with the ClientIntegration API

pub mod domain;
pub mod dto;
