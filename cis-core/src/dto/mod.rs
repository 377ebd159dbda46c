//! Data Transfer Objects
//!
//! Records exchanged with the ClientIntegration API. Responses are validated
//! at deserialization time; optional fields default the way the service
//! omits them (empty strings, empty lists, zero timings).

pub mod environment;
pub mod job;
