//! Data Transfer Objects for client operations
//!
//! Each operation that accepts optional settings takes one of these structures. Required
//! identifiers (job names, build numbers) are passed positionally; everything optional
//! lives here with a named field.

pub mod build;
pub mod credentials;
pub mod job;
pub mod node;
pub mod options;
