//! Jenkins Core
//!
//! Core types shared by callers of the Jenkins REST client.
//!
//! This crate contains:
//! - Domain types: records returned by the server (crumbs, log chunks, node and view kinds)
//! - DTOs: per-operation option structures accepted by the client

pub mod domain;
pub mod dto;
