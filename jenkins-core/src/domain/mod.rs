//! Core domain types
//!
//! This module contains the records the client hands back to callers and the small
//! enumerations that name server-side concepts (build numbers, node modes, view kinds, log
//! formats).

pub mod build;
pub mod crumb;
pub mod log;
pub mod node;
pub mod view;
