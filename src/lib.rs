//! Productivity filters - cascading customer/model/station selection for the
//! productivity dashboard.
//!
//! This library exposes the core modules for testing and reuse.

pub mod config;
pub mod error;
pub mod filters;
pub mod lookup;
pub mod sync;
