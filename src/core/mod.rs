//! Business logic
//!
//! The reconciliation core (pure functions) and the pipeline driver that
//! sequences the adapters around it.

pub mod pipeline;
pub mod reconcile;
