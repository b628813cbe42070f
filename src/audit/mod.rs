//! Asynchronous delivery audit: durably records which client instance
//! received which configuration release, collapsing the heavy duplication
//! of steady-state config fetches into idempotent upserts.
//!
//! Best-effort by design: the queue is bounded and drops under overload,
//! and failed events are never retried. This is observability data, not a
//! system of record for delivery.

mod auditor;
mod cache;
mod model;

pub use auditor::*;
pub(crate) use cache::*;
pub use model::*;
