//! Distributed coordinator/worker plumbing
//!
//! One coordinator drives N worker services over TCP. Each worker receives a
//! single assignment, scans its subrange, and sends back exactly one result
//! record. Standalone runs use the same protocol against in-process services
//! bound to ephemeral localhost ports.

pub mod coordinator;
pub mod protocol;
pub mod worker_service;

pub use coordinator::Coordinator;
pub use worker_service::WorkerService;
