//! NUMA probe library
//!
//! This crate provides the core functionality for:
//! - Querying NUMA topology and page placement from the kernel
//! - Forcing pages onto a chosen node and observing automatic migration
//! - Access-pattern microbenchmarks over large in-memory arrays
//! - Structured logging of harness events

pub mod bench;
pub mod clock;
pub mod migration;
pub mod models;
pub mod numa;
pub mod observability;
pub mod region;

pub use models::*;
pub use observability::ProbeLogger;
pub use region::MemoryRegion;
