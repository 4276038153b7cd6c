//! Record store for agora-rs.
//!
//! The decision engine consumes persistence through this crate's narrow
//! repository interfaces: CRUD and filtered queries per record type, the
//! atomic latest-flag replacement for stances, and the sum-by-group
//! aggregate query feeding stance totals. The backing [`Store`] keeps
//! records in memory; swapping in a durable backend is a matter of
//! reimplementing the repositories, not the engine.

pub mod records;
pub mod repositories;
pub mod store;
pub mod test_utils;

pub use store::Store;
