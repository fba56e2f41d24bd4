//! Detour HTTP gateway library.
//!
//! The [`gateway`] module is primarily used by the `detour` server
//! binary; it is exposed as a library so integration tests can drive the
//! router in-process.

pub mod gateway;
