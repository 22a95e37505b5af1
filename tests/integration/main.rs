//! Integration tests
//!
//! Exercise the injector and the orchestrator through the public API only.

mod common;
mod orchestration;
