//! Deterministic, pure logic shared by the snapshot pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! notebooks and return deterministic outputs suitable for tests.

pub mod canonical;
pub mod disclaimer;
pub mod order;
