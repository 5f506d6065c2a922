//! Test-only utilities, gated behind the `testing` feature the same way
//! the teacher crate gates its `testing` module.

pub mod dummy;
