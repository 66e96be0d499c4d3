//! Codec adapters for format-specific implementations.
//!
//! Each module provides a thin adapter between the crate's typed API and a
//! native codec session.

pub(crate) mod jpeg;
