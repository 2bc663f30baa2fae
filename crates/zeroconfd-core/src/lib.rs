//! # zeroconfd-core
//!
//! Shared domain types for the zeroconfd client crates.
//!
//! This crate provides:
//! - Protocol family and interface index types as carried on the wire
//! - Structured address values tied to a declared protocol family
//! - Ordered opaque TXT metadata records
//! - Common error types

pub mod address;
pub mod error;
pub mod txt;

pub use address::{Address, IfIndex, Protocol};
pub use error::{Error, ProtocolError, Result};
pub use txt::{TxtList, TxtRecord};
