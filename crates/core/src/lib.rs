//! Shoplite Core - Shared types library.
//!
//! This crate provides common types used by the Shoplite server:
//! newtype IDs, the validated [`Email`] type, and the [`OrderStatus`]
//! enumeration.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
