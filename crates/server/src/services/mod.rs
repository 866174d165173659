//! Application services layered over the repositories.

pub mod auth;
pub mod media;
