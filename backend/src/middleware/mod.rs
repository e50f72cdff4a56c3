//! Request extractors and middleware

pub mod client;

pub use client::ClientId;
