//! # panelgate-contracts
//!
//! Shared types, messages, and error contracts for the panelgate overlay.
//!
//! All crates in the workspace import from here. No behaviour lives in this
//! crate beyond the total role → visibility mapping and small conversions.

pub mod approval;
pub mod error;
pub mod message;
pub mod role;
pub mod visibility;
