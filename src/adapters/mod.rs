//! Adapters Layer
//!
//! Outbound adapters implement the domain ports against real transports.

pub mod outbound;
