//! Hearthtales - Family Storytelling Platform Backend
//!
//! This crate implements the resource wallet and package-purchase core:
//! project vouchers and facilitator/storyteller seats are consumed and
//! credited in lockstep with payment confirmation, invitation acceptance,
//! and project creation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
