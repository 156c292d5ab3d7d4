//! Shift Rotation Engine
//!
//! This crate generates seniority-aware monthly shift rotations for a team,
//! validates completed schedules against a catalog of scheduling rules, and
//! repairs rule violations through a bounded local search. An optional AI
//! advisory adapter can suggest corrections; its proposals are always
//! re-validated by the deterministic detector before acceptance.

#![warn(missing_docs)]

pub mod advisory;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rules;
