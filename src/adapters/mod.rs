//! External system integrations for Sluice.
//!
//! - [`source`] - Batch sources (in-memory, Arrow IPC files)
//! - [`destination`] - Slice destinations (in-memory, Arrow IPC files, null)
//! - [`state`] - Run record storage
//! - [`factory`] - Builds sources and destinations from configuration
//!
//! # Design Pattern
//!
//! Adapters sit behind traits ([`source::BatchSource`],
//! [`destination::Destination`], [`state::RunStore`]) so the pipeline can be
//! tested against in-memory implementations.

pub mod destination;
pub mod factory;
pub mod source;
pub mod state;
