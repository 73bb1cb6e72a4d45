//! Core types, the storage contract, and the aggregation engine for the
//! thoughtlog clinic tool.
//!
//! This crate has no database or terminal dependencies.
//! Everything in [`aggregate`], [`period`], [`chart`] and [`view`] is pure and
//! can be tested without a store.

pub mod aggregate;
pub mod chart;
pub mod dimension;
pub mod error;
pub mod patient;
pub mod period;
pub mod store;
pub mod thought;
pub mod view;

pub use error::{Error, Result, ValidationError};
