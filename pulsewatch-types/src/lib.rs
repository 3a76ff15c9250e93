//! # pulsewatch-types
//!
//! Core types for stream liveness monitoring. This crate defines the status
//! schema that the pulsewatch watchdog emits and that downstream consumers
//! (dashboards, safety controllers, log pipelines) can parse.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable `serde` and/or `minicbor` features as needed
//! - **Transport agnostic**: Works over TCP, files, message buses, or in-process channels
//! - **Versioned schema**: Reports include version info for forward compatibility
//! - **Ergonomic builders**: Fluent API for constructing status reports
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//! - `minicbor`: Compact binary serialization via CBOR
//! - `all`: Enable all serialization formats
//!
//! ## Example
//!
//! ```rust
//! use pulsewatch_types::StatusReport;
//!
//! // Build a report using the builder pattern
//! let report = StatusReport::builder()
//!     .stream("lidar", true)
//!     .stream("imu", false)
//!     .build();
//!
//! assert_eq!(report.len(), 2);
//! assert!(!report.healthy);
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is [`SchemaVersion::CURRENT`]. The version is
//! included in serialized reports to allow consumers to handle format
//! evolution gracefully.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod command;
mod status;
mod version;

pub use command::*;
pub use status::*;
pub use version::*;
