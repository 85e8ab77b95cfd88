//! # gcmt-core
//!
//! Safe logic behind the gcmt threading layer.
//!
//! This crate holds everything that does not need to touch the operating
//! system: the 1601-epoch tick arithmetic, errno classification for the
//! native primitives, lifecycle contracts for mutexes and threads, and the
//! GAMS constant tables consumed by data-exchange code. No `unsafe` code is
//! permitted at the crate level.

#![deny(unsafe_code)]

pub mod errno;
pub mod error;
pub mod gms;
pub mod pthread;
pub mod time;

pub use error::{GcmtError, GcmtResult};
pub use time::{Timespec, WtTime};
