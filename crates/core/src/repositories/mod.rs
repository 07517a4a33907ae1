//! Record management services.
//!
//! This module contains the services that wrap the record store for each collection:
//! the staff directory and the per-shift patient records.

pub mod shift_records;
pub mod staff_directory;
