//! Common test utilities module
//!
//! Provides shared utilities for tests including:
//! - Fixture tables
//! - Temporary input files with automatic cleanup

#![allow(dead_code)]

pub mod test_utils;

pub use test_utils::{
    create_test_csv, create_test_file, equipment_table, single_column, TempTestFile,
};
