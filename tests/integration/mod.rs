//! Integration tests for routescript's loader
//!
//! These tests load real scripts and inspect the resulting model.

mod error_handler_test;
mod loader_source_test;
