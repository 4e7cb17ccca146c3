//! Integration tests for mintwatch-app.
//!
//! These tests verify the interaction between components:
//! - feed connection lifecycle
//! - subscription and event delivery
//! - reconnection behavior

pub mod common;
