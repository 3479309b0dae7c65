//! Test utilities for SessionGate integration tests
//!
//! - mock_backend: in-process connector/connection/authenticator doubles
//! - gateway_fixture: a gateway over an in-memory config store
//!
//! Tests go through the public API only.

#![allow(dead_code)]

pub mod gateway_fixture;
pub mod mock_backend;
