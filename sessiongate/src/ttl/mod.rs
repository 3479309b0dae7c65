// Copyright (c) 2024-2025 SessionGate Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Expiring key-value store shared by the token store and the connection pool

pub mod map;

pub use map::{Removed, Rename, TtlMap, DEFAULT_SHARDS};
