// ABOUTME: Configuration module for environment-driven server settings
// ABOUTME: Re-exports the environment configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Configuration management

/// Environment-based server configuration
pub mod environment;
