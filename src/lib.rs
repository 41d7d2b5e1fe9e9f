//! Lazyliner - a keyboard-driven terminal client for Linear
//!
//! This library crate exposes internal modules for integration testing.

pub mod cli;
pub mod config;
pub mod data;
pub mod integrations;
pub mod tui;
