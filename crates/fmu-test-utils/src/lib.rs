//! Shared test utilities for the fmu-settings workspace.
//!
//! Fixtures write raw `.fmu` trees to disk instead of going through
//! `fmu-settings`, so tests exercise the real loading path. This crate is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`fixtures`]: JSON documents in their on-disk shape
//! - [`project`]: [`TestProject`] builder for a temporary project directory

pub mod fixtures;
pub mod project;

pub use project::TestProject;
