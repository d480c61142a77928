//! Shared plumbing for the Idzey command-line binaries.

pub mod common;
