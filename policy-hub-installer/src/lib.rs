//! Policy Hub Installer
//!
//! Resolves a bundle name against the hub index, downloads it, stamps its
//! install identifier, checks for an existing policy with that identifier
//! and submits it to the policy store.

mod installer;

pub use installer::{Installer, DEFAULT_CONCURRENCY};
