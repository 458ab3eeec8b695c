//! editor-id-reset library
//!
//! Identifier reset and state purge engine for VS Code, VSCodium, Cursor
//! and JetBrains IDEs: path resolution, backup-guarded SQLite / JSON /
//! id-file mutation, and identifier generation.
//!
//! # Disclaimer
//!
//! This tool is not affiliated with or endorsed by Microsoft, Anysphere,
//! Inc. (Cursor), or JetBrains s.r.o. It modifies locally stored editor
//! data on your machine; every file it rewrites is first copied to a
//! `.backup` sibling.

pub mod config;
pub mod editor;
pub mod error;
pub mod report;
pub mod session;
