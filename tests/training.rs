//! Integration tests grouped by training subsystem.

#[path = "training/gbdt.rs"]
mod gbdt;
