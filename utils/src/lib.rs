//! Shared infrastructure utilities for boxbreath.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)

pub mod atomic_write;

pub use atomic_write::{Durability, atomic_write, atomic_write_with, recover_bak_file};
