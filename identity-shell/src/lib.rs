//! identity-shell: role resolution and session persistence for the Factora
//! dashboard shell.
//!
//! The embedding UI drives everything through [`Shell`]: it wires the
//! credential channels, the role resolver and the session store, and owns
//! the background task that keeps the in-memory session cache in step with
//! other shell instances sharing the same storage area. Rendering, theming
//! and HTTP are deliberately outside this crate; the flow hands back states
//! and navigation paths, never markup.

pub mod config;
pub mod dtos;
pub mod models;
pub mod services;
pub mod shell;
pub mod utils;

pub use shell::{SessionCache, Shell};
