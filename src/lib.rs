//! Administer versioned dataset repositories on the Hugging Face hub.
//!
//! Layers, innermost first:
//! - [`domain`]: episode naming, repository references, datasets (no I/O)
//! - [`application`]: services orchestrating the domain over a [`DatasetHub`]
//! - [`infrastructure`]: the HTTP hub client, confirmation prompts, DI container
//! - [`cli`]: argument parsing, command handlers, terminal output
//!
//! [`DatasetHub`]: infrastructure::traits::DatasetHub

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
