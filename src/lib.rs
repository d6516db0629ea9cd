pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod guard;
pub mod lock;
pub mod project;
pub mod publish;
pub mod release;
pub mod ui;
pub mod vcs;

pub use error::{ReleaseError, Result};
