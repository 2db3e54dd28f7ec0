//! better-rm: safety-hardened file deletion
//!
//! This library provides the deletion engine behind the `better-rm` binary:
//! protected-path blocking, root preservation, trash diversion, dry-run
//! simulation and an audit trail for every removal.

pub mod audit;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod options;
pub mod path_checker;
pub mod protected;
pub mod remover;
pub mod trash;
