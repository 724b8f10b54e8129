//! berth - an interactive terminal console for container engine resources
//! (containers, images, volumes, networks) and FTP daemon settings.
//!
//! This library exposes the core modules for use by the binary and by tests.

pub mod app;
pub mod cli;
pub mod commands;
pub mod docker;
pub mod error;
pub mod ftp;
pub mod handoff;
pub mod logging;
pub mod manager;
pub mod model;
pub mod view;
