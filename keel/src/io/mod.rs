//! Collaborator adapters: storage, pause flags, event history, config.

pub mod cloud_lookup;
pub mod config;
pub mod event_store;
mod fs_util;
pub mod init;
pub mod pause_store;
pub mod set_store;
