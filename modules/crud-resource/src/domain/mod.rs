pub mod error;
pub mod permission;
pub mod registry;
pub mod service;
