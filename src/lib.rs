pub mod commands;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod github;
pub mod health;
pub mod sources;
pub mod status;
