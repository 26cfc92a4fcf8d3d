pub mod client;
pub mod types;

pub use client::{GithubClient, GITHUB_API_BASE};
