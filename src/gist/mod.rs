pub mod client;
pub mod types;

pub use client::GistClient;
pub use types::{FetchedGist, FileContent, Gist, GistFile, RateLimitInfo};
