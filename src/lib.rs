pub mod cache;
pub mod config;
pub mod filter;
pub mod layout;
pub mod network;
pub mod pipeline;
pub mod session;
pub mod viewport;
