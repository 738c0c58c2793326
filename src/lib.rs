pub mod app;
pub mod audit;
pub mod config;
pub mod credential;
pub mod pipeline;
pub mod provider;
pub mod runtime;
pub mod shared;
pub mod templates;
