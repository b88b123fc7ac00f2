//! Music corpus library - metadata normalization pipeline shared by all binaries.

pub mod assemble;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod safety;
pub mod store;
pub mod tags;
pub mod youtube;
