pub mod app;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod grouper;
pub mod metadata;
pub mod output;
pub mod query;
pub mod xml;
