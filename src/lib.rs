//! Terminal client for the Qiita API built around a resource sync layer:
//! a deduplicating resource cache, URL-persisted committed query state and
//! staged user input.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod presentation;
pub mod state;
