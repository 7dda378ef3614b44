//! Note-taking service: CRUD over HTTP, persisted as per-field entries in a
//! key-value store.

pub mod config;
pub mod controllers;
pub mod http;
pub mod kv;
pub mod notes;
