//! The `taskforge` library crate.
//!
//! Contains the configuration, error handling, domain models, authentication
//! core (password hashing, token issuance, session middleware), OAuth account
//! linking, and the HTTP routes for the TaskForge application. The main
//! binary (`main.rs`) wires these together into a running server.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod oauth;
pub mod routes;
