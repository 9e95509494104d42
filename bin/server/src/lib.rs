//! SuperSaaS connector web server.
//!
//! This crate bridges an OIDC identity provider with the SuperSaaS
//! account-management API: it authenticates browser users via the
//! authorization-code flow, lazily provisions a matching SuperSaaS account,
//! and redirects the user into a ready-to-use SuperSaaS session.

pub mod auth;
pub mod config;
pub mod supersaas;
