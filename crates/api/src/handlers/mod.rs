//! Request handlers.
//!
//! Public handlers render pages and manage the language preference; admin
//! handlers delegate to [`beyond_site::ContentEditor`] and require
//! [`crate::middleware::rbac::RequireAdmin`].

pub mod admin;
pub mod auth;
pub mod language;
pub mod pages;
