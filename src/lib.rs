//! Personalized book recommendations over a public catalog.
//!
//! The pipeline lives in [`services`]: candidates are sourced from the catalog
//! and from precomputed similar books, pooled, scored against the reader, and
//! ranked. [`api`] exposes it over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
