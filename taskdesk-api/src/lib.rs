//! # TaskDesk API Server Library
//!
//! HTTP surface of TaskDesk, built on the services in `taskdesk-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `backup`: Streaming `pg_dump` exports
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod backup;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
