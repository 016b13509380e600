pub mod auth;
pub mod blob;
pub mod config;
pub mod domain;
pub mod error;
pub mod policy;
pub mod repository;
pub mod service;
pub mod validation;
