//! The greeting feature.

pub mod greeting_api;
pub mod greeting_repository;
pub mod greeting_service;
