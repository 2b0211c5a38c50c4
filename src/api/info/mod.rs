//! The application info feature.

pub mod info_api;
