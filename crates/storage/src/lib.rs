#![forbid(unsafe_code)]

pub mod file_cache;
pub mod http;
pub mod repository;
pub mod sqlite;
