pub mod config;
pub mod db;
pub mod http;
pub mod middleware;
pub mod provider;
pub mod repositories;
pub mod storage;
