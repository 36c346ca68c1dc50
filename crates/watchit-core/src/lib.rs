pub mod config;
pub mod error;
pub mod models;
pub mod recent;
pub mod search;
pub mod session;
pub mod storage;
pub mod watchlist;
