pub mod api;
pub mod db;
pub mod mongodb;
pub mod recency;
pub mod store;
pub mod vote;
