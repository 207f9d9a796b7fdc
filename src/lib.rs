pub mod about;
pub mod config;
pub mod db;
pub mod output;
pub mod preview;
pub mod search;
