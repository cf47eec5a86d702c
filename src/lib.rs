pub mod commands;
pub mod config;
pub mod debug;
pub mod event;
pub mod extractor;
pub mod fetcher;
pub mod json_ld;
pub mod listing_cards;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod strategies;
pub mod tui;
pub mod utils;
