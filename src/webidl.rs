//! Main module for webidl library functionality

pub mod config;
pub mod error;
pub mod model;
pub mod parsing;
pub mod stream;
