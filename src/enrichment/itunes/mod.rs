//! iTunes Search API integration
//!
//! Secondary catalog for 30-second preview clips.
//!
//! API docs: https://performance-partners.apple.com/search-api

pub mod dto;
mod adapter;
mod client;

pub use client::ItunesClient;
