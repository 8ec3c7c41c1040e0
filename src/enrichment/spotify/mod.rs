//! Spotify Web API integration
//!
//! Primary catalog: service tokens, track search with a query ladder, and the
//! playlist endpoints used by export.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;
mod token;

pub use client::{SpotifyClient, pick_best, search_ladder};
pub use token::TokenCache;
