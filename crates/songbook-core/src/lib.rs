//! songbook-core — catalog model, share-link resolver and browsing state for
//! the songbook sheet-music browser. No terminal code lives here.

pub mod catalog;
pub mod config;
pub mod feed;
pub mod handoff;
pub mod paginate;
pub mod platform;
pub mod prefs;
pub mod resolver;
pub mod search;
pub mod state;
