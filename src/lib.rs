//! # Portal Harvest
//!
//! A sequential profile harvester for LMS portals.
//!
//! Portal Harvest logs in to a portal once, walks a numeric profile-id
//! range in ascending order with a fixed pause between requests, extracts
//! person fields from each profile page with configurable CSS selectors,
//! and upserts the results into a local SQLite file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────┐   ┌────────────────┐   ┌──────────┐
//! │ Credentials │──▶│ Authenticator │──▶│   Harvester    │──▶│  SQLite  │
//! │ (JSON file) │   │   (Session)   │   │ fetch→extract  │   │ persons  │
//! └─────────────┘   └───────────────┘   └────────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! harvest init                          # create the store
//! harvest login                         # check credentials
//! harvest run --start 15000 --end 15100 # walk a range
//! harvest stats
//! harvest get 15042
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`credentials`] | Username/password file |
//! | [`auth`] | Portal login and authenticated session |
//! | [`extract`] | Selector-driven field extraction |
//! | [`store`] | SQLite record store with upsert |
//! | [`harvest`] | The harvester loop |
//! | [`traits`] | Profile source seam |
//! | [`progress`] | Progress reporting on stderr |

pub mod auth;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod export;
pub mod extract;
pub mod get;
pub mod harvest;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod stats;
pub mod store;
pub mod traits;
