//! # Roster
//!
//! Ingests personal records (last name, first name, email, favorite color,
//! date of birth) from delimited files or HTTP request bodies, validates
//! them, keeps them in memory keyed by email, and serves them back in sorted
//! projections through an interactive shell and an HTTP API.
//!
//! ## Architecture
//!
//! ```text
//!  file (.csv/.psv/.ssv)      request body (text/*)
//!          │                          │
//!          ▼                          ▼
//!   ┌──────────────┐          ┌──────────────┐
//!   │ format       │          │ format       │
//!   │ from path    │          │ content-type │
//!   └──────┬───────┘          └──────┬───────┘
//!          ▼                          ▼
//!   ┌──────────────┐          ┌──────────────┐
//!   │ parse batch  │          │ parse single │
//!   │ (skip bad)   │          │ (fail fast)  │
//!   └──────┬───────┘          └──────┬───────┘
//!          └────────────┬─────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │ store        │
//!               │ email→Record │
//!               └──────┬───────┘
//!                      ▼
//!               ┌──────────────┐
//!               │ sort         │──▶ shell `list` / GET /records/{sort}
//!               └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Typed failures |
//! | [`models`] | The validated [`Record`](models::Record) |
//! | [`format`] | Format detection and delimiter strategies |
//! | [`parse`] | Batch (tolerant) and single-record (fail-fast) parsing |
//! | [`store`] | Record storage trait and in-memory backend |
//! | [`sort`] | Shell and HTTP sort profiles |
//! | [`shell`] | Interactive command shell |
//! | [`server`] | HTTP server |
//! | [`logging`] | Log initialization |

pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod parse;
pub mod server;
pub mod shell;
pub mod sort;
pub mod store;
