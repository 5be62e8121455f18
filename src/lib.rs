//! gridline
//!
//! Tabular record engine: typed column filters over heterogeneous JSON
//! records, persisted column order/visibility/sort/filter state, and
//! tri-state bulk editing through an injected update sink.
//!
//! The core (`model`, `filter`, `state`, `bulk`) is pure; `persist`,
//! `source`, `config`, `logging` and `app` are the impure shell around it.

pub mod app;
pub mod bulk;
pub mod config;
pub mod filter;
pub mod logging;
pub mod model;
pub mod persist;
pub mod source;
pub mod state;
pub mod view;
