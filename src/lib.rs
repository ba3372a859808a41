//! # Books Index
//!
//! Aggregates per-book `meta.json` files into a single consolidated index.
//!
//! ```text
//! data/books/<id>/meta.json ──▶ scan ──▶ normalize ──▶ dedup ──▶ sort ──▶ data/books_index.json
//!                                            │
//!                                     category table
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! build-index                               # defaults: ./data/books → ./data/books_index.json
//! build-index --sort title-first --shape compact
//! build-index --config ./config/index.toml
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`categories`] | Fixed category vocabulary |
//! | [`normalize`] | Raw metadata → index entry |
//! | [`collate`] | Title comparison |
//! | [`sort`] | Index ordering policies |
//! | [`scan`] | Candidate directory discovery |
//! | [`builder`] | The build pipeline |
//! | [`export`] | Index file output |
//! | [`report`] | Diagnostics |

pub mod builder;
pub mod categories;
pub mod collate;
pub mod config;
pub mod export;
pub mod models;
pub mod normalize;
pub mod report;
pub mod scan;
pub mod sort;
