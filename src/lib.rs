//! # docqa
//!
//! Document question answering over keyword retrieval.
//!
//! docqa downloads documents (PDF, DOCX, plain text), extracts their text,
//! splits it into overlapping chunks, and answers natural-language questions
//! by ranking chunks on word overlap and composing a templated answer with
//! citations. The retrieval and answer logic lives in [`docqa_core`]; this
//! crate adds configuration, logging, document fetching and extraction, the
//! HTTP API, and the `docqa` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────────┐
//! │  fetch   │──▶│ extract  │──▶│ chunk + Store │
//! │ HTTP(S)  │   │ PDF/DOCX │   │  (in-memory)  │
//! └──────────┘   └──────────┘   └──────┬───────┘
//!                                      │
//!                      ┌───────────────┤
//!                      ▼               ▼
//!                 ┌──────────┐   ┌──────────┐
//!                 │   CLI    │   │   HTTP   │
//!                 │ (docqa)  │   │  server  │
//!                 └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docqa chunk ./manual.pdf
//! docqa ask "how do I reset the device?" --file ./manual.pdf
//! docqa serve --bind 0.0.0.0:5001
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`fetch`] | Document download |
//! | [`extract`] | PDF, DOCX and TXT text extraction |
//! | [`ingest`] | Download → extract → chunk → store |
//! | [`server`] | HTTP API |
//! | [`chunk_cmd`] | `docqa chunk` |
//! | [`ask`] | `docqa ask` |

pub mod ask;
pub mod chunk_cmd;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod server;

pub use docqa_core;
