//! MFA Analysis Library
//!
//! Fetches mutual fund disclosure documents, normalizes them into a common
//! shape, and aggregates them into cross-fund reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         mfa (pipeline binary)                       │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐     │
//! │  │  Fetch          │  │  Analysis       │  │  Storage        │     │
//! │  │  (coin api,     │─▶│  (holdings,     │─▶│  (dated report  │     │
//! │  │   pacing,       │  │   portfolio     │  │   + raw doc     │     │
//! │  │   retries)      │  │   composition)  │  │   trees)        │     │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘     │
//! │           ▲                    ▲                    │               │
//! │           └────────── orchestrator ─────────────────┘               │
//! │                                                     ▼               │
//! │                                          routes (read-only API)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Normalized documents
//! Every fetched disclosure becomes a [`document::FundDocument`]: fund info
//! plus a ranked holdings table. Analyzers never see provider formats.
//!
//! ## Analyzers
//! An analysis is a config entry naming an analyzer kind ("holdings" or
//! "portfolio-composition"), a fetch strategy, and tunables. The
//! [`analysis::Analyzer`] trait turns a batch of documents into one JSON
//! report.
//!
//! ## Run layout
//! Reports land under `{analysis_dir}/{YYYYMMDD}/...`, one subtree per
//! analyzer kind, one file per category for categorized analyses.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod document;
pub mod fetch;
pub mod normalize;
pub mod orchestrator;
pub mod routes;
pub mod storage;

pub use analysis::{create_analyzer, Analyzer, FetchedDocument};
pub use document::{FundDocument, FundInfo, RawHolding};
pub use fetch::{CoinApiFetcher, DocumentFetcher, FetchError, FetchPacer};
pub use orchestrator::{AnalysisOrchestrator, RunReport};
