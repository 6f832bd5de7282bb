//! # Content Coverage Library
//!
//! Measures how many rows of a SQL seed corpus carry every required field,
//! without executing the SQL.
//!
//! The pipeline, bottom-up:
//!
//! - [`scanner`] - quote- and depth-aware scanning primitives
//! - [`comments`] - comment stripping that respects string literals
//! - [`statement`] - `INSERT INTO` span extraction
//! - [`insert`] - column list and `VALUES` / `SELECT` row parsing
//! - [`value`] - value presence rules
//! - [`coverage`] - per-table aggregation and percentages
//! - [`corpus`] - file discovery and parallel scanning
//! - [`remote`] - live data store as an alternative source

pub mod app;
pub mod catalog;
pub mod cli;
pub mod comments;
pub mod config;
pub mod corpus;
pub mod coverage;
pub mod error;
pub mod insert;
pub mod output;
pub mod remote;
pub mod scanner;
pub mod statement;
pub mod value;
