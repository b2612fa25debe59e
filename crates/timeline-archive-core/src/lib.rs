//! Conversion core between a table timeline's instants and their archival
//! records.
//!
//! This crate provides the foundational pieces for `timeline-archive`:
//!
//! - A closed registry of timeline actions, lifecycle states and table
//!   versions, plus an injectable read capability for instant bytes
//!   (`timeline` module).
//! - Payload entities carried by instants: commit and replace commit
//!   metadata, clean, rollback and savepoint metadata, compaction and
//!   clustering plans (`model` module).
//! - The structured (framed protobuf) and legacy text (JSON) encodings, and
//!   commit metadata conversion across both table format eras (`codec`
//!   module).
//! - The unified archival record, the shared action dispatch table, both
//!   record entry points and the LSM instant encoder (`archive` module).
//! - Local filesystem reads used by the local read capability (`storage`
//!   module).
//!
//! Higher-level crates are expected to depend on this core crate rather
//! than re-implementing the conversion rules.
#![deny(missing_docs)]
pub mod archive;
pub mod codec;
pub mod model;
pub mod storage;
pub mod timeline;
