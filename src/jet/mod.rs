//! Jet (MDB/ACCDB) binary format engine.
//!
//! This module contains the on-disk structures and algorithms for the Jet
//! family of database files: the page channel and header mask, the pluggable
//! per-page codec, value encode/decode, data-page row storage, the B-tree
//! index engine, the table layer, cursors, and the top-level `Database`.
//!
//! Start with [`database::Database`] to open or create a file.

pub mod catalog;
pub mod channel;
pub mod charset;
pub mod codec;
pub mod constants;
pub mod cursor;
pub mod database;
pub mod format;
pub mod index;
pub mod row;
pub mod table;
pub mod usage_map;
pub mod value;
