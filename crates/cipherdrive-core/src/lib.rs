//! # cipherdrive Core
//!
//! Domain types shared by every cipherdrive crate: account and content
//! identifiers, ledger-resident file metadata, and the hex wire encoding used
//! for wrapped keys.
//!
//! This crate contains no I/O and no cryptography. It is pure data.
//!
//! ## Key Types
//!
//! - [`AccountId`] - Externally assigned account address (case-insensitive)
//! - [`ContentId`] - Identifier returned by the content-addressed blob store
//! - [`FileMetadata`] - Ledger record for an owned file
//! - [`SharedFile`] - Ledger record for a file shared with an account
//! - [`FileCategory`] - Closed classification derived once from a MIME string
//!
//! ## Wire Encoding
//!
//! Wrapped keys travel through the ledger as hex strings. Owner grants are
//! written as bare lowercase hex; shares are written with a `0x` prefix.
//! Readers accept either form. See [`wire`].

pub mod error;
pub mod file;
pub mod types;
pub mod wire;

pub use error::{CoreError, Result};
pub use file::{FileCategory, FileMetadata, SharedFile};
pub use types::{AccountId, ContentId};
pub use wire::{decode_hex, encode_hex, encode_prefixed_hex, HEX_PREFIX};
