//! # cipherdrive Testkit
//!
//! Testing utilities for cipherdrive.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Known-answer vectors**: fixed inputs with expected outputs for the
//!   identity and blob formats, plus structural checks for wrapped keys
//! - **Generators**: Proptest strategies for keys, nonces, files and accounts
//! - **Fixtures**: A drive over in-memory adapters with a fast KDF
//!
//! ## Vectors
//!
//! ```rust
//! use cipherdrive_testkit::vectors::{blob_vectors, check_blob_vector};
//!
//! for vector in blob_vectors() {
//!     assert!(check_blob_vector(&vector), "{}", vector.name);
//! }
//! ```
//!
//! ## Fixtures
//!
//! ```rust,no_run
//! use cipherdrive_testkit::fixtures::DriveFixture;
//!
//! async fn example() {
//!     let fixture = DriveFixture::new();
//!     let (alice, mut session) = fixture.register("alice").await;
//!     let file = fixture
//!         .drive
//!         .upload(&mut session, "a.txt", "text/plain", b"hi")
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_accounts, test_config, DriveFixture, TestAccount, TestDrive};
