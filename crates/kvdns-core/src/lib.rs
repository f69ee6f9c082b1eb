//! Record model and storage encodings for kvdns.
//!
//! This crate holds everything about records that does not touch I/O:
//!
//! - **Records**: the closed set of [`RecordType`]s and the [`RecordValue`]
//!   tagged union, with per-type storage slots
//! - **Codec**: fixed-width field encodings in [`codec`]
//! - **Keys**: the flat `name` / `name*field` key scheme in [`keys`]
//! - **LOC**: the geographic position presentation codec in [`loc`]
//! - **Errors**: [`CoreError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use kvdns_core::{RecordType, RecordValue};
//!
//! let mx = RecordValue::parse(RecordType::MX, &["10", "mail.example.com"])?;
//! for (slot, bytes) in mx.encode()? {
//!     println!("{} -> {} bytes", slot, bytes.len());
//! }
//! ```

pub mod codec;
mod error;
pub mod keys;
pub mod loc;
mod presentation;
pub mod record;
mod validate;

pub use error::{CoreError, Result};
pub use keys::normalize_name;
pub use loc::Loc;
pub use record::{FieldSet, RecordType, RecordValue, Slot};
