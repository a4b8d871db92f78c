//! Rust library for parsing and building MIME emails.
//!
//! Raw RFC 5322 bytes are parsed into an [`Email`] with
//! [`Email::from_raw`], and an [`Email`] is turned back into a signed
//! MIME message with [`Email::to_signed_bytes`].

pub(crate) mod process;

pub mod signer;
pub use signer::{CmdSigner, CmdSignerConfig, EmailSigner, Signer, SignerBuilder};

pub mod domain;
pub use domain::*;
