//! Signer module.
//!
//! This module contains the signer interface. A signer receives the
//! fully serialized email and returns the bytes that are handed to
//! the transport, signature included.

use std::result;
use thiserror::Error;

use crate::{process, CmdSigner, EmailSigner};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build email signer: signer is not defined")]
    BuildEmailSignerMissingError,
    #[error("cannot sign email: signer returned an empty output")]
    SignEmptyOutputError,
    #[error("cannot sign email: {0}")]
    SignError(String),

    #[error("cannot run signing command")]
    RunCmdError(#[source] process::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Signs serialized emails. Implementations only read their key
/// material, so a single signer can be shared between threads.
pub trait Signer: Send + Sync {
    fn sign(&self, email: &str) -> Result<Vec<u8>>;
}

impl<F> Signer for F
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    fn sign(&self, email: &str) -> Result<Vec<u8>> {
        self(email)
    }
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct SignerBuilder;

impl SignerBuilder {
    pub fn build(config: &EmailSigner) -> Result<Box<dyn Signer>> {
        match config {
            EmailSigner::Cmd(config) => Ok(Box::new(CmdSigner::new(config.clone()))),
            EmailSigner::None => Err(Error::BuildEmailSignerMissingError),
        }
    }
}
