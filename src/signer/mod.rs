pub mod config;
pub use config::{CmdSignerConfig, EmailSigner};

pub mod signer;
pub use signer::{Error, Result, Signer, SignerBuilder};

pub mod cmd;
pub use cmd::CmdSigner;
