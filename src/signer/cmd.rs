//! Command signer module.
//!
//! This module contains the representation of the signer that pipes
//! emails through an external command.

use log::{debug, trace};

use crate::{process, signer, CmdSignerConfig, Signer};

pub struct CmdSigner {
    config: CmdSignerConfig,
}

impl CmdSigner {
    pub fn new(config: CmdSignerConfig) -> Self {
        Self { config }
    }
}

impl Signer for CmdSigner {
    fn sign(&self, email: &str) -> signer::Result<Vec<u8>> {
        trace!(">> sign email with command");
        debug!("signing command: {}", self.config.cmd);

        let output = process::run(&self.config.cmd, email.as_bytes())
            .map_err(signer::Error::RunCmdError)?;

        if output.is_empty() {
            return Err(signer::Error::SignEmptyOutputError);
        }

        trace!("<< sign email with command");
        Ok(output)
    }
}
