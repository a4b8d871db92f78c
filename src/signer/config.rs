// mailcodec-lib, a Rust library for parsing and building emails.
// Copyright (C) 2022  soywod <clement.douin@posteo.net>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Signer config module.
//!
//! This module contains structures related to the signer
//! configuration.

use serde::Deserialize;

/// Represents the email signer provider.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EmailSigner {
    None,
    /// Represents an external signing command.
    Cmd(CmdSignerConfig),
}

impl Default for EmailSigner {
    fn default() -> Self {
        Self::None
    }
}

/// Represents the external signing command config.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CmdSignerConfig {
    /// Represents the command the serialized email is piped
    /// through, for example a DKIM signing filter. Its standard
    /// output is the signed email.
    pub cmd: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_cmd_signer() {
        let config: EmailSigner =
            serde_json::from_str(r#"{"type": "cmd", "cmd": "dkimsign --key key.pem"}"#).unwrap();
        assert_eq!(
            EmailSigner::Cmd(CmdSignerConfig {
                cmd: "dkimsign --key key.pem".into()
            }),
            config
        );
    }

    #[test]
    fn test_deserialize_none_signer() {
        let config: EmailSigner = serde_json::from_str(r#"{"type": "none"}"#).unwrap();
        assert_eq!(EmailSigner::None, config);
    }
}
