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

use lettre::message::Mailbox;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::email;

/// Represents a single mail identity. The address is always stored
/// without surrounding quotes or angle brackets.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub email_address: String,
    /// Represents the display name, empty for bare addresses.
    pub name: String,
}

impl User {
    pub fn new<A: ToString, N: ToString>(email_address: A, name: N) -> Self {
        Self {
            email_address: email_address.to_string(),
            name: name.to_string(),
        }
    }

    /// Parses one raw address token, already isolated from its
    /// siblings. Returns `None` for an empty token.
    ///
    /// The last whitespace-separated word is the address, everything
    /// before it is the display name. Encoded words (RFC 2047) in the
    /// display name are decoded; when decoding fails the raw name is
    /// kept.
    pub fn from_raw(raw: &str) -> Option<Self> {
        trace!(">> parse user from {:?}", raw);

        let words: Vec<&str> = raw.split_whitespace().collect();

        let user = match words.as_slice() {
            [] => None,
            [addr] => Some(Self::new(strip_brackets(addr), "")),
            [name @ .., addr] => {
                let addr = strip_brackets(addr);
                let name = name.join(" ");
                let name = name.trim_matches('"');

                let name = match rfc2047_decoder::decode(name.replace('"', "").as_bytes()) {
                    Ok(decoded) => decoded,
                    Err(err) => {
                        warn!("cannot decode display name {:?}, keeping it raw", name);
                        warn!("{}", err);
                        name.to_owned()
                    }
                };

                Some(Self::new(addr, name))
            }
        };

        trace!("<< parse user: {:?}", user);
        user
    }

    pub fn to_mailbox(&self) -> email::Result<Mailbox> {
        let addr = self
            .email_address
            .parse()
            .map_err(|err| email::Error::ParseAddressError(err, self.email_address.clone()))?;
        let name = if self.name.is_empty() {
            None
        } else {
            Some(self.name.clone())
        };
        Ok(Mailbox::new(name, addr))
    }
}

fn strip_brackets(addr: &str) -> &str {
    let addr = addr.strip_prefix('<').unwrap_or(addr);
    addr.strip_suffix('>').unwrap_or(addr)
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.email_address)
        } else {
            write!(f, "\"{}\" <{}>", self.name, self.email_address)
        }
    }
}
