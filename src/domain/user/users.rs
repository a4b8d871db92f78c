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

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::{fmt, ops};

use crate::User;

/// Represents the ordered list of identities of a multi-valued
/// address header.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Users(pub Vec<User>);

impl Users {
    /// Expands the raw values of a header into users. A header can
    /// appear more than once and each occurrence can hold several
    /// comma-separated addresses: source order is preserved and empty
    /// tokens are dropped.
    pub fn from_raw_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        trace!(">> build users from raw header values");

        let mut users = Users::default();
        for value in values {
            for token in value.as_ref().split(',') {
                if let Some(user) = User::from_raw(token.trim()) {
                    users.push(user);
                }
            }
        }

        debug!("users: {}", users);
        trace!("<< build users from raw header values");
        users
    }
}

impl fmt::Display for Users {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut glue = "";
        for user in self.iter() {
            write!(f, "{}{}", glue, user)?;
            glue = ", ";
        }
        Ok(())
    }
}

impl ops::Deref for Users {
    type Target = Vec<User>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Users {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<User>> for Users {
    fn from(users: Vec<User>) -> Self {
        Self(users)
    }
}

impl FromIterator<User> for Users {
    fn from_iter<T: IntoIterator<Item = User>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
