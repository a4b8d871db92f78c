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

//! Issue module.
//!
//! Parsing an email never fails: problems met along the way are
//! collected as issues next to the best-effort email, and callers
//! decide what to do with them.

use mailparse::MailParseError;
use thiserror::Error;

use crate::Email;

/// Represents how much an issue degrades the parsed email.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    /// A part or a header could not be read, the rest of the email
    /// is complete.
    Warning,
    /// The email could not be parsed at all.
    Error,
}

#[derive(Debug, Error)]
pub enum Issue {
    #[error("cannot parse email from raw data")]
    ParseRawEmailError(#[source] MailParseError),
    #[error("cannot read body of {1} part #{2}")]
    ReadPartBodyError(#[source] MailParseError, String, usize),
    #[error("cannot read attachment {1} (part #{2})")]
    ReadAttachmentError(#[source] MailParseError, String, usize),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::ParseRawEmailError(_) => Severity::Error,
            Self::ReadPartBodyError(..) | Self::ReadAttachmentError(..) => Severity::Warning,
        }
    }
}

/// Represents the outcome of parsing a raw email.
#[derive(Debug, Default)]
pub struct ParsedEmail {
    pub email: Email,
    pub issues: Vec<Issue>,
}

impl ParsedEmail {
    /// Returns `true` when the email was parsed without any issue.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.max_severity() == Some(Severity::Error)
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.issues.iter().map(Issue::severity).max()
    }

    pub fn into_email(self) -> Email {
        self.email
    }
}

impl From<ParsedEmail> for Email {
    fn from(parsed: ParsedEmail) -> Self {
        parsed.email
    }
}
