use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use log::{debug, trace, warn};
use mailparse::{body::Body, MailHeader, MailHeaderMap, MailParseError, ParsedMail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, result, string};
use thiserror::Error;

use crate::{
    signer, walk, Attachment, Attachments, Issue, ParsedEmail, PartKind, User, Users,
    DEFAULT_ATTACHMENT_FILENAME,
};

/// Represents the format of [`Email::date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Represents the RFC 1123 date format with a numeric zone expected
/// in the `Date` header.
pub const RFC1123Z_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

lazy_static! {
    static ref FILENAME_REGEX: Regex = Regex::new(r#"filename="?([^";]*)"?"#).unwrap();
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build email: from address is missing")]
    BuildEmailMissingFromError,
    #[error("cannot parse address {1}")]
    ParseAddressError(#[source] lettre::address::AddressError, String),
    #[error("cannot parse content type of attachment {1}")]
    ParseAttachmentContentTypeError(#[source] lettre::message::header::ContentTypeErr, String),
    #[error("cannot build sendable email")]
    BuildSendableEmailError(#[source] lettre::error::Error),
    #[error("cannot convert sendable email to text")]
    ConvertSendableEmailError(#[source] string::FromUtf8Error),
    #[error("cannot sign email")]
    SignEmailError(#[source] signer::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Representation of an email.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Email {
    pub reply_to: Users,
    pub from: Option<User>,
    pub to: Users,
    pub bcc: Users,
    pub cc: Users,
    pub subject: String,
    /// Represents the last text/plain body found in the email.
    #[serde(with = "super::b64")]
    pub text: Vec<u8>,
    /// Represents the last text/html body found in the email.
    #[serde(rename = "HTML", with = "super::b64")]
    pub html: Vec<u8>,
    /// Represents the sender, same as `from` when the email has no
    /// `Sender` header.
    pub sender: Option<User>,
    /// Represents all top-level headers: lowercase name to decoded
    /// values, in source order.
    pub headers: HashMap<String, Vec<String>>,
    pub attachments: Attachments,
    pub read_receipt: Vec<String>,
    /// Represents the date, formatted with [`DATE_FORMAT`].
    pub date: String,
}

impl Email {
    /// Parses an email from raw RFC 5322 bytes. The parsing never
    /// fails: what cannot be read is reported in
    /// [`ParsedEmail::issues`] and the rest of the email is still
    /// built.
    pub fn from_raw(raw: &[u8]) -> ParsedEmail {
        trace!(">> parse email from raw data");

        let parsed = match mailparse::parse_mail(raw) {
            Ok(parsed_mail) => Self::from_parsed_mail(&parsed_mail),
            Err(err) => {
                warn!("cannot parse email from raw data: {}", err);
                ParsedEmail {
                    email: Email {
                        date: parse_date(None),
                        ..Email::default()
                    },
                    issues: vec![Issue::ParseRawEmailError(err)],
                }
            }
        };

        trace!("<< parse email from raw data");
        parsed
    }

    pub fn from_parsed_mail(parsed_mail: &ParsedMail<'_>) -> ParsedEmail {
        trace!(">> build email from parsed mail");

        let mut email = Email::default();
        let mut issues = Vec::new();
        let headers = &parsed_mail.headers;

        for header in headers.iter() {
            let key = header.get_key().to_lowercase();
            let val = header.get_value();
            debug!("header {}: {:?}", key, val);
            email.headers.entry(key).or_default().push(val);
        }

        email.from = headers
            .get_all_headers("From")
            .first()
            .and_then(|header| User::from_raw(raw_value(header).trim()));
        email.to = Users::from_raw_values(raw_values(headers, "To"));
        email.cc = Users::from_raw_values(raw_values(headers, "Cc"));
        email.bcc = Users::from_raw_values(raw_values(headers, "Bcc"));
        email.reply_to = Users::from_raw_values(
            raw_values(headers, "Reply-To")
                .into_iter()
                .chain(raw_values(headers, "ReplyTo")),
        );
        email.sender = headers
            .get_all_headers("Sender")
            .first()
            .and_then(|header| User::from_raw(raw_value(header).trim()))
            .or_else(|| email.from.clone());
        email.read_receipt =
            Users::from_raw_values(raw_values(headers, "Disposition-Notification-To"))
                .0
                .into_iter()
                .map(|user| user.email_address)
                .collect();
        email.subject = headers.get_first_value("Subject").unwrap_or_default();
        email.date = parse_date(headers.get_first_value("Date"));

        walk(parsed_mail, |index, kind, part| match kind {
            PartKind::TextPlain => match text_body(parsed_mail, part) {
                Ok(body) => email.text = body,
                Err(err) => {
                    warn!("cannot read text/plain part #{}: {}", index, err);
                    issues.push(Issue::ReadPartBodyError(err, "text/plain".into(), index));
                }
            },
            PartKind::TextHtml => match text_body(parsed_mail, part) {
                Ok(body) => email.html = body,
                Err(err) => {
                    warn!("cannot read text/html part #{}: {}", index, err);
                    issues.push(Issue::ReadPartBodyError(err, "text/html".into(), index));
                }
            },
            PartKind::Attachment => {
                let filename = attachment_filename(part);
                match attachment_body(parsed_mail, part) {
                    Ok(content) => email.attachments.push(Attachment {
                        filename,
                        content_type: part.ctype.mimetype.clone(),
                        content,
                        content_id: content_id(part),
                    }),
                    Err(err) => {
                        warn!("cannot read attachment {} (part #{}): {}", filename, index, err);
                        issues.push(Issue::ReadAttachmentError(err, filename, index));
                    }
                }
            }
            PartKind::Container | PartKind::Related => (),
        });

        trace!("email: {:?}", email);
        trace!("<< build email from parsed mail");
        ParsedEmail { email, issues }
    }

    pub fn text_str(&self) -> String {
        String::from_utf8_lossy(&self.text).into_owned()
    }

    pub fn html_str(&self) -> String {
        String::from_utf8_lossy(&self.html).into_owned()
    }
}

/// Reads a text part body. UTF-8 and US-ASCII bodies are kept as they
/// are, other charsets are converted to UTF-8.
fn text_body(
    root: &ParsedMail<'_>,
    part: &ParsedMail<'_>,
) -> result::Result<Vec<u8>, MailParseError> {
    let mut body = match part.ctype.charset.to_lowercase().as_str() {
        "utf-8" | "utf8" | "us-ascii" => part.get_body_raw()?,
        _ => part.get_body()?.into_bytes(),
    };
    if !std::ptr::eq(root, part) {
        strip_delimiter_line_break(part, &mut body);
    }
    Ok(body)
}

fn attachment_body(
    root: &ParsedMail<'_>,
    part: &ParsedMail<'_>,
) -> result::Result<Vec<u8>, MailParseError> {
    let mut body = part.get_body_raw()?;
    if !std::ptr::eq(root, part) {
        strip_delimiter_line_break(part, &mut body);
    }
    Ok(body)
}

/// Removes the line break that precedes the next boundary delimiter of
/// a multipart child. Base64 bodies and quoted-printable bodies ending
/// with a soft line break never carry it once decoded.
fn strip_delimiter_line_break(part: &ParsedMail<'_>, body: &mut Vec<u8>) {
    let carries_line_break = match part.get_body_encoded() {
        Body::Base64(_) => false,
        Body::QuotedPrintable(encoded) => {
            let raw = encoded.get_raw();
            !raw.ends_with(b"=\r\n") && !raw.ends_with(b"=\n")
        }
        _ => true,
    };

    if !carries_line_break {
        return;
    }

    if body.ends_with(b"\r\n") {
        body.truncate(body.len() - 2);
    } else if body.ends_with(b"\n") {
        body.truncate(body.len() - 1);
    }
}

fn raw_value(header: &MailHeader<'_>) -> String {
    String::from_utf8_lossy(header.get_value_raw()).into_owned()
}

fn raw_values(headers: &[MailHeader<'_>], key: &str) -> Vec<String> {
    headers
        .get_all_headers(key)
        .into_iter()
        .map(raw_value)
        .collect()
}

/// Parses the `Date` header value, falling back to the current time
/// when it is missing or does not follow [`RFC1123Z_FORMAT`].
fn parse_date(date: Option<String>) -> String {
    let date = date.as_deref().map(str::trim).and_then(|date| {
        match DateTime::parse_from_str(date, RFC1123Z_FORMAT) {
            Ok(date) => Some(date),
            Err(err) => {
                warn!("cannot parse email date {:?}, using current time", date);
                warn!("{}", err);
                None
            }
        }
    });

    match date {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => Local::now().format(DATE_FORMAT).to_string(),
    }
}

/// Finds the file name of an attachment part: the content type `name`
/// parameter first, then the `filename` of the content disposition.
fn attachment_filename(part: &ParsedMail<'_>) -> String {
    if let Some(name) = part.ctype.params.get("name").filter(|name| !name.is_empty()) {
        return name.to_owned();
    }

    let from_disposition = part
        .headers
        .get_first_value("Content-Disposition")
        .and_then(|disposition| {
            let filename = FILENAME_REGEX
                .captures(&disposition)?
                .get(1)?
                .as_str()
                .trim()
                .to_owned();
            Some(filename)
        })
        .filter(|filename| !filename.is_empty());

    // covers RFC 2231 `filename*=` parameters
    from_disposition
        .or_else(|| {
            part.get_content_disposition()
                .params
                .get("filename")
                .filter(|filename| !filename.is_empty())
                .cloned()
        })
        .unwrap_or_else(|| DEFAULT_ATTACHMENT_FILENAME.to_owned())
}

fn content_id(part: &ParsedMail<'_>) -> String {
    part.headers
        .get_first_value("Content-Id")
        .map(|id| {
            let id = id.trim();
            let id = id.strip_prefix('<').unwrap_or(id);
            id.strip_suffix('>').unwrap_or(id).to_owned()
        })
        .unwrap_or_default()
}
