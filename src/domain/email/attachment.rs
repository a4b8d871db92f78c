use serde::{Deserialize, Serialize};
use std::{ops, result};
use thiserror::Error;

/// Represents the file name given to attachments that carry none.
pub const DEFAULT_ATTACHMENT_FILENAME: &str = "no_name_file";

#[derive(Debug, Error)]
pub enum AttachmentsError {
    #[error("cannot serialize attachments to json")]
    SerializeJsonError(#[source] serde_json::Error),
    #[error("cannot deserialize attachments from json")]
    DeserializeJsonError(#[source] serde_json::Error),
}

/// Represents an email attachment, inline parts referenced by
/// `cid:` included.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    #[serde(with = "super::b64")]
    pub content: Vec<u8>,
    /// Represents the content id, without angle brackets. Empty when
    /// the part has no `Content-Id` header.
    #[serde(rename = "ContentID")]
    pub content_id: String,
}

/// Represents the attachments of an email, in document order.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attachments(pub Vec<Attachment>);

impl Attachments {
    /// Encodes the attachments the way they are stored alongside an
    /// email row: a JSON array of attachment records.
    pub fn to_json(&self) -> result::Result<String, AttachmentsError> {
        serde_json::to_string(self).map_err(AttachmentsError::SerializeJsonError)
    }

    pub fn from_json(json: &str) -> result::Result<Self, AttachmentsError> {
        serde_json::from_str(json).map_err(AttachmentsError::DeserializeJsonError)
    }

    pub fn find_by_content_id(&self, content_id: &str) -> Option<&Attachment> {
        self.iter()
            .find(|attachment| !content_id.is_empty() && attachment.content_id == content_id)
    }
}

impl ops::Deref for Attachments {
    type Target = Vec<Attachment>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Attachments {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Attachment>> for Attachments {
    fn from(attachments: Vec<Attachment>) -> Self {
        Self(attachments)
    }
}

impl FromIterator<Attachment> for Attachments {
    fn from_iter<T: IntoIterator<Item = Attachment>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
