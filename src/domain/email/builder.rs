//! Builder module.
//!
//! This module turns an [`Email`] back into a MIME message: the
//! standard headers, one multipart/alternative part holding both the
//! text/plain and the text/html bodies, then one part per attachment.
//! The serialized message is signed before being returned, and any
//! failure aborts the whole build.

use lettre::{
    address::Envelope,
    message::{header, MultiPart, SinglePart},
};
use log::{debug, info, trace};

use crate::{
    email::{Error, Result},
    Attachment, Email, Signer,
};

/// Represents the request the build is performed for. Only used to
/// correlate logs.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct BuildContext {
    pub request_id: String,
}

impl BuildContext {
    pub fn new<I: ToString>(request_id: I) -> Self {
        Self {
            request_id: request_id.to_string(),
        }
    }
}

impl Email {
    /// Builds the signed MIME message of the email. The returned
    /// bytes are exactly the output of the signer.
    pub fn to_signed_bytes(&self, ctx: &BuildContext, signer: &dyn Signer) -> Result<Vec<u8>> {
        info!("[{}] begin: build signed email", ctx.request_id);

        let raw = self.to_sendable(ctx)?.formatted();
        let raw = String::from_utf8(raw).map_err(Error::ConvertSendableEmailError)?;
        trace!("[{}] unsigned email: {:?}", ctx.request_id, raw);

        let signed = signer.sign(&raw).map_err(Error::SignEmailError)?;

        info!("[{}] end: build signed email", ctx.request_id);
        Ok(signed)
    }

    pub(crate) fn to_sendable(&self, ctx: &BuildContext) -> Result<lettre::Message> {
        trace!("[{}] >> build sendable email", ctx.request_id);

        let from = self
            .from
            .as_ref()
            .ok_or(Error::BuildEmailMissingFromError)?
            .to_mailbox()?;

        let mut recipients = Vec::new();
        let mut builder = lettre::Message::builder()
            .date_now()
            .from(from.clone())
            .subject(self.subject.to_owned());

        for user in self.to.iter() {
            let mbox = user.to_mailbox()?;
            recipients.push(mbox.email.clone());
            builder = builder.to(mbox);
        }

        for user in self.cc.iter() {
            let mbox = user.to_mailbox()?;
            recipients.push(mbox.email.clone());
            builder = builder.cc(mbox);
        }

        // bcc recipients only reach the envelope
        for user in self.bcc.iter() {
            recipients.push(user.to_mailbox()?.email);
        }

        if recipients.is_empty() {
            debug!("[{}] no recipient, using sender as envelope recipient", ctx.request_id);
            recipients.push(from.email.clone());
        }

        let envelope =
            Envelope::new(Some(from.email), recipients).map_err(Error::BuildSendableEmailError)?;
        builder = builder.envelope(envelope);

        // both bodies are always present so that clients get the same
        // structure whatever the caller filled
        let alternative = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_PLAIN)
                    .header(header::ContentTransferEncoding::Base64)
                    .body(self.text.to_owned()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_HTML)
                    .header(header::ContentTransferEncoding::Base64)
                    .body(self.html.to_owned()),
            );

        let mut multipart = MultiPart::mixed().multipart(alternative);
        for attachment in self.attachments.iter() {
            multipart = multipart.singlepart(attachment_part(ctx, attachment)?);
        }

        let msg = builder
            .multipart(multipart)
            .map_err(Error::BuildSendableEmailError)?;

        trace!("[{}] << build sendable email", ctx.request_id);
        Ok(msg)
    }
}

fn attachment_part(ctx: &BuildContext, attachment: &Attachment) -> Result<SinglePart> {
    let content_type = if attachment.content_type.trim().is_empty() {
        let mime = tree_magic::from_u8(&attachment.content);
        debug!(
            "[{}] sniffed content type of attachment {}: {}",
            ctx.request_id, attachment.filename, mime
        );
        mime
    } else {
        attachment.content_type.to_owned()
    };

    let content_type = header::ContentType::parse(&content_type).map_err(|err| {
        Error::ParseAttachmentContentTypeError(err, attachment.filename.to_owned())
    })?;

    let part = if attachment.content_id.is_empty() {
        SinglePart::builder()
            .header(header::ContentDisposition::attachment(&attachment.filename))
            .header(content_type)
    } else {
        SinglePart::builder()
            .header(header::ContentDisposition::inline_with_name(
                &attachment.filename,
            ))
            .header(content_type)
            .header(header::ContentId::from(format!(
                "<{}>",
                attachment.content_id
            )))
    };
    let part = part.header(header::ContentTransferEncoding::Base64);

    Ok(part.body(attachment.content.to_owned()))
}
