//! Parts module.
//!
//! This module contains the depth-first traversal of a parsed MIME
//! tree and the classification of each visited part.

use log::{debug, trace};
use mailparse::ParsedMail;

/// Represents what a MIME part contributes to an email.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PartKind {
    /// Transparent container: its children are visited, the
    /// container itself produces nothing.
    Container,
    /// Like [`PartKind::Container`], for `multipart/related` trees
    /// grouping a body with the inline resources it references.
    Related,
    TextPlain,
    TextHtml,
    Attachment,
}

/// Classification of the known content types. Anything missing is an
/// attachment.
pub const PART_KINDS: [(&str, PartKind); 5] = [
    ("multipart/alternative", PartKind::Container),
    ("multipart/mixed", PartKind::Container),
    ("multipart/related", PartKind::Related),
    ("text/plain", PartKind::TextPlain),
    ("text/html", PartKind::TextHtml),
];

impl PartKind {
    pub fn from_mimetype(mimetype: &str) -> Self {
        let mimetype = mimetype.trim().to_lowercase();

        PART_KINDS
            .iter()
            .find(|(known, _)| *known == mimetype)
            .map(|(_, kind)| *kind)
            .unwrap_or(PartKind::Attachment)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, PartKind::Container | PartKind::Related)
    }
}

/// Iterates over a MIME tree in document order: each part comes
/// before its children, children come in source order. Only container
/// parts are descended into.
#[derive(Debug)]
pub struct PartsIterator<'a> {
    stack: Vec<&'a ParsedMail<'a>>,
}

impl<'a> PartsIterator<'a> {
    pub fn new(part: &'a ParsedMail<'a>) -> Self {
        Self { stack: vec![part] }
    }
}

impl<'a> Iterator for PartsIterator<'a> {
    type Item = &'a ParsedMail<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;

        if PartKind::from_mimetype(&part.ctype.mimetype).is_container() {
            for subpart in part.subparts.iter().rev() {
                self.stack.push(subpart)
            }
        }

        Some(part)
    }
}

/// Walks the MIME tree depth-first and hands every non-container part
/// to the visitor, together with its classification and its index in
/// document order.
pub fn walk<'a, F>(part: &'a ParsedMail<'a>, mut visit: F)
where
    F: FnMut(usize, PartKind, &'a ParsedMail<'a>),
{
    trace!(">> walk mime tree");

    for (index, part) in PartsIterator::new(part).enumerate() {
        let kind = PartKind::from_mimetype(&part.ctype.mimetype);
        debug!("part #{}: {} ({:?})", index, part.ctype.mimetype, kind);

        if !kind.is_container() {
            visit(index, kind, part);
        }
    }

    trace!("<< walk mime tree");
}


#[cfg(test)]
mod test_parts_iterator {
    use lettre::{
        message::{MultiPart, SinglePart},
        Message,
    };

    use super::{walk, PartKind, PartsIterator};

    #[test]
    fn test_one_part_no_subpart() {
        let email = Message::builder()
            .from("from@localhost".parse().unwrap())
            .to("to@localhost".parse().unwrap())
            .singlepart(SinglePart::plain(String::new()))
            .unwrap()
            .formatted();
        let email = mailparse::parse_mail(&email).unwrap();

        let parts = PartsIterator::new(&email).collect::<Vec<_>>();

        assert_eq!(1, parts.len());
        assert_eq!("text/plain", parts[0].ctype.mimetype);
    }

    #[test]
    fn test_depth_first_order() {
        let email = Message::builder()
            .from("from@localhost".parse().unwrap())
            .to("to@localhost".parse().unwrap())
            .multipart(
                MultiPart::mixed()
                    .multipart(
                        MultiPart::alternative()
                            .singlepart(SinglePart::plain(String::from("plain")))
                            .singlepart(SinglePart::html(String::from("<p>html</p>"))),
                    )
                    .singlepart(SinglePart::plain(String::from("last"))),
            )
            .unwrap()
            .formatted();
        let email = mailparse::parse_mail(&email).unwrap();

        let mimetypes = PartsIterator::new(&email)
            .map(|part| part.ctype.mimetype.as_str())
            .collect::<Vec<_>>();

        assert_eq!(
            vec![
                "multipart/mixed",
                "multipart/alternative",
                "text/plain",
                "text/html",
                "text/plain",
            ],
            mimetypes
        );

        let mut visited = vec![];
        walk(&email, |index, kind, _| visited.push((index, kind)));
        assert_eq!(
            vec![
                (2, PartKind::TextPlain),
                (3, PartKind::TextHtml),
                (4, PartKind::TextPlain),
            ],
            visited
        );
    }

    #[test]
    fn test_unknown_multipart_is_not_descended() {
        let email = mailparse::parse_mail(concat!(
            "Content-Type: multipart/mixed; boundary=mixed\r\n",
            "\r\n",
            "--mixed\r\n",
            "Content-Type: multipart/signed; boundary=signed\r\n",
            "\r\n",
            "--signed\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "signed text\r\n",
            "--signed--\r\n",
            "--mixed--\r\n",
        )
        .as_bytes())
        .unwrap();

        let mimetypes = PartsIterator::new(&email)
            .map(|part| part.ctype.mimetype.as_str())
            .collect::<Vec<_>>();
        assert_eq!(vec!["multipart/mixed", "multipart/signed"], mimetypes);

        let mut visited = vec![];
        walk(&email, |index, kind, _| visited.push((index, kind)));
        assert_eq!(vec![(1, PartKind::Attachment)], visited);
    }
}
