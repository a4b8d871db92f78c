use std::{sync::Arc, thread};

use mailcodec_lib::{
    signer, Attachment, BuildContext, Email, Signer, User, Users, DEFAULT_ATTACHMENT_FILENAME,
};

fn unsigned(email: &str) -> signer::Result<Vec<u8>> {
    Ok(email.as_bytes().to_vec())
}

fn email() -> Email {
    Email {
        from: Some(User::new("alice@localhost", "Alice")),
        to: Users(vec![User::new("bob@localhost", "Bob")]),
        cc: Users(vec![User::new("carol@localhost", "")]),
        subject: "Monthly report".into(),
        text: b"Please find the report attached.\n\nAlice\n".to_vec(),
        html: b"<p>Please find the report <b>attached</b>.</p>".to_vec(),
        attachments: vec![Attachment {
            filename: "report.pdf".into(),
            content_type: "application/pdf".into(),
            content: b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\ntrailer\n".to_vec(),
            content_id: String::new(),
        }]
        .into(),
        ..Email::default()
    }
}

#[test]
fn test_build_then_parse() {
    let _ = env_logger::builder().is_test(true).try_init();

    let email = email();
    let raw = email
        .to_signed_bytes(&BuildContext::new("round-trip"), &unsigned)
        .unwrap();

    let parsed = Email::from_raw(&raw);
    assert!(parsed.is_clean(), "unexpected issues: {:?}", parsed.issues);
    let parsed = parsed.into_email();

    assert_eq!(email.from, parsed.from);
    assert_eq!(email.from, parsed.sender);
    assert_eq!(email.to, parsed.to);
    assert_eq!(email.cc, parsed.cc);
    assert_eq!(email.subject, parsed.subject);
    assert_eq!(email.text, parsed.text);
    assert_eq!(email.html, parsed.html);
    assert_eq!(email.attachments, parsed.attachments);
}

#[test]
fn test_rebuild_parsed_email() {
    let parsed = Email::from_raw(
        concat!(
            "From: <alice@localhost>\r\n",
            "To: <bob@localhost>, Carol <carol@localhost>\r\n",
            "Subject: Re: report\r\n",
            "\r\n",
            "Thanks!\r\n",
        )
        .as_bytes(),
    )
    .into_email();
    assert_eq!(Some(User::new("alice@localhost", "")), parsed.from);

    let raw = parsed
        .to_signed_bytes(&BuildContext::new("rebuild"), &unsigned)
        .unwrap();
    let rebuilt = Email::from_raw(&raw).into_email();

    assert_eq!(parsed.from, rebuilt.from);
    assert_eq!(parsed.to, rebuilt.to);
    assert_eq!(parsed.text, rebuilt.text);
}

#[test]
fn test_build_empty_bodies() {
    let email = Email {
        text: vec![],
        html: vec![],
        attachments: Default::default(),
        ..email()
    };

    let raw = email
        .to_signed_bytes(&BuildContext::default(), &unsigned)
        .unwrap();
    let raw = String::from_utf8(raw).unwrap();

    assert_eq!(1, raw.matches("Content-Type: text/plain").count());
    assert_eq!(1, raw.matches("Content-Type: text/html").count());

    let parsed = Email::from_raw(raw.as_bytes()).into_email();
    assert!(parsed.text.is_empty());
    assert!(parsed.html.is_empty());
    assert!(parsed.attachments.is_empty());
}

#[test]
fn test_build_sniffs_missing_content_type() {
    let email = Email {
        attachments: vec![Attachment {
            filename: DEFAULT_ATTACHMENT_FILENAME.into(),
            content_type: String::new(),
            content: b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\ntrailer\n".to_vec(),
            content_id: String::new(),
        }]
        .into(),
        ..email()
    };

    let raw = email
        .to_signed_bytes(&BuildContext::default(), &unsigned)
        .unwrap();
    let parsed = Email::from_raw(&raw).into_email();

    assert_eq!(1, parsed.attachments.len());
    assert!(!parsed.attachments[0].content_type.is_empty());
    assert_eq!(email.attachments[0].content, parsed.attachments[0].content);
}

#[test]
fn test_concurrent_builds_share_signer() {
    let signer: Arc<dyn Signer> = Arc::new(|email: &str| -> signer::Result<Vec<u8>> {
        Ok(format!("X-Signed: yes\r\n{}", email).into_bytes())
    });

    let handles = (0..4)
        .map(|i| {
            let signer = signer.clone();
            thread::spawn(move || {
                let email = Email {
                    subject: format!("Report #{}", i),
                    ..email()
                };
                let raw = email
                    .to_signed_bytes(&BuildContext::new(i), signer.as_ref())
                    .unwrap();
                Email::from_raw(&raw).into_email()
            })
        })
        .collect::<Vec<_>>();

    for (i, handle) in handles.into_iter().enumerate() {
        let parsed = handle.join().unwrap();
        assert_eq!(format!("Report #{}", i), parsed.subject);
        assert_eq!(Some(&vec![String::from("yes")]), parsed.headers.get("x-signed"));
    }
}
