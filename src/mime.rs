//! MIME Parser facade (C3, external).
//!
//! The actual parsing is an external collaborator's job (`spec.md` §1); in
//! this crate that collaborator is the `mailparse` crate, the same one the
//! teacher depends on and builds its own `mimeparser::MimeMessage`/`Part`
//! tree on top of (`mimeparser.rs`). [`MimePart`] is the thin,
//! classifier/transform-facing tree this core works against, kept
//! independent of `mailparse`'s own types the same way the teacher keeps
//! `MimeMessage` independent of `mailparse::ParsedMail`.

use mailparse::MailHeaderMap;

use crate::error::Result;

/// Content-Disposition, reduced to what the core cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment { filename: Option<String> },
    None,
}

/// One node of a parsed MIME tree.
#[derive(Debug, Clone)]
pub struct MimePart {
    /// Full `Content-Type` value, e.g. `"multipart/mixed; boundary=..."`.
    pub content_type: String,
    /// Lower-cased `type/subtype`, with parameters stripped.
    pub media_type: String,
    pub disposition: Disposition,
    headers: Vec<(String, String)>,
    pub children: Vec<MimePart>,
    /// Decoded (content-transfer-encoding removed) body bytes.
    pub body: Vec<u8>,
}

impl MimePart {
    /// First value of header `name`, case-insensitive, as the raw
    /// (possibly encoded-word) header text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn disposition_from(parsed: &mailparse::ParsedMail) -> Disposition {
    let cd = parsed.get_content_disposition();
    match cd.disposition {
        mailparse::DispositionType::Attachment => Disposition::Attachment {
            filename: cd.params.get("filename").cloned(),
        },
        mailparse::DispositionType::Inline => Disposition::Inline,
        _ => Disposition::None,
    }
}

fn build(parsed: &mailparse::ParsedMail) -> Result<MimePart> {
    let content_type = parsed
        .headers
        .get_first_value("Content-Type")
        .unwrap_or_else(|| "text/plain".to_string());
    let media_type = parsed.ctype.mimetype.to_ascii_lowercase();
    let disposition = disposition_from(parsed);
    let headers = parsed
        .headers
        .iter()
        .map(|h| (h.get_key(), h.get_value()))
        .collect();
    let body = if parsed.subparts.is_empty() {
        parsed.get_body_raw()?
    } else {
        Vec::new()
    };
    let mut children = Vec::with_capacity(parsed.subparts.len());
    for child in &parsed.subparts {
        children.push(build(child)?);
    }
    Ok(MimePart {
        content_type,
        media_type,
        disposition,
        headers,
        children,
        body,
    })
}

/// Parse raw RFC 5322 message bytes into a [`MimePart`] tree.
pub fn parse(raw: &[u8]) -> Result<MimePart> {
    let parsed = mailparse::parse_mail(raw)?;
    build(&parsed)
}
