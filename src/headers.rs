//! Header extraction helpers (§4.4, §4.8, §6).
//!
//! Address-list parsing is backed by `mailparse::addrparse`, the same
//! crate the teacher parses addresses with in `mimeparser.rs`
//! (`addrparse_header`). Encoded-word decoding is the "external MIME
//! header decoder" named out of scope by `spec.md` §1 — it is backed here
//! by the `rfc2047-decoder` crate seen in the retrieval pack's
//! `yanganto-himalaya-lib` dependency set.

use sha2::{Digest, Sha256};

use crate::error::{IngestError, Result};

/// Parse a raw header value (e.g. the text after `To:`) into an ordered
/// list of addr-specs, flattening any RFC 5322 groups.
pub fn parse_address_list(raw: &str) -> Result<Vec<String>> {
    let list = mailparse::addrparse(raw)?;
    let mut out = Vec::new();
    for addr in list.iter() {
        match addr {
            mailparse::MailAddr::Single(info) => out.push(info.addr.clone()),
            mailparse::MailAddr::Group(group) => {
                out.extend(group.addrs.iter().map(|info| info.addr.clone()))
            }
        }
    }
    Ok(out)
}

/// Decode a header value, treating it as an RFC 2047 encoded word if it
/// begins with `=?`, otherwise returning it literally (§4.4, §4.8).
pub fn decode_header_value(raw: &str) -> Result<String> {
    if raw.starts_with("=?") {
        rfc2047_decoder::decode(raw.as_bytes())
            .map_err(|err| IngestError::SubjectDecode(err.to_string()))
    } else {
        Ok(raw.to_string())
    }
}

/// Hex SHA-256 of the decoded subject text (§3 `subject_hash`).
pub fn subject_hash(decoded_subject: &str) -> String {
    let digest = Sha256::digest(decoded_subject.as_bytes());
    hex::encode(digest)
}

/// Hex SHA-256 of arbitrary plaintext bytes (§3 `Manifest Part.hash`).
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}
