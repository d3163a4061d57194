//! Manifest serialization.
//!
//! The wire format is externally defined (§6): the core only needs to turn
//! a [`Manifest`] into bytes and back. [`JsonManifestCodec`] is the default,
//! concrete codec used unless a deployment supplies its own
//! [`ManifestCodec`] — the split mirrors how `param.rs` keeps the in-memory
//! `Params` map independent of whichever store format serializes it.

use crate::model::Manifest;

/// A pluggable manifest wire-format codec.
pub trait ManifestCodec {
    fn encode(&self, manifest: &Manifest) -> serde_json::Result<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> serde_json::Result<Manifest>;
}

/// Canonical JSON codec: stable field order from `#[derive(Serialize)]`,
/// no map types in [`Manifest`] so key ordering is not a concern.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonManifestCodec;

impl ManifestCodec for JsonManifestCodec {
    fn encode(&self, manifest: &Manifest) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(manifest)
    }

    fn decode(&self, bytes: &[u8]) -> serde_json::Result<Manifest> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ManifestPart;

    fn sample() -> Manifest {
        Manifest {
            version: "1.0.0".to_string(),
            from: "alice@lavaboom.com".to_string(),
            to: vec!["bob@lavaboom.com".to_string()],
            cc: vec![],
            subject: "Hi".to_string(),
            parts: vec![ManifestPart {
                id: "body".to_string(),
                content_type: "text/plain".to_string(),
                filename: None,
                size: 5,
                hash: "abc".to_string(),
                encoding: crate::model::File::ENCODING.to_string(),
            }],
        }
    }

    #[test]
    fn round_trips() {
        let codec = JsonManifestCodec;
        let m = sample();
        let bytes = codec.encode(&m).unwrap();
        let back = codec.decode(&bytes).unwrap();
        assert_eq!(m, back);
    }
}
