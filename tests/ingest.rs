//! Integration tests against the testable properties and concrete
//! scenarios in `spec.md` §8, exercised through the public `ingest` entry
//! point with in-memory `Store`/`Publisher` fakes.

use std::io::Cursor;

use pretty_assertions::assert_eq;

use lavamail_ingest::events::LocalBus;
use lavamail_ingest::manifest::JsonManifestCodec;
use lavamail_ingest::model::{Account, Key, Kind};
use lavamail_ingest::test_support::{generate_test_keypair, InMemoryStore};
use lavamail_ingest::{ingest, Envelope, IngestConfig, IngestError};

fn init() {
    let _ = env_logger::try_init();
}

fn setup_account(store: &InMemoryStore, name: &str) -> (String, String) {
    let account_id = format!("acct-{name}");
    let (secret_armored, public_armored) = generate_test_keypair(&format!("{name} <{name}@lavaboom.com>"));
    store.seed_account(Account {
        id: account_id.clone(),
        name: name.to_string(),
        public_key_ref: None,
    });
    store.seed_key(Key {
        id: format!("key-{name}"),
        owner: account_id.clone(),
        armored_key_material: public_armored,
    });
    store.seed_inbox(&account_id);
    (account_id, secret_armored)
}

fn decrypts_to(armored_ciphertext: &[u8], secret_armored: &str, expected: &[u8]) -> bool {
    use pgp::composed::{Deserializable, Message, SignedSecretKey};

    let (secret_key, _) =
        SignedSecretKey::from_armor_single(Cursor::new(secret_armored.as_bytes())).unwrap();
    let (message, _) = Message::from_armor_single(Cursor::new(armored_ciphertext)).unwrap();
    let (decrypted, _) = message.decrypt(String::new, &[&secret_key]).unwrap();
    let content = decrypted.get_content().unwrap().unwrap_or_default();
    content == expected
}

#[tokio::test]
async fn scenario_plaintext_single_recipient() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, _rx) = LocalBus::new();
    let codec = JsonManifestCodec;
    let (alice_id, alice_secret) = setup_account(&store, "alice");

    let envelope = Envelope {
        recipients: vec!["alice@lavaboom.com".to_string()],
        data: b"From: sender@example.com\r\nTo: alice@lavaboom.com\r\nSubject: Hi\r\nContent-Type: text/plain\r\n\r\nhello"
            .to_vec(),
    };

    let ids = ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap();
    assert_eq!(ids.len(), 1);

    let emails = store.emails();
    assert_eq!(emails.len(), 1);
    let email = &emails[0];
    assert_eq!(email.owner, alice_id);
    assert_eq!(email.kind, Kind::Manifest);
    assert_eq!(email.name, "Hi");
    assert!(email.manifest.is_some());
    assert!(store.files().is_empty());

    let threads = store.threads();
    assert_eq!(threads.len(), 1);
    assert_eq!(
        threads[0].subject_hash,
        lavamail_ingest::headers::subject_hash("Hi")
    );
    assert_eq!(threads[0].emails, vec![email.id.clone()]);

    assert!(decrypts_to(&email.body, &alice_secret, b"hello"));
}

#[tokio::test]
async fn scenario_attachment_two_recipients() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, _rx) = LocalBus::new();
    let codec = JsonManifestCodec;
    setup_account(&store, "alice");
    setup_account(&store, "bob");

    let raw = b"From: sender@example.com\r\nTo: alice@lavaboom.com, bob@lavaboom.com\r\nSubject: Hi\r\nContent-Type: multipart/mixed; boundary=X\r\n\r\n--X\r\nContent-Type: text/plain\r\n\r\nhi\r\n--X\r\nContent-Type: application/pdf\r\nContent-Disposition: attachment; filename=\"spec.pdf\"\r\n\r\nBINARYBYTES\r\n--X--\r\n";
    let envelope = Envelope {
        recipients: vec!["alice@lavaboom.com".to_string(), "bob@lavaboom.com".to_string()],
        data: raw.to_vec(),
    };

    let ids = ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap();
    assert_eq!(ids.len(), 2);

    let emails = store.emails();
    assert_eq!(emails.len(), 2);

    let files = store.files();
    assert_eq!(files.len(), 2);
    let names: std::collections::HashSet<_> = files.iter().map(|f| f.name.clone()).collect();
    assert_eq!(names.len(), 1, "both recipients' files share the same part id name");
    assert!(names.iter().next().unwrap().ends_with(".pgp"));

    let manifest = emails[0].manifest.as_ref().unwrap();
    assert!(!manifest.is_empty());
}

#[tokio::test]
async fn scenario_already_pgpmime() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, _rx) = LocalBus::new();
    let codec = JsonManifestCodec;
    setup_account(&store, "alice");

    let raw = b"To: alice@lavaboom.com\r\nContent-Type: multipart/encrypted; boundary=X\r\n\r\n--X\r\nContent-Type: application/pgp-encrypted\r\nSubject: Encrypted\r\n\r\nARMOREDBLOB\r\n--X--\r\n";
    let envelope = Envelope {
        recipients: vec!["alice@lavaboom.com".to_string()],
        data: raw.to_vec(),
    };

    ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap();
    let emails = store.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].kind, Kind::Pgpmime);
    assert_eq!(emails[0].name, "Encrypted");
    assert!(emails[0].manifest.is_none());
    assert_eq!(emails[0].body, b"ARMOREDBLOB");
}

#[tokio::test]
async fn scenario_already_manifest_wrapped() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, _rx) = LocalBus::new();
    let codec = JsonManifestCodec;
    setup_account(&store, "alice");

    let raw = b"To: alice@lavaboom.com\r\nContent-Type: multipart/mixed; boundary=X\r\n\r\n--X\r\nContent-Type: application/x-pgp-manifest\r\n\r\nMANIFESTBYTES\r\n--X\r\nContent-Type: multipart/alternative; boundary=Y\r\n\r\n--Y\r\nContent-Type: application/pgp-encrypted\r\n\r\nBODYBYTES\r\n--Y--\r\n--X\r\nContent-Type: application/pdf\r\nContent-Disposition: attachment; filename=\"a.pdf\"\r\n\r\nATTACHBYTES\r\n--X--\r\n";
    let envelope = Envelope {
        recipients: vec!["alice@lavaboom.com".to_string()],
        data: raw.to_vec(),
    };

    ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap();
    let emails = store.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].kind, Kind::Manifest);
    assert_eq!(emails[0].name, "Encrypted email");
    assert_eq!(emails[0].body, b"BODYBYTES");
    assert_eq!(emails[0].manifest.as_ref().unwrap(), b"MANIFESTBYTES");

    let files = store.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "a.pdf");
    assert_eq!(files[0].data, b"ATTACHBYTES");
}

#[tokio::test]
async fn scenario_unknown_recipient_writes_and_publishes_nothing() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, rx) = LocalBus::new();
    let codec = JsonManifestCodec;

    let envelope = Envelope {
        recipients: vec!["nobody@lavaboom.com".to_string()],
        data: b"Content-Type: text/plain\r\nSubject: Hi\r\n\r\nhi".to_vec(),
    };

    let err = ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap_err();
    assert!(matches!(err, IngestError::UnknownRecipient(_)));
    assert!(store.is_empty());
    drop(rx); // nothing was ever published
}

#[tokio::test]
async fn scenario_thread_reuse_on_redelivery() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, _rx) = LocalBus::new();
    let codec = JsonManifestCodec;
    setup_account(&store, "alice");

    let raw = b"From: sender@example.com\r\nTo: alice@lavaboom.com\r\nSubject: Hi\r\nContent-Type: text/plain\r\n\r\nhello".to_vec();
    let envelope = Envelope {
        recipients: vec!["alice@lavaboom.com".to_string()],
        data: raw,
    };

    let first_ids = ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap();
    assert_eq!(store.threads().len(), 1);

    // Redeliver the identical message.
    let second_ids = ingest(&cfg, &store, &bus, &codec, &envelope_clone(&envelope))
        .await
        .unwrap();
    let threads = store.threads();
    assert_eq!(threads.len(), 1, "second delivery reuses the thread");
    assert_eq!(store.emails().len(), 2);
    assert_eq!(threads[0].emails, vec![first_ids[0].clone(), second_ids[0].clone()]);
}

fn envelope_clone(e: &Envelope) -> Envelope {
    Envelope {
        recipients: e.recipients.clone(),
        data: e.data.clone(),
    }
}

#[tokio::test]
async fn boundary_mixed_local_and_non_local_recipients() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, _rx) = LocalBus::new();
    let codec = JsonManifestCodec;
    setup_account(&store, "alice");

    let envelope = Envelope {
        recipients: vec![
            "alice@lavaboom.com".to_string(),
            "someone@gmail.com".to_string(),
        ],
        data: b"Content-Type: text/plain\r\nSubject: Hi\r\n\r\nhello".to_vec(),
    };

    let ids = ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(store.emails().len(), 1);
}

#[tokio::test]
async fn boundary_only_non_local_recipients_is_rejected() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, _rx) = LocalBus::new();
    let codec = JsonManifestCodec;

    let envelope = Envelope {
        recipients: vec!["someone@gmail.com".to_string()],
        data: b"Content-Type: text/plain\r\nSubject: Hi\r\n\r\nhello".to_vec(),
    };

    let err = ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap_err();
    assert!(matches!(err, IngestError::NoLocalDomain));
    assert!(store.is_empty());
}

#[tokio::test]
async fn boundary_self_address_is_stripped_from_stored_recipients() {
    init();
    let cfg = IngestConfig::default();
    let store = InMemoryStore::new();
    let (bus, _rx) = LocalBus::new();
    let codec = JsonManifestCodec;
    setup_account(&store, "alice");
    setup_account(&store, "bob");

    let raw = b"From: sender@example.com\r\nTo: alice@lavaboom.com, bob@lavaboom.com\r\nSubject: Hi\r\nContent-Type: text/plain\r\n\r\nhello".to_vec();
    let envelope = Envelope {
        recipients: vec!["alice@lavaboom.com".to_string(), "bob@lavaboom.com".to_string()],
        data: raw,
    };

    ingest(&cfg, &store, &bus, &codec, &envelope).await.unwrap();
    for email in store.emails() {
        let self_addr = format!("{}@lavaboom.com", email.owner.trim_start_matches("acct-"));
        assert!(!email.to.contains(&self_addr));
    }
}
