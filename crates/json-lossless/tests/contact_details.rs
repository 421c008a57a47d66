mod common;

use common::*;
use json_lossless::{
    decode, encode, verify, CatchAll, Codec, CodecOptions, Derived, FieldOrder, MutableCodec,
    Synthesizer,
};
use json_lossless::{LosslessError, ValueBag};
use serde_json::{json, Value};

#[test]
fn unknown_fields_are_lost_by_default() {
    let document = contact_details_document();
    let contact: ContactDetails = serde_json::from_value(document.clone()).unwrap();
    let encoded = serde_json::to_value(&contact).unwrap();
    assert_eq!(keys(&encoded), vec!["homePhone", "email"]);
    assert_ne!(encoded, document);
}

#[test]
fn mutable_record_keeps_unknown_fields() {
    let document = contact_details_document();
    let contact: MutableLosslessContactDetails = decode(&document).unwrap();
    assert_eq!(contact.home_phone, "01234 567890");
    assert_eq!(contact.email, "a@b.com");
    assert_eq!(contact.other.len(), 2);
    assert_eq!(
        contact.other.get("address"),
        Some(&json!({"line1": "1 Toad Road", "city": "London", "postcode": "E1 1TD"}))
    );

    let encoded = encode(&contact).unwrap();
    assert_eq!(encoded, document);
    assert_eq!(keys(&encoded), vec!["homePhone", "email", "mobilePhone", "address"]);
}

#[test]
fn mutable_record_in_document_order() {
    let document = contact_details_document();
    let codec = MutableCodec::<MutableLosslessContactDetails>::with_options(
        CodecOptions::default().with_field_order(FieldOrder::Document),
    );
    let contact = codec.decode(&document).unwrap();
    let encoded = codec.encode(&contact).unwrap();
    assert_eq!(keys(&encoded), vec!["homePhone", "mobilePhone", "email", "address"]);
}

#[test]
fn mutable_record_edits_survive_alongside_unknown_fields() {
    let mut contact: MutableLosslessContactDetails = decode(&contact_details_document()).unwrap();
    contact.email = "c@d.com".into();
    contact.set("preferred", json!("mobile")).unwrap();
    contact.remove("address");

    let encoded = encode(&contact).unwrap();
    assert_eq!(
        encoded,
        json!({
            "homePhone": "01234 567890",
            "email": "c@d.com",
            "mobilePhone": "07123 123456",
            "preferred": "mobile"
        })
    );
}

#[test]
fn immutable_record_keeps_unknown_fields_through_synthesis() {
    let document = contact_details_document();
    let synthesized = Synthesizer::global()
        .synthesize::<ImmutableContactDetails>()
        .unwrap();
    assert_eq!(
        synthesized.synthesized_type().name(),
        "LosslessImmutableContactDetails"
    );

    let contact = synthesized.decode(&document).unwrap();
    assert_eq!(contact.home_phone(), "01234 567890");
    assert_eq!(contact.email(), "a@b.com");
    assert_eq!(
        contact.any().entries().map(|(k, _)| k).collect::<Vec<_>>(),
        vec!["mobilePhone", "address"]
    );

    let encoded = synthesized.encode(&contact).unwrap();
    assert_eq!(encoded, document);
    assert!(verify(&synthesized, &document).unwrap().is_lossless());
}

#[test]
fn derived_record_works_with_plain_serde_json() {
    let contact: Derived<ImmutableContactDetails> = serde_json::from_str(CONTACT_DETAILS).unwrap();
    assert_eq!(contact.base(), &ImmutableContactDetails::new("01234 567890", "a@b.com"));
    let text = serde_json::to_string(&contact).unwrap();
    let reparsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed, contact_details_document());
}

#[test]
fn derived_record_rejects_badly_typed_known_field() {
    let result = serde_json::from_str::<Derived<ImmutableContactDetails>>(
        r#"{"homePhone": 1234, "email": "a@b.com"}"#,
    );
    let err = result.unwrap_err().to_string();
    assert!(err.contains("homePhone"), "{err}");
}

#[test]
fn no_unknown_fields_encodes_like_the_plain_record() {
    let document = json!({"homePhone": "01234 567890", "email": "a@b.com"});
    let plain = serde_json::to_value(
        serde_json::from_value::<ContactDetails>(document.clone()).unwrap(),
    )
    .unwrap();

    let mutable: MutableLosslessContactDetails = decode(&document).unwrap();
    assert!(mutable.other.is_empty());
    let mutable = encode(&mutable).unwrap();
    assert_eq!(keys(&mutable), keys(&plain));
    assert_eq!(mutable, plain);

    let synthesized = Synthesizer::global()
        .synthesize::<ImmutableContactDetails>()
        .unwrap();
    let immutable = synthesized
        .encode(&synthesized.decode(&document).unwrap())
        .unwrap();
    assert_eq!(keys(&immutable), keys(&plain));
    assert_eq!(immutable, plain);
}

#[test]
fn verifier_flags_plain_decoding() {
    let document = contact_details_document();
    let lossy: ContactDetails = serde_json::from_value(document.clone()).unwrap();
    let encoded = serde_json::to_value(lossy).unwrap();
    let diff = json_lossless_util::diff(&document, &encoded);
    let mut paths: Vec<_> = diff.iter().map(|d| d.path.join("/")).collect();
    paths.sort();
    assert_eq!(paths, vec!["address", "mobilePhone"]);
}

#[test]
fn mutable_record_built_without_decoding_refuses_known_names() {
    let mut contact = MutableLosslessContactDetails {
        home_phone: "01234 567890".into(),
        email: "a@b.com".into(),
        other: ValueBag::new(),
    };
    assert!(matches!(
        contact.set("email", json!("c@d.com")),
        Err(LosslessError::DuplicateKnownField { field, .. }) if field == "email"
    ));
    contact.set("mobilePhone", json!("07123 123456")).unwrap();
    assert_eq!(
        encode(&contact).unwrap(),
        json!({"homePhone": "01234 567890", "email": "a@b.com", "mobilePhone": "07123 123456"})
    );

    let mut contact: MutableLosslessContactDetails =
        serde_json::from_value(contact_details_document()).unwrap();
    assert!(contact.other.is_empty());
    assert!(matches!(
        contact.set("homePhone", json!("1")),
        Err(LosslessError::DuplicateKnownField { field, .. }) if field == "homePhone"
    ));
}

#[test]
fn derived_record_serializes_with_its_codec_options() {
    let document = contact_details_document();
    let synthesized = Synthesizer::global()
        .synthesize::<ImmutableContactDetails>()
        .unwrap()
        .with_options(CodecOptions::default().with_field_order(FieldOrder::Document));

    let contact = synthesized.decode(&document).unwrap();
    let through_serde = serde_json::to_value(&contact).unwrap();
    assert_eq!(keys(&through_serde), vec!["homePhone", "mobilePhone", "email", "address"]);
    assert_eq!(through_serde, synthesized.encode(&contact).unwrap());

    let mut fresh = synthesized
        .new_instance(vec![json!("1"), json!("e")])
        .unwrap();
    fresh.set("fax", json!("2")).unwrap();
    assert_eq!(keys(&serde_json::to_value(&fresh).unwrap()), vec!["homePhone", "email", "fax"]);

    let plain: Derived<ImmutableContactDetails> = serde_json::from_str(CONTACT_DETAILS).unwrap();
    assert_eq!(
        keys(&serde_json::to_value(&plain).unwrap()),
        vec!["homePhone", "email", "mobilePhone", "address"]
    );
}
