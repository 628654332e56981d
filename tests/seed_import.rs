mod common;

use std::io::Write;

use improvdb::import::parse_seed;
use improvdb::{fetch_resource, import_resources, load_seed_file, PublicationStatus};
use pretty_assertions::assert_eq;

use common::memory_db;

const SEED: &str = r#"[
  {
    "id": "zip-zap-proposal",
    "title": "Zip Zap Zop",
    "type": "EXERCISE",
    "configuration": "CIRCLE",
    "groupSize": 5,
    "description": "Same game, new name.",
    "editProposalOriginalResourceId": "zip-zap",
    "publicationStatus": "READY_FOR_REVIEW"
  },
  {
    "id": "zip-zap",
    "title": "Zip Zap",
    "type": "EXERCISE",
    "configuration": "CIRCLE",
    "groupSize": 5,
    "description": "Pass the energy.",
    "categories": [{ "id": "energy", "name": "Energy" }],
    "alternativeNames": "Zip Zap Zop;Zip Zop Zap",
    "relatedResources": [{ "value": "bippity-bop", "label": "Bippity Bop" }],
    "publicationStatus": "PUBLISHED"
  },
  {
    "id": "harold",
    "title": "Harold",
    "type": "LONG_FORM",
    "groupSize": 6,
    "description": "Three beats.",
    "alternativeNames": [{ "value": "The Harold" }],
    "relatedResources": [{ "id": "zip-zap", "title": "Zip Zap" }]
  },
  {
    "id": "harold",
    "title": "Harold Again",
    "type": "LONG_FORM",
    "groupSize": 6,
    "description": "Duplicate."
  },
  {
    "id": "bad-format",
    "title": "Bad Format",
    "type": "LONG_FORM",
    "configuration": "SCENE",
    "groupSize": 2,
    "description": "Formats have no configuration."
  }
]"#;

#[test]
fn imports_both_legacy_shapes_and_counts_problems() {
    let conn = memory_db();
    let resources = parse_seed(SEED).unwrap();
    let report = import_resources(&conn, &resources).unwrap();

    assert_eq!(report.inserted, 3);
    assert_eq!(report.duplicates, vec!["harold".to_string()]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0, "bad-format");
    assert_eq!(
        report.summary(),
        "Imported 3 resource(s); 1 duplicate(s) skipped; 1 rejected."
    );

    let zip = fetch_resource(&conn, "zip-zap").unwrap();
    assert_eq!(zip.publication_status, PublicationStatus::Published);
    assert_eq!(
        zip.alternative_names(),
        vec!["Zip Zap Zop".to_string(), "Zip Zop Zap".to_string()]
    );
    assert_eq!(zip.related_refs()[0].id, "bippity-bop");

    let harold = fetch_resource(&conn, "harold").unwrap();
    assert_eq!(harold.alternative_names(), vec!["The Harold".to_string()]);
    assert_eq!(harold.publication_status, PublicationStatus::Draft);

    let proposal = fetch_resource(&conn, "zip-zap-proposal").unwrap();
    assert_eq!(
        proposal.edit_proposal_original_resource_id.as_deref(),
        Some("zip-zap")
    );
}

#[test]
fn loads_seed_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SEED.as_bytes()).unwrap();

    let resources = load_seed_file(file.path()).unwrap();
    assert_eq!(resources.len(), 5);
}

#[test]
fn unknown_codes_fail_the_whole_file() {
    let err = parse_seed(r#"[{"id": "x", "title": "X", "type": "MUSICAL", "groupSize": 1}]"#)
        .unwrap_err();
    assert!(err.to_string().contains("MUSICAL"));
}
