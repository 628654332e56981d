mod common;

use improvdb::models::{LessonPlanRef, RelatedResource, ResourceRef};
use improvdb::{
    apply_edit_proposal, create_resource, delete_resources, fetch_categories, fetch_resource,
    fetch_resources, set_publication_status, AlternativeNames, CatalogError, PublicationStatus,
    ResourceType,
};
use pretty_assertions::assert_eq;

use common::{memory_db, resource};

fn catalog_error(err: &anyhow::Error) -> Option<&CatalogError> {
    err.downcast_ref::<CatalogError>()
}

#[test]
fn created_resource_reads_back_with_links() {
    let conn = memory_db();
    let mut zip = resource("zip-zap", "Zip Zap", &["focus", "energy"]);
    zip.alternative_names = Some(AlternativeNames::LegacyDelimited(
        "Zip Zap Zop; Zip Zop Zap;".into(),
    ));
    zip.related_resources = vec![RelatedResource::Linked(ResourceRef {
        id: "bippity-bop".into(),
        title: "Bippity Bop".into(),
    })];
    zip.lesson_plans = vec![LessonPlanRef {
        id: "week-1".into(),
        title: "Week 1".into(),
    }];
    create_resource(&conn, &zip).unwrap();

    let stored = fetch_resource(&conn, "zip-zap").unwrap();
    assert_eq!(stored.title, "Zip Zap");
    assert_eq!(
        stored.category_ids().collect::<Vec<_>>(),
        vec!["focus", "energy"]
    );
    assert_eq!(
        stored.alternative_names(),
        vec!["Zip Zap Zop".to_string(), "Zip Zop Zap".to_string()]
    );
    assert_eq!(stored.related_refs()[0].title, "Bippity Bop");
    assert_eq!(stored.lesson_plans[0].title, "Week 1");
    assert_eq!(fetch_categories(&conn).unwrap().len(), 2);
}

#[test]
fn duplicate_identifier_is_distinct_from_validation() {
    let conn = memory_db();
    create_resource(&conn, &resource("zip-zap", "Zip Zap", &[])).unwrap();

    let err = create_resource(&conn, &resource("zip-zap", "Zip Zap Again", &[])).unwrap_err();
    assert_eq!(
        catalog_error(&err),
        Some(&CatalogError::DuplicateIdentifier("zip-zap".into()))
    );

    let mut invalid = resource("bad", "Bad", &[]);
    invalid.kind = ResourceType::LongForm;
    let err = create_resource(&conn, &invalid).unwrap_err();
    assert!(matches!(
        catalog_error(&err),
        Some(CatalogError::ValidationFailed(_))
    ));
    assert_eq!(fetch_resources(&conn).unwrap().len(), 1);
}

#[test]
fn missing_resource_is_not_found() {
    let conn = memory_db();
    let err = fetch_resource(&conn, "nope").unwrap_err();
    assert_eq!(
        catalog_error(&err),
        Some(&CatalogError::NotFound("nope".into()))
    );
}

#[test]
fn resources_are_listed_by_title() {
    let conn = memory_db();
    for (id, title) in [("yes-and", "yes And"), ("bus-stop", "Bus Stop"), ("zip-zap", "Zip Zap")] {
        create_resource(&conn, &resource(id, title, &[])).unwrap();
    }
    let ids: Vec<String> = fetch_resources(&conn)
        .unwrap()
        .into_iter()
        .map(|resource| resource.id)
        .collect();
    assert_eq!(ids, vec!["bus-stop", "yes-and", "zip-zap"]);
}

#[test]
fn bulk_status_change_only_touches_given_ids() {
    let conn = memory_db();
    for id in ["one", "two", "three"] {
        create_resource(&conn, &resource(id, id, &[])).unwrap();
    }

    let updated = set_publication_status(
        &conn,
        &["one".to_string(), "three".to_string(), "missing".to_string()],
        PublicationStatus::Published,
    )
    .unwrap();
    assert_eq!(updated, 2);

    let statuses: Vec<(String, PublicationStatus)> = fetch_resources(&conn)
        .unwrap()
        .into_iter()
        .map(|resource| (resource.id, resource.publication_status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("one".to_string(), PublicationStatus::Published),
            ("three".to_string(), PublicationStatus::Published),
            ("two".to_string(), PublicationStatus::Draft),
        ]
    );
}

#[test]
fn deleting_an_original_removes_its_proposals() {
    let conn = memory_db();
    create_resource(&conn, &resource("zip-zap", "Zip Zap", &["focus"])).unwrap();
    let mut proposal = resource("zip-zap-proposal", "Zip Zap Zop", &["focus"]);
    proposal.edit_proposal_original_resource_id = Some("zip-zap".into());
    proposal.publication_status = PublicationStatus::ReadyForReview;
    create_resource(&conn, &proposal).unwrap();

    assert_eq!(delete_resources(&conn, &["zip-zap".to_string()]).unwrap(), 1);
    assert!(fetch_resources(&conn).unwrap().is_empty());
}

#[test]
fn applying_a_proposal_updates_the_original() {
    let conn = memory_db();
    let mut original = resource("zip-zap", "Zip Zap", &["focus"]);
    original.publication_status = PublicationStatus::Published;
    create_resource(&conn, &original).unwrap();

    let mut proposal = resource("zip-zap-proposal", "Zip Zap Zop", &["energy"]);
    proposal.edit_proposal_original_resource_id = Some("zip-zap".into());
    proposal.publication_status = PublicationStatus::ReadyForReview;
    proposal.video = Some("dQw4w9WgXcQ".into());
    create_resource(&conn, &proposal).unwrap();

    let merged = apply_edit_proposal(&conn, "zip-zap-proposal").unwrap();
    assert_eq!(merged.id, "zip-zap");
    assert_eq!(merged.title, "Zip Zap Zop");
    assert_eq!(merged.publication_status, PublicationStatus::Published);
    assert_eq!(merged.category_ids().collect::<Vec<_>>(), vec!["energy"]);
    assert_eq!(
        merged.video_url().as_deref(),
        Some("https://youtube.com/watch?v=dQw4w9WgXcQ")
    );
    assert_eq!(fetch_resources(&conn).unwrap().len(), 1);

    let err = apply_edit_proposal(&conn, "zip-zap").unwrap_err();
    assert!(err.to_string().contains("not an edit proposal"));
}

#[test]
fn proposal_for_unknown_resource_is_rejected() {
    let conn = memory_db();
    let mut proposal = resource("ghost-proposal", "Ghost", &[]);
    proposal.edit_proposal_original_resource_id = Some("ghost".into());

    let err = create_resource(&conn, &proposal).unwrap_err();
    assert!(catalog_error(&err).is_none());
}

#[test]
fn unknown_stored_code_surfaces_as_unmapped_value() {
    let conn = memory_db();
    conn.execute(
        "INSERT INTO resources (id, title, type, group_size, publication_status)
         VALUES ('odd', 'Odd', 'EXERCISE', 2, 'ARCHIVED')",
        [],
    )
    .unwrap();

    let err = fetch_resources(&conn).unwrap_err();
    assert_eq!(
        catalog_error(&err),
        Some(&CatalogError::UnmappedEnumValue {
            kind: "publication status",
            value: "ARCHIVED".into(),
        })
    );
}
