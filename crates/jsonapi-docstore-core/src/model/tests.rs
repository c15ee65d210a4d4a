use super::*;

#[test]
fn resource_type_classifies_fields() {
    let books = ResourceType::new("books")
        .with_attribute("name")
        .with_to_one("author", "people")
        .with_to_many("tags", "tags");

    assert!(books.restricted_backend);
    assert!(books.is_attribute("name"));
    assert!(books.is_relationship("author"));
    assert!(books.is_relationship("tags"));
    assert!(!books.is_attribute("author"));
    assert!(!books.is_attribute("missing"));
    assert_eq!(books.attributes().count(), 1);
    assert_eq!(books.relationships().count(), 2);
}

#[test]
fn unrestricted_type_keeps_flag_off() {
    let people = ResourceType::unrestricted("people").with_attribute("name");

    assert!(!people.restricted_backend);
}

#[test]
fn graph_rejects_duplicate_type() {
    let err = ResourceGraph::new()
        .with(ResourceType::new("books"))
        .and_then(|graph| graph.with(ResourceType::new("books")))
        .expect_err("second registration should fail");

    assert_eq!(err, ResourceGraphError::AlreadyRegistered("books".into()));
}

#[test]
fn graph_rejects_duplicate_field() {
    let err = ResourceGraph::new()
        .with(
            ResourceType::new("books")
                .with_attribute("name")
                .with_to_one("name", "people"),
        )
        .expect_err("duplicate field should fail");

    assert_eq!(
        err,
        ResourceGraphError::DuplicateField("books".into(), "name".into())
    );
}

#[test]
fn graph_rejects_reserved_id_field() {
    let err = ResourceGraph::new()
        .with(ResourceType::new("books").with_attribute("id"))
        .expect_err("id attribute should be rejected");

    assert_eq!(err, ResourceGraphError::ReservedField("books".into()));
}

#[test]
fn graph_lookup_by_name() {
    let graph = ResourceGraph::new()
        .with(ResourceType::new("books"))
        .and_then(|g| g.with(ResourceType::unrestricted("people")))
        .expect("graph should build");

    assert_eq!(graph.len(), 2);
    assert!(graph.get("books").is_some_and(|t| t.restricted_backend));
    assert!(graph.get("people").is_some_and(|t| !t.restricted_backend));
    assert!(graph.get("tags").is_none());
}
