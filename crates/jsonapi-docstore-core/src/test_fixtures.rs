//! Shared resource fixtures for unit tests.

use crate::{
    db::document::Document,
    model::{ResourceGraph, ResourceType},
};

/// `books`: stored in the document backend, with attribute and relationship fields.
pub(crate) fn book_type() -> ResourceType {
    ResourceType::new("books")
        .with_attribute("name")
        .with_attribute("author")
        .with_attribute("category")
        .with_attribute("price")
        .with_to_one("publisher", "publishers")
        .with_to_many("tags", "tags")
}

/// `people`: stored elsewhere, so its relationships survive output filtering.
pub(crate) fn person_type() -> ResourceType {
    ResourceType::unrestricted("people")
        .with_attribute("name")
        .with_to_many("books", "books")
}

pub(crate) fn graph() -> ResourceGraph {
    let mut graph = ResourceGraph::new();
    for resource in [
        book_type(),
        person_type(),
        ResourceType::new("tags").with_attribute("name"),
        ResourceType::new("publishers").with_attribute("name"),
    ] {
        graph
            .register(resource)
            .expect("fixture resource types should register");
    }

    graph
}

pub(crate) fn philosophy_book() -> Document {
    Document::new()
        .with("name", "Basic Philosophy")
        .with("author", "X")
        .with("category", "Philosophy")
        .with("price", 2.0)
}

pub(crate) fn science_book() -> Document {
    Document::new()
        .with("name", "Advanced Physics")
        .with("author", "Y")
        .with("category", "Science")
        .with("price", 15.5)
}
