//! JSON:API document helpers.
//!
//! Thin adapters between raw JSON:API payloads and the core vocabulary:
//! resource objects in, resource objects and error documents out.

use crate::core::{
    Error, ID_FIELD,
    db::{
        Page,
        document::{Document, DocumentId},
        fields::{SparseFieldSetCache, TargetedFields},
    },
    model::ResourceType,
    value::Value,
};
use serde_json::{Map, Value as JsonValue, json};

/// Parse a JSON:API resource object (the `data` member of a create or update
/// request) into a document plus the fields the request targets.
///
/// Every attribute key present is targeted, `null` values included; every
/// relationship key present is targeted as a relationship.
pub fn parse_resource(
    resource: &ResourceType,
    data: &JsonValue,
) -> Result<(Document, TargetedFields), Error> {
    let object = data
        .as_object()
        .ok_or_else(|| Error::invalid_input("resource object must be a JSON object"))?;

    match object.get("type").and_then(JsonValue::as_str) {
        Some(kind) if kind == resource.name => {}
        Some(kind) => {
            return Err(Error::invalid_input(format!(
                "resource object type '{kind}' does not match '{}'",
                resource.name
            )));
        }
        None => return Err(Error::invalid_input("resource object is missing 'type'")),
    }

    let mut document = Document::new();
    let mut targeted = TargetedFields::new();

    match object.get(ID_FIELD) {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::String(id)) => document.id = Some(DocumentId::new(id.as_str())),
        Some(_) => return Err(Error::invalid_input("resource object 'id' must be a string")),
    }

    for (name, value) in members(object, "attributes")? {
        document.set(name.as_str(), Value::from(value.clone()));
        targeted.attributes.insert(name.clone());
    }
    for (name, _) in members(object, "relationships")? {
        targeted.relationships.insert(name.clone());
    }

    Ok((document, targeted))
}

/// Render one document as a JSON:API resource object, emitting only the
/// attributes the serializer is allowed to show.
#[must_use]
pub fn render_resource(
    resource: &ResourceType,
    document: &Document,
    fields: &SparseFieldSetCache<'_>,
) -> JsonValue {
    let selected = fields.fields_for_serializer(&resource.name);
    let attributes: Map<String, JsonValue> = document
        .attributes
        .iter()
        .filter(|(name, _)| selected.contains(name.as_str()))
        .map(|(name, value)| (name.clone(), JsonValue::from(value.clone())))
        .collect();

    json!({
        "type": resource.name,
        "id": document.id.as_ref().map(DocumentId::as_str),
        "attributes": attributes,
    })
}

/// Render a `find_all` page as a top-level JSON:API document.
///
/// `base` is the collection URL the pagination links are built from.
#[must_use]
pub fn render_page(
    resource: &ResourceType,
    page: &Page,
    fields: &SparseFieldSetCache<'_>,
    base: &str,
) -> JsonValue {
    let data: Vec<JsonValue> = page
        .documents
        .iter()
        .map(|document| render_resource(resource, document, fields))
        .collect();

    let link = |number: Option<u32>| {
        number.map(|number| match page.size {
            Some(size) => format!("{base}?page[number]={number}&page[size]={size}"),
            None => base.to_string(),
        })
    };

    let mut document = json!({
        "data": data,
        "links": {
            "first": link(Some(page.links.first)),
            "prev": link(page.links.prev),
            "next": link(page.links.next),
            "last": link(page.links.last),
        },
    });
    if let Some(total) = page.total_count {
        document["meta"] = json!({ "total": total });
    }

    document
}

/// Render an error as a JSON:API error document.
#[must_use]
pub fn error_document(err: &Error) -> JsonValue {
    let object = err.to_error_object();

    json!({
        "errors": [{
            "status": object.status.to_string(),
            "code": object.code,
            "title": object.title,
            "detail": object.detail,
        }]
    })
}

fn members<'a>(
    object: &'a Map<String, JsonValue>,
    key: &str,
) -> Result<impl Iterator<Item = (&'a String, &'a JsonValue)>, Error> {
    let map = match object.get(key) {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Object(map)) => Some(map),
        Some(_) => {
            return Err(Error::invalid_input(format!(
                "resource object '{key}' must be a JSON object"
            )));
        }
    };

    Ok(map.into_iter().flat_map(Map::iter))
}

///
/// TESTS
///
