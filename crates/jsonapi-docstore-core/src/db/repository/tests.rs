use super::*;
use crate::{
    db::{
        query::{CompareOp, FilterExpr, Operand, SortExpr},
        store::MemoryCollection,
    },
    test_fixtures::{graph, philosophy_book, science_book},
};
use parking_lot::Mutex;
use std::time::Duration;

type BookRepository = Repository<MemoryCollection>;

#[derive(Default)]
struct RecordingSink {
    rejected: Mutex<Vec<String>>,
    finished: Mutex<Vec<(ExecKind, u64)>>,
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::Rejected { rejection, .. } => {
                self.rejected.lock().push(rejection.reason_code().to_string());
            }
            MetricsEvent::ExecFinish {
                kind, rows_touched, ..
            } => self.finished.lock().push((kind, rows_touched)),
            MetricsEvent::ExecStart { .. } => {}
        }
    }
}

fn repository(collection: MemoryCollection) -> BookRepository {
    Repository::new(Arc::new(collection), Arc::new(graph()), "books")
        .expect("books should be registered")
}

fn all_attributes() -> TargetedFields {
    TargetedFields::attributes(["name", "author", "category", "price"])
}

fn none() -> CancelSignal {
    CancelSignal::none()
}

async fn create(repo: &BookRepository, document: Document) -> DocumentId {
    repo.create(document, &all_attributes(), &none())
        .await
        .expect("create should succeed")
        .id
        .expect("created document should carry an id")
}

async fn seeded() -> (BookRepository, DocumentId, DocumentId) {
    let repo = repository(MemoryCollection::new());
    let first = create(&repo, philosophy_book().with_id("01-philosophy")).await;
    let second = create(&repo, science_book().with_id("02-science")).await;

    (repo, first, second)
}

//
// construction
//

#[test]
fn unknown_resource_type_cannot_be_bound() {
    let result = Repository::new(
        Arc::new(MemoryCollection::new()),
        Arc::new(graph()),
        "ghosts",
    );

    let err = result.err().expect("unknown type should fail");
    assert_eq!(err.class, ErrorClass::InvalidQuery);
}

//
// create / find_one
//

#[tokio::test]
async fn create_generates_id_and_round_trips() {
    let repo = repository(MemoryCollection::new());

    let created = repo
        .create(philosophy_book(), &all_attributes(), &none())
        .await
        .expect("create should succeed");
    let id = created.id.clone().expect("generated id");
    let found = repo.find_one(&id, &none()).await.expect("find_one");

    assert_eq!(found, created);
    assert_eq!(found.get("category"), Some(&Value::from("Philosophy")));
}

#[tokio::test]
async fn create_stores_only_targeted_attributes() {
    let repo = repository(MemoryCollection::new());
    let targeted = TargetedFields::attributes(["name"]);

    let created = repo
        .create(philosophy_book(), &targeted, &none())
        .await
        .expect("create should succeed");

    assert_eq!(created.attributes.len(), 1);
    assert!(created.get("price").is_none());
}

#[tokio::test]
async fn create_with_existing_id_conflicts() {
    let (repo, first, _) = seeded().await;

    let err = repo
        .create(science_book().with_id(first.clone()), &all_attributes(), &none())
        .await
        .expect_err("duplicate id should conflict");

    assert_eq!(err.class, ErrorClass::Conflict);
    assert_eq!(err.to_error_object().status, 409);
}

#[tokio::test]
async fn create_with_relationship_is_unsupported() {
    let repo = repository(MemoryCollection::new());
    let targeted = all_attributes().with_relationship("publisher");

    let err = repo
        .create(philosophy_book(), &targeted, &none())
        .await
        .expect_err("relationship write should fail");

    assert_eq!(err.class, ErrorClass::UnsupportedOperation);
    assert!(repo.collection().is_empty().await);
}

#[tokio::test]
async fn create_with_unknown_attribute_is_invalid_input() {
    let repo = repository(MemoryCollection::new());
    let targeted = TargetedFields::attributes(["isbn"]);

    let err = repo
        .create(philosophy_book().with("isbn", "123"), &targeted, &none())
        .await
        .expect_err("unknown attribute should fail");

    assert_eq!(err.class, ErrorClass::InvalidInput);
    assert_eq!(err.to_error_object().status, 422);
}

#[tokio::test]
async fn find_one_missing_is_not_found() {
    let repo = repository(MemoryCollection::new());

    let err = repo
        .find_one(&DocumentId::from("nope"), &none())
        .await
        .expect_err("missing document");

    assert!(err.is_not_found());
}

//
// update
//

#[tokio::test]
async fn partial_update_leaves_untargeted_attributes() {
    let (repo, id, _) = seeded().await;
    let patch = Document::new()
        .with("price", 3.0)
        .with("category", "Overwritten");
    let targeted = TargetedFields::attributes(["price"]);

    repo.update(&id, patch, &targeted, &none())
        .await
        .expect("update should succeed");

    let stored = repo.find_one(&id, &none()).await.expect("find_one");
    assert_eq!(stored.get("price"), Some(&Value::Float(3.0)));
    assert_eq!(stored.get("category"), Some(&Value::from("Philosophy")));
    assert_eq!(stored.get("name"), Some(&Value::from("Basic Philosophy")));
}

#[tokio::test]
async fn update_missing_document_is_not_found() {
    let repo = repository(MemoryCollection::new());

    let err = repo
        .update(
            &DocumentId::from("nope"),
            Document::new().with("price", 1),
            &TargetedFields::attributes(["price"]),
            &none(),
        )
        .await
        .expect_err("missing document");

    assert_eq!(err.class, ErrorClass::NotFound);
}

#[tokio::test]
async fn update_rejects_id_and_relationship_targets() {
    let (repo, id, _) = seeded().await;

    let id_err = repo
        .update(
            &id,
            Document::new().with("id", "other"),
            &TargetedFields::attributes(["id"]),
            &none(),
        )
        .await
        .expect_err("id is not targetable");
    let rel_err = repo
        .update(
            &id,
            Document::new(),
            &TargetedFields::new().with_relationship("tags"),
            &none(),
        )
        .await
        .expect_err("relationships are not writable");

    assert_eq!(id_err.class, ErrorClass::InvalidInput);
    assert_eq!(rel_err.class, ErrorClass::UnsupportedOperation);
}

//
// delete
//

#[tokio::test]
async fn delete_then_find_is_not_found() {
    let (repo, id, _) = seeded().await;

    repo.delete(&id, &none()).await.expect("delete should succeed");

    let err = repo.find_one(&id, &none()).await.expect_err("deleted");
    assert!(err.is_not_found());
    let err = repo.delete(&id, &none()).await.expect_err("already deleted");
    assert!(err.is_not_found());
}

//
// find_all
//

#[tokio::test]
async fn second_page_of_size_one() {
    let (repo, _, second) = seeded().await;
    let plan = QueryPlan::new("books").page(2, 1);

    let page = repo.find_all(&plan, &none()).await.expect("find_all");

    assert_eq!(page.len(), 1);
    assert_eq!(page.documents[0].id, Some(second));
    assert_eq!(page.total_count, Some(2));
    assert_eq!(
        page.links,
        PageLinks {
            first: 1,
            prev: Some(1),
            next: None,
            last: Some(2),
        }
    );
}

#[tokio::test]
async fn zero_page_size_is_refused_before_storage() {
    let (repo, _, _) = seeded().await;
    repo.collection().set_unavailable(true);

    let err = repo
        .find_all(&QueryPlan::new("books").page(1, 0), &none())
        .await
        .expect_err("zero page size");

    assert_eq!(err.class, ErrorClass::InvalidQuery);
    assert_eq!(err.to_error_object().status, 400);
}

#[tokio::test]
async fn zero_default_page_size_returns_everything_on_one_page() {
    let (repo, _, _) = seeded().await;
    let repo = repo.with_config(RepositoryConfig::new().with_default_page_size(Some(0)));

    let page = repo
        .find_all(&QueryPlan::new("books"), &none())
        .await
        .expect("find_all");

    assert_eq!(page.len(), 2);
    assert_eq!(page.size, None);
    assert_eq!(page.total_count, Some(2));
    assert_eq!(page.links.next, None);
    assert_eq!(page.links.last, Some(1));
}

#[tokio::test]
async fn filter_sort_and_projection_are_pushed_down() {
    let (repo, first, second) = seeded().await;
    let plan = QueryPlan::new("books")
        .filter(FilterExpr::compare(
            CompareOp::LessThan,
            Operand::literal(1),
            Operand::field("price"),
        ))
        .sort(SortExpr::desc("price"))
        .fields("books", ["name"]);

    let page = repo.find_all(&plan, &none()).await.expect("find_all");

    let ids: Vec<_> = page.documents.iter().filter_map(|d| d.id.clone()).collect();
    assert_eq!(ids, vec![second, first]);
    assert!(page.documents.iter().all(|d| d.attributes.len() == 1));
    assert_eq!(page.total_count, Some(2));
}

#[tokio::test]
async fn filtered_total_counts_matches_only() {
    let (repo, _, _) = seeded().await;
    let plan = QueryPlan::new("books").filter(FilterExpr::equals("category", "Science"));

    let page = repo.find_all(&plan, &none()).await.expect("find_all");

    assert_eq!(page.len(), 1);
    assert_eq!(page.total_count, Some(1));
    assert_eq!(repo.count(&plan, &none()).await.expect("count"), 1);
}

#[tokio::test]
async fn page_size_is_clamped_and_total_can_be_skipped() {
    let repo = repository(MemoryCollection::new()).with_config(
        RepositoryConfig::new()
            .with_max_page_size(1)
            .with_total_count(false),
    );
    create(&repo, philosophy_book()).await;
    create(&repo, science_book()).await;

    let page = repo
        .find_all(&QueryPlan::new("books").page(1, 50), &none())
        .await
        .expect("find_all");

    assert_eq!(page.len(), 1);
    assert_eq!(page.size, Some(1));
    assert_eq!(page.total_count, None);
    assert_eq!(page.links.next, Some(2));
}

#[tokio::test]
async fn capability_rejections_fail_before_io() {
    let collection = MemoryCollection::new();
    collection.set_unavailable(true);
    let sink = Arc::new(RecordingSink::default());
    let repo = repository(collection).with_metrics_sink(sink.clone());

    let include = repo
        .find_all(&QueryPlan::new("books").include("publisher"), &none())
        .await
        .expect_err("inclusion is unsupported");
    let traversal = repo
        .find_all(
            &QueryPlan::new("books").filter(FilterExpr::equals("publisher.name", "Acme")),
            &none(),
        )
        .await
        .expect_err("traversal is unsupported");
    let comparison = repo
        .count(
            &QueryPlan::new("books").filter(FilterExpr::fields(
                CompareOp::Equals,
                "name",
                "author",
            )),
            &none(),
        )
        .await
        .expect_err("attribute comparison is unsupported");

    for err in [&include, &traversal, &comparison] {
        assert_eq!(err.class, ErrorClass::CapabilityRejected);
        assert_eq!(err.to_error_object().status, 400);
    }
    assert_eq!(include.code(), "relationship_traversal_unsupported");
    assert_eq!(traversal.title(), "relationship traversal unsupported");
    assert_eq!(comparison.code(), "attribute_comparison_unsupported");
    assert_eq!(
        *sink.rejected.lock(),
        vec![
            "relationship_traversal_unsupported",
            "relationship_traversal_unsupported",
            "attribute_comparison_unsupported",
        ]
    );
}

#[tokio::test]
async fn plan_for_other_type_is_invalid_query() {
    let repo = repository(MemoryCollection::new());

    let err = repo
        .find_all(&QueryPlan::new("people"), &none())
        .await
        .expect_err("wrong resource type");

    assert_eq!(err.class, ErrorClass::InvalidQuery);
}

//
// relationship mutations
//

#[tokio::test]
async fn relationship_mutations_are_unsupported() {
    let (repo, id, _) = seeded().await;
    let targets = [DocumentId::from("t-1")];

    let results = [
        repo.update_relationship(&id, "publisher", &targets),
        repo.add_to_relationship(&id, "tags", &targets),
        repo.remove_from_relationship(&id, "tags", &targets),
    ];

    for result in results {
        let err = result.expect_err("relationship mutation must fail");
        assert_eq!(err.class, ErrorClass::UnsupportedOperation);
        assert_eq!(err.to_error_object().title, "operation not supported");
    }
}

//
// faults
//

#[tokio::test]
async fn backend_fault_is_unavailable() {
    let (repo, id, _) = seeded().await;
    repo.collection().set_unavailable(true);

    let err = repo.find_one(&id, &none()).await.expect_err("backend down");

    assert_eq!(err.class, ErrorClass::BackendUnavailable);
    assert_eq!(err.to_error_object().status, 503);
}

#[tokio::test]
async fn cancelled_request_never_reaches_storage() {
    let (repo, id, _) = seeded().await;
    let (handle, signal) = CancelSignal::pair();
    handle.cancel();

    let err = repo
        .delete(&id, &signal)
        .await
        .expect_err("cancelled before I/O");

    assert_eq!(err.class, ErrorClass::Canceled);
    assert!(repo.find_one(&id, &none()).await.is_ok());
}

#[tokio::test]
async fn in_flight_request_is_cancelled() {
    let repo = repository(MemoryCollection::new().with_latency(Duration::from_secs(3600)));
    let (handle, signal) = CancelSignal::pair();
    let plan = QueryPlan::new("books");

    let pending = repo.find_all(&plan, &signal);
    let canceller = async {
        tokio::task::yield_now().await;
        handle.cancel();
    };
    let (result, ()) = tokio::join!(pending, canceller);

    let err = result.expect_err("in-flight request should be cancelled");
    assert_eq!(err.class, ErrorClass::Canceled);
    assert_eq!(err.to_error_object().status, 499);
}

#[tokio::test]
async fn metrics_sink_sees_rows_touched() {
    let sink = Arc::new(RecordingSink::default());
    let (repo, _, _) = seeded().await;
    let repo = repo.with_metrics_sink(sink.clone());

    repo.find_all(&QueryPlan::new("books"), &none())
        .await
        .expect("find_all");

    assert_eq!(*sink.finished.lock(), vec![(ExecKind::Load, 2)]);
}
