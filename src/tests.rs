use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use crate::domain::entities::product::Product;
use crate::domain::entities::query::{Filters, ListParams, SortModel, SortSynonyms};
use crate::domain::entities::transaction::{StatusScope, Transaction, TransactionStatus};
use crate::infra::import::csv::{import_seed_to_sqlite, SeedSources};
use crate::infra::sqlite::repo::{SqliteProductsFetcher, SqliteRepo, SqliteTransactionsFetcher};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::fetcher::{FetchError, ListFetcher};
use crate::usecase::ports::repo::{DocumentKind, PortalRepository, RepoError};
use crate::usecase::ports::session::{SessionContext, TRANSACTION_AUTHORIZED_FLAG};
use crate::usecase::services::discount_service::{DiscountService, PreviewError};
use crate::usecase::services::edit_service::{ActionError, EditService, InvoiceForm, TransactionAction};
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::list_orchestrator::{
    DispatchOutcome, ListOptions, ListOrchestrator, ListTrigger,
};
use crate::usecase::services::query_service::QueryService;

const POS_ID: &str = "pos-roma-01";

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("esercente-{prefix}-{nanos}"))
}

fn seeded_db(prefix: &str) -> (PathBuf, PathBuf) {
    let temp_dir = unique_test_dir(prefix);
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("portal.sqlite");
    ImportService::new(db_path.clone())
        .seed_demo_data()
        .expect("seed should succeed");
    (temp_dir, db_path)
}

fn transactions(db_path: &PathBuf, scope: StatusScope) -> SqliteTransactionsFetcher {
    SqliteTransactionsFetcher {
        db_path: db_path.clone(),
        pos_id: POS_ID.to_string(),
        scope,
    }
}

fn params(page: u32, size: u32, sort: Option<&str>, filters: &[(&str, &str)]) -> ListParams {
    ListParams {
        page,
        size,
        sort: sort.map(str::to_string),
        filters: filters
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
    }
}

#[test]
fn init_db_creates_required_tables() {
    let temp_dir = unique_test_dir("init-db");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("portal.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('point_of_sale','product','trx','discount_code')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 4, "required tables should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn seed_runs_once() {
    let temp_dir = unique_test_dir("seed-once");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("portal.sqlite");

    let first = import_seed_to_sqlite(&db_path, &SeedSources::bundled()).expect("first seed");
    assert!(!first.skipped);
    assert_eq!(first.points_of_sale, 2);
    assert_eq!(first.products, 32);
    assert_eq!(first.transactions, 48);
    assert_eq!(first.discount_codes, 6);

    let second = import_seed_to_sqlite(&db_path, &SeedSources::bundled()).expect("second seed");
    assert!(second.skipped, "existing data should not be imported twice");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let trx_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM trx", [], |row| row.get(0))
        .expect("trx count query should succeed");
    assert_eq!(trx_count, 48, "second seed must not duplicate rows");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn seed_rejects_unknown_columns() {
    let temp_dir = unique_test_dir("seed-bad-column");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("portal.sqlite");
    let sources = SeedSources {
        point_of_sale: "id,business_name,nickname\npos-1,Shop,shop\n",
        ..SeedSources::bundled()
    };

    let result = import_seed_to_sqlite(&db_path, &sources);

    let err = result.expect_err("unknown column should be rejected");
    assert!(format!("{err:#}").contains("nickname"), "unexpected error: {err:#}");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn point_of_sale_is_loaded_by_id() {
    let (temp_dir, db_path) = seeded_db("pos");
    let repo = SqliteRepo { db_path };

    let pos = repo.point_of_sale(POS_ID).expect("point of sale should exist");
    assert_eq!(pos.business_name, "Elettrodomestici Colosseo S.r.l.");
    assert!(matches!(
        repo.point_of_sale("pos-missing"),
        Err(RepoError::NotFound(_))
    ));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn in_progress_pages_are_scoped_and_counted() {
    let (temp_dir, db_path) = seeded_db("in-progress-pages");
    let fetcher = transactions(&db_path, StatusScope::InProgress);

    let first = fetcher
        .fetch(params(0, 5, Some("updateDate,desc"), &[]))
        .await
        .expect("first page should load");
    assert_eq!(first.total_elements, Some(17));
    assert_eq!(first.content.len(), 5);
    assert!(first
        .content
        .iter()
        .all(|trx| StatusScope::InProgress.contains(trx.status)));
    assert!(first
        .content
        .windows(2)
        .all(|pair| pair[0].update_date >= pair[1].update_date));

    let last = fetcher
        .fetch(params(3, 5, Some("updateDate,desc"), &[]))
        .await
        .expect("last page should load");
    assert_eq!(last.page_no, Some(3));
    assert_eq!(last.content.len(), 2);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn transaction_filters_narrow_the_page() {
    let (temp_dir, db_path) = seeded_db("trx-filters");
    let in_progress = transactions(&db_path, StatusScope::InProgress);
    let processed = transactions(&db_path, StatusScope::Processed);

    let by_fiscal_code = in_progress
        .fetch(params(0, 10, None, &[("fiscalCode", "evc")]))
        .await
        .expect("fiscal code filter should load");
    let uuids = by_fiscal_code
        .content
        .iter()
        .map(|trx| trx.uuid.as_str())
        .collect::<Vec<_>>();
    assert_eq!(uuids, ["trx-0001"]);

    let invoiced = processed
        .fetch(params(0, 25, None, &[("status", "INVOICED")]))
        .await
        .expect("status filter should load");
    assert_eq!(invoiced.total_elements, Some(8));
    assert!(invoiced
        .content
        .iter()
        .all(|trx| trx.status == TransactionStatus::Invoiced && trx.invoice_number.is_some()));

    let blank = processed
        .fetch(params(0, 25, None, &[("status", "  "), ("fiscalCode", "")]))
        .await
        .expect("blank filters should be ignored");
    assert_eq!(blank.total_elements, Some(25));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn unsupported_sort_and_status_are_backend_errors() {
    let (temp_dir, db_path) = seeded_db("trx-bad-sort");
    let fetcher = transactions(&db_path, StatusScope::InProgress);

    let bad_sort = fetcher.fetch(params(0, 10, Some("bogus,asc"), &[])).await;
    assert!(
        matches!(&bad_sort, Err(FetchError::Backend(message)) if message.contains("bogus")),
        "unexpected result: {bad_sort:?}"
    );

    let bad_status = fetcher
        .fetch(params(0, 10, None, &[("status", "LOST")]))
        .await;
    assert!(matches!(bad_status, Err(FetchError::Backend(_))));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn product_column_sorts_through_its_synonym() {
    let (temp_dir, db_path) = seeded_db("trx-synonym");
    let list = ListOrchestrator::new(
        "in_progress",
        Arc::new(transactions(&db_path, StatusScope::InProgress)),
        ListOptions {
            page_size: 25,
            default_sort: Some(SortModel::desc("updateDate")),
            synonyms: SortSynonyms::transactions(),
        },
    );

    assert_eq!(list.dispatch(ListTrigger::Mount).await, DispatchOutcome::Loaded);
    let outcome = list
        .dispatch(ListTrigger::Sort(Some(SortModel::asc("additionalProperties"))))
        .await;
    assert_eq!(outcome, DispatchOutcome::Loaded);

    let snapshot = list.snapshot();
    assert!(!snapshot.error);
    assert_eq!(snapshot.sort, Some(SortModel::asc("additionalProperties")));
    assert_eq!(snapshot.rows.len(), 17);
    let names = snapshot
        .rows
        .iter()
        .filter_map(|trx: &Transaction| trx.product_name.clone())
        .collect::<Vec<_>>();
    assert_eq!(names.len(), 16, "one in-progress row has no product");
    assert!(names.windows(2).all(|pair| pair[0] <= pair[1]));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn fetch_failure_is_reported_as_error_state() {
    let temp_dir = unique_test_dir("missing-tables");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("empty.sqlite");
    Connection::open(&db_path).expect("should create empty db");
    let list = ListOrchestrator::new(
        "in_progress",
        Arc::new(transactions(&db_path, StatusScope::InProgress)),
        ListOptions::default(),
    );

    assert_eq!(list.dispatch(ListTrigger::Mount).await, DispatchOutcome::Failed);
    let snapshot = list.snapshot();
    assert!(snapshot.error);
    assert!(snapshot.rows.is_empty());
    assert!(!snapshot.is_loading());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn product_search_matches_names_in_order() {
    let (temp_dir, db_path) = seeded_db("product-search");
    let fetcher: Arc<dyn ListFetcher<Product>> = Arc::new(SqliteProductsFetcher { db_path });
    let query = QueryService::new(fetcher);

    let found = query
        .search_products("  lavatrice ")
        .await
        .expect("search should succeed");
    assert!(!found.is_empty());
    assert!(found
        .iter()
        .all(|product| product.product_name.to_lowercase().contains("lavatrice")));
    assert!(found
        .windows(2)
        .all(|pair| pair[0].product_name <= pair[1].product_name));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn capture_and_cancel_follow_the_status_rules() {
    let (temp_dir, db_path) = seeded_db("capture-cancel");
    let repo: Arc<dyn PortalRepository> = Arc::new(SqliteRepo { db_path });
    let edit = EditService::new(repo.clone(), POS_ID);

    let captured = edit.capture("trx-0005").await.expect("authorized trx captures");
    assert_eq!(captured.status, TransactionStatus::Captured);

    let again = edit.capture("trx-0005").await;
    assert!(matches!(
        again,
        Err(ActionError::Failed {
            action: TransactionAction::Capture,
            ..
        })
    ));
    assert!(matches!(
        repo.capture_transaction(POS_ID, "trx-0005"),
        Err(RepoError::InvalidState {
            status: TransactionStatus::Captured,
            ..
        })
    ));

    let cancelled = edit.cancel("trx-0006").await.expect("captured trx cancels");
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);

    assert!(matches!(
        repo.cancel_transaction(POS_ID, "trx-0002"),
        Err(RepoError::InvalidState {
            status: TransactionStatus::Rewarded,
            ..
        })
    ));
    assert!(matches!(
        repo.cancel_transaction(POS_ID, "trx-0000"),
        Err(RepoError::NotFound(_))
    ), "other points of sale are invisible");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn invoice_upload_moves_rewarded_to_invoiced() {
    let (temp_dir, db_path) = seeded_db("invoice");
    let repo: Arc<dyn PortalRepository> = Arc::new(SqliteRepo { db_path });
    let edit = EditService::new(repo, POS_ID);
    let form = InvoiceForm {
        kind: DocumentKind::CreditNote,
        document_number: " NC-2024/007 ".to_string(),
        file: Some(temp_dir.join("nota.pdf")),
    };

    let invoiced = edit
        .upload_invoice("trx-0002", &form)
        .await
        .expect("rewarded trx accepts an invoice");
    assert_eq!(invoiced.status, TransactionStatus::Invoiced);
    assert_eq!(invoiced.invoice_number.as_deref(), Some("NC-2024/007"));

    let not_rewarded = edit.upload_invoice("trx-0005", &form).await;
    assert!(matches!(not_rewarded, Err(ActionError::Failed { .. })));

    let invalid = InvoiceForm {
        file: Some(temp_dir.join("nota.docx")),
        ..form
    };
    assert_eq!(
        edit.upload_invoice("trx-0007", &invalid).await,
        Err(ActionError::Validation(TransactionAction::UploadInvoice))
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn discount_preview_rejects_bad_codes() {
    let (temp_dir, db_path) = seeded_db("discount-preview");
    let repo: Arc<dyn PortalRepository> = Arc::new(SqliteRepo { db_path });
    let session = SessionContext::new();
    let discounts = DiscountService::new(repo, session, POS_ID);

    assert_eq!(
        discounts.preview("ab12").await,
        Err(PreviewError::InvalidFormat)
    );
    assert_eq!(
        discounts.preview("EXP12345").await,
        Err(PreviewError::CodeNotFound)
    );
    assert_eq!(
        discounts.preview("ZZZZ9999").await,
        Err(PreviewError::CodeNotFound)
    );
    assert_eq!(
        discounts.preview("used0001").await,
        Err(PreviewError::AlreadyAuthorized)
    );
    assert!(discounts.draft().is_none(), "failed previews leave no draft");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn authorized_discount_shows_up_in_progress() {
    let (temp_dir, db_path) = seeded_db("discount-authorize");
    let repo: Arc<dyn PortalRepository> = Arc::new(SqliteRepo {
        db_path: db_path.clone(),
    });
    let session = SessionContext::new();
    let discounts = DiscountService::new(repo, session.clone(), POS_ID);

    assert_eq!(
        discounts.authorize().await,
        Err(ActionError::Validation(TransactionAction::AuthorizeDiscount)),
        "authorizing needs a previewed draft"
    );

    let preview = discounts
        .preview(" ab12 cd34 ")
        .await
        .expect("valid code previews");
    assert_eq!(preview.code, "AB12CD34");
    assert_eq!(preview.residual_cents(), 64_900 - 19_470);
    assert_eq!(
        discounts.draft().map(|draft| draft.code),
        Some("AB12CD34".to_string())
    );

    let trx = discounts.authorize().await.expect("code authorizes");
    assert_eq!(trx.status, TransactionStatus::Authorized);
    assert_eq!(trx.uuid, "trx-ab12cd34");
    assert!(discounts.draft().is_none(), "draft is discarded after authorizing");
    assert!(session.take_flag(TRANSACTION_AUTHORIZED_FLAG));
    assert!(!session.take_flag(TRANSACTION_AUTHORIZED_FLAG));

    assert_eq!(
        discounts.preview("AB12CD34").await,
        Err(PreviewError::AlreadyAuthorized)
    );

    let page = transactions(&db_path, StatusScope::InProgress)
        .fetch(params(0, 25, None, &[("trxCode", "ab12cd34")]))
        .await
        .expect("new transaction should be listed");
    assert_eq!(page.total_elements, Some(1));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn reset_filters_refetches_the_whole_scope() {
    let (temp_dir, db_path) = seeded_db("reset-filters");
    let list = ListOrchestrator::new(
        "processed",
        Arc::new(transactions(&db_path, StatusScope::Processed)),
        ListOptions::default(),
    );
    list.dispatch(ListTrigger::Mount).await;

    let applied = Filters::from([("status".to_string(), "CANCELLED".to_string())]);
    assert_eq!(
        list.dispatch(ListTrigger::ApplyFilters(applied)).await,
        DispatchOutcome::Loaded
    );
    assert_eq!(list.snapshot().total_elements, 8);

    let cleared = Filters::from([("status".to_string(), String::new())]);
    assert_eq!(
        list.dispatch(ListTrigger::ResetFilters(cleared)).await,
        DispatchOutcome::Loaded
    );
    let snapshot = list.snapshot();
    assert_eq!(snapshot.total_elements, 25);
    assert_eq!(snapshot.pagination.page, 0);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
