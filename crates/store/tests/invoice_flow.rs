//! End-to-end invoice flows: the resource store and the transition
//! controller working against a scripted transport, with the event channel
//! wired to list refreshes the way an owning view would do it.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use facture_client::testing::MockApi;
use facture_client::{Api, Method};
use facture_core::{InvoiceStatus, ListQuery, PageInfo};
use facture_store::{
    MemoryNotifier, NoticeKind, Notifier, PENDING_TRANSITION_DELAY, ResourceStore,
    TransitionController, TransitionEvent,
};

fn invoice_json(id: &str, status: &str) -> Value {
    json!({ "id": id, "number": format!("INV-{id}"), "status": status, "total": 250.0 })
}

fn invoice_store(api: &Arc<MockApi>) -> ResourceStore<facture_core::Invoice> {
    ResourceStore::new(
        Arc::clone(api) as Arc<dyn Api>,
        Arc::new(MemoryNotifier::new()) as Arc<dyn Notifier>,
    )
}

/// Count status PATCHes for an invoice that carried the given status value.
fn patch_count(api: &MockApi, invoice_id: &str, status: &str) -> usize {
    let path = format!("invoices/{invoice_id}/status");
    api.calls()
        .iter()
        .filter(|c| c.method == Method::Patch && c.path == path)
        .filter(|c| {
            c.body
                .as_ref()
                .and_then(|b| b.get("status"))
                .and_then(Value::as_str)
                == Some(status)
        })
        .count()
}

#[tokio::test]
async fn paginated_invoice_list_exposes_page_info() {
    let api = Arc::new(MockApi::new().on(
        Method::Get,
        "invoices",
        200,
        json!({
            "data": {
                "data": [invoice_json("1", "PENDING"), invoice_json("2", "DRAFT")],
                "meta": { "total": 25, "totalPages": 3, "page": 2 }
            }
        }),
    ));
    let store = invoice_store(&api);

    let items = store
        .list_all(&ListQuery::new().page(2).limit(10))
        .await
        .expect("list should succeed");
    assert_eq!(items.len(), 2);
    assert_eq!(
        store.page_info(),
        Some(PageInfo {
            total_items: 25,
            total_pages: 3,
            current_page: 2
        })
    );
}

#[tokio::test(start_paused = true)]
async fn emailed_invoice_auto_transitions_to_pending_after_ten_seconds() {
    let api = Arc::new(
        MockApi::new()
            .on(
                Method::Post,
                "invoices/inv-1/send-email",
                200,
                json!({ "message": "Invoice sent" }),
            )
            .on(
                Method::Patch,
                "invoices/inv-1/status",
                200,
                json!({ "message": "Status updated", "data": invoice_json("inv-1", "PENDING") }),
            ),
    );
    let notifier = Arc::new(MemoryNotifier::new());
    let controller = TransitionController::new(
        Arc::clone(&api) as Arc<dyn Api>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    controller.send_email("inv-1").await.unwrap();
    assert!(controller.is_pending("inv-1"));

    // Just before the deadline nothing has fired.
    tokio::time::sleep(PENDING_TRANSITION_DELAY - Duration::from_secs(1)).await;
    assert_eq!(patch_count(&api, "inv-1", "PENDING"), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(patch_count(&api, "inv-1", "PENDING"), 1);
    assert!(!controller.is_pending("inv-1"));
}

#[tokio::test(start_paused = true)]
async fn mark_paid_at_t_plus_three_suppresses_the_pending_patch() {
    let api = Arc::new(
        MockApi::new()
            .on(
                Method::Post,
                "invoices/inv-1/send-email",
                200,
                json!({ "message": "Invoice sent" }),
            )
            .on(
                Method::Patch,
                "invoices/inv-1/status",
                200,
                json!({ "message": "Status updated", "data": invoice_json("inv-1", "PAID") }),
            ),
    );
    let notifier = Arc::new(MemoryNotifier::new());
    let controller = TransitionController::new(
        Arc::clone(&api) as Arc<dyn Api>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    controller.send_email("inv-1").await.unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    let invoice = controller.mark_paid("inv-1").await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(patch_count(&api, "inv-1", "PAID"), 1);

    // Well past the original deadline: the PENDING patch never fires.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(patch_count(&api, "inv-1", "PENDING"), 0);
    assert_eq!(patch_count(&api, "inv-1", "PAID"), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelling_immediately_issues_exactly_one_status_call() {
    let api = Arc::new(
        MockApi::new()
            .on(
                Method::Post,
                "invoices/inv-1/send-email",
                200,
                json!({ "message": "Invoice sent" }),
            )
            .on(
                Method::Patch,
                "invoices/inv-1/status",
                200,
                json!({ "message": "Status updated", "data": invoice_json("inv-1", "CANCELLED") }),
            ),
    );
    let notifier = Arc::new(MemoryNotifier::new());
    let controller = TransitionController::new(
        Arc::clone(&api) as Arc<dyn Api>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    controller.send_email("inv-1").await.unwrap();
    controller.cancel_invoice("inv-1").await.unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(patch_count(&api, "inv-1", "CANCELLED"), 1);
    assert_eq!(patch_count(&api, "inv-1", "PENDING"), 0);
    assert_eq!(api.call_count(Method::Patch, "invoices/inv-1/status"), 1);
}

#[tokio::test(start_paused = true)]
async fn timers_for_distinct_invoices_are_independent() {
    let api = Arc::new(
        MockApi::new()
            .on(
                Method::Post,
                "invoices/inv-x/send-email",
                200,
                json!({ "message": "Invoice sent" }),
            )
            .on(
                Method::Post,
                "invoices/inv-y/send-email",
                200,
                json!({ "message": "Invoice sent" }),
            )
            .on(
                Method::Patch,
                "invoices/inv-x/status",
                200,
                json!({ "message": "Status updated", "data": invoice_json("inv-x", "CANCELLED") }),
            )
            .on(
                Method::Patch,
                "invoices/inv-y/status",
                200,
                json!({ "message": "Status updated", "data": invoice_json("inv-y", "PENDING") }),
            ),
    );
    let notifier = Arc::new(MemoryNotifier::new());
    let controller = TransitionController::new(
        Arc::clone(&api) as Arc<dyn Api>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    controller.send_email("inv-x").await.unwrap();
    controller.send_email("inv-y").await.unwrap();
    assert_eq!(controller.pending_ids().len(), 2);

    // Cancelling X leaves Y's timer running.
    controller.cancel_invoice("inv-x").await.unwrap();
    assert!(!controller.is_pending("inv-x"));
    assert!(controller.is_pending("inv-y"));

    tokio::time::sleep(PENDING_TRANSITION_DELAY + Duration::from_secs(1)).await;
    assert_eq!(patch_count(&api, "inv-x", "PENDING"), 0);
    assert_eq!(patch_count(&api, "inv-y", "PENDING"), 1);
}

#[tokio::test(start_paused = true)]
async fn auto_pending_event_drives_a_list_refresh() {
    let api = Arc::new(
        MockApi::new()
            .on(
                Method::Get,
                "invoices",
                200,
                json!({ "data": [invoice_json("inv-1", "SENT")] }),
            )
            .on(
                Method::Post,
                "invoices/inv-1/send-email",
                200,
                json!({ "message": "Invoice sent" }),
            )
            .on(
                Method::Patch,
                "invoices/inv-1/status",
                200,
                json!({ "message": "Status updated", "data": invoice_json("inv-1", "PENDING") }),
            ),
    );
    let store = Arc::new(invoice_store(&api));
    let (tx, mut rx) = mpsc::channel(8);
    let controller = TransitionController::new(
        Arc::clone(&api) as Arc<dyn Api>,
        Arc::new(MemoryNotifier::new()) as Arc<dyn Notifier>,
    )
    .with_events(tx);

    store.list_all(&ListQuery::new()).await;
    assert_eq!(store.items()[0].status, InvoiceStatus::Sent);

    controller.send_email("inv-1").await.unwrap();

    // Owner loop: wait for the transition event, then refresh. The server
    // now reports the invoice as PENDING.
    api.set_response(
        Method::Get,
        "invoices",
        200,
        json!({ "data": [invoice_json("inv-1", "PENDING")] }),
    );

    tokio::time::sleep(PENDING_TRANSITION_DELAY + Duration::from_secs(1)).await;
    let event = rx.recv().await.expect("event channel stays open");
    assert_eq!(
        event,
        TransitionEvent::AutoPending {
            invoice_id: "inv-1".to_string()
        }
    );

    store.refresh().await;
    assert_eq!(store.items()[0].status, InvoiceStatus::Pending);
}

#[tokio::test]
async fn create_invoice_prepends_and_notifies_once() {
    let api = Arc::new(
        MockApi::new()
            .on(Method::Get, "invoices", 200, json!({ "data": [] }))
            .on(
                Method::Post,
                "invoices",
                201,
                json!({ "message": "Invoice created", "data": invoice_json("inv-7", "DRAFT") }),
            ),
    );
    let notifier = Arc::new(MemoryNotifier::new());
    let store: ResourceStore<facture_core::Invoice> = ResourceStore::new(
        Arc::clone(&api) as Arc<dyn Api>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    store.list_all(&ListQuery::new()).await;
    let created = store
        .create(&json!({
            "clientId": "c-1",
            "items": [{ "productId": "p-1", "quantity": 2 }]
        }))
        .await
        .unwrap();

    assert_eq!(created.id, "inv-7");
    assert_eq!(store.items().len(), 1);
    assert_eq!(notifier.count(NoticeKind::Success), 1);
}
