//! Integration tests driving the typed client against the in-process
//! mock backend on an ephemeral port.

use std::sync::Arc;

use orgdesk_client::{Authenticated, OrgdeskClient, Session};
use orgdesk_mock::{AppState, router};
use shared::models::EmployeePayload;
use shared::request::{DivisionQuery, EmployeeQuery};

/// Spin up the mock backend, returning its base URL.
async fn spawn_mock() -> String {
    let state = Arc::new(AppState::seeded());
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

async fn login(base_url: &str) -> OrgdeskClient<Authenticated> {
    let client = OrgdeskClient::new(base_url).unwrap();
    client
        .login("admin", "pastibisa")
        .await
        .map_err(|(e, _)| e)
        .expect("login should succeed")
}

#[tokio::test]
async fn login_stores_token_and_profile() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    assert!(client.is_authenticated());
    assert!(client.token().is_some());
    assert_eq!(client.admin().unwrap().name, "Administrator");
}

#[tokio::test]
async fn login_failure_surfaces_server_message() {
    let base_url = spawn_mock().await;
    let client = OrgdeskClient::new(&base_url).unwrap();

    let (err, client) = client
        .login("admin", "wrong")
        .await
        .err()
        .expect("login should fail");

    assert_eq!(err.server_message(), Some("Invalid username or password"));
    assert!(err.is_unauthorized());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn divisions_list_is_seeded_and_single_page() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    let page = client
        .list_divisions(&DivisionQuery::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 6);
    let pagination = page.pagination.unwrap();
    assert_eq!(pagination.current_page, 1);
    assert_eq!(pagination.last_page, 1);
    assert!(!pagination.has_next());
}

#[tokio::test]
async fn employee_pages_report_boundaries() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    let first = client
        .list_employees(&EmployeeQuery::default())
        .await
        .unwrap();
    assert_eq!(first.items.len(), 10);
    let meta = first.pagination.unwrap();
    assert!(meta.has_next());
    assert!(!meta.has_prev());
    assert_eq!(meta.from, Some(1));

    let second = client
        .list_employees(&EmployeeQuery {
            page: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second.items.len(), 2);
    let meta = second.pagination.unwrap();
    assert!(!meta.has_next());
    assert!(meta.has_prev());
    assert_eq!(meta.from, Some(11));
}

#[tokio::test]
async fn name_filter_narrows_employees() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    let page = client
        .list_employees(&EmployeeQuery {
            name: Some("alice".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Alice Johnson");
}

#[tokio::test]
async fn unmatched_filter_yields_empty_page() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    let page = client
        .list_employees(&EmployeeQuery {
            name: Some("no such person".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(page.items.is_empty());
    let meta = page.pagination.unwrap();
    assert_eq!(meta.from, None);
    assert_eq!(meta.last_page, 1);
}

#[tokio::test]
async fn create_update_delete_roundtrip() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    let divisions = client
        .list_divisions(&DivisionQuery::default())
        .await
        .unwrap();
    let division = &divisions.items[0];

    let payload = EmployeePayload {
        image: "https://randomuser.me/api/portraits/men/1.jpg".into(),
        name: "Zed Integration".into(),
        phone: "081234567999".into(),
        division_id: division.id.clone(),
        position: "Test Engineer".into(),
    };
    let created = client.create_employee(&payload).await.unwrap();
    assert_eq!(created.name, "Zed Integration");
    assert_eq!(created.division.id, division.id);

    // The new record shows up in subsequent fetches
    let page = client
        .list_employees(&EmployeeQuery {
            name: Some("Zed Integration".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);

    let updated = client
        .update_employee(
            &created.id,
            &EmployeePayload {
                position: "Lead Test Engineer".into(),
                ..payload
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.position, "Lead Test Engineer");
    assert_eq!(updated.id, created.id);

    client.delete_employee(&created.id).await.unwrap();
    let page = client
        .list_employees(&EmployeeQuery {
            name: Some("Zed Integration".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn create_with_unknown_division_is_rejected() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    let err = client
        .create_employee(&EmployeePayload {
            image: "https://example.com/p.jpg".into(),
            name: "Ghost".into(),
            phone: "0812".into(),
            division_id: "not-a-division".into(),
            position: "Nowhere".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.server_message(),
        Some("The selected division id is invalid.")
    );
}

#[tokio::test]
async fn blank_fields_are_rejected() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    let err = client
        .create_employee(&EmployeePayload::default())
        .await
        .unwrap_err();

    assert!(err.server_message().is_some());
    assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let base_url = spawn_mock().await;
    let client = login(&base_url).await;

    let token = client.token().unwrap().to_string();
    let admin = client.admin().unwrap().clone();
    let client = client.logout().await;
    assert!(!client.is_authenticated());

    // The old token no longer works
    let stale = OrgdeskClient::from_session(&base_url, Session::new(token, admin)).unwrap();
    let err = stale
        .list_divisions(&DivisionQuery::default())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn bogus_token_is_unauthorized() {
    let base_url = spawn_mock().await;
    let admin = shared::client::Admin {
        id: "x".into(),
        name: "Nobody".into(),
        username: "nobody".into(),
        email: None,
        phone: None,
    };
    let client = OrgdeskClient::from_session(&base_url, Session::new("bogus", admin)).unwrap();

    let err = client
        .list_employees(&EmployeeQuery::default())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("Unauthenticated."));
}
