//! REST backend against a mock data service.

use rust_decimal::Decimal;
use serde_json::json;
use triptrack::models::Category;
use triptrack::remote::{BackendError, ExpenseBackend, ExpenseChanges, NewExpense, RestBackend, Session};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "anon-key";

fn session() -> Session {
    Session::new("tok-anika")
}

async fn setup() -> (MockServer, RestBackend) {
    let server = MockServer::start().await;
    let backend = RestBackend::new(&server.uri(), API_KEY);
    (server, backend)
}

// == Reads ==

#[tokio::test]
async fn test_list_expenses_sends_join_query_and_credentials() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/expenses"))
        .and(query_param("select", "*,profiles:user_id(full_name,email)"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", API_KEY))
        .and(header("authorization", "Bearer tok-anika"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "e2",
                "user_id": "bashir",
                "description": "Snacks",
                "amount": 100,
                "category": "Team",
                "created_at": "2024-01-15T08:20:00+00:00",
                "profiles": { "full_name": "Bashir Ahmed", "email": "bashir@example.com" }
            },
            {
                "id": "e1",
                "user_id": "ghost",
                "description": "Bus",
                "amount": "300.50",
                "category": "Personal",
                "created_at": "2024-01-15T08:10:00+00:00",
                "profiles": null
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = backend.list_expenses(&session()).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].expense.id, "e2");
    let owner = rows[0].owner.as_ref().unwrap();
    assert_eq!(owner.id, "bashir");
    assert_eq!(owner.full_name, "Bashir Ahmed");
    assert_eq!(rows[1].expense.amount, Decimal::new(30050, 2));
    assert_eq!(rows[1].expense.category, Category::Personal);
    assert!(rows[1].owner.is_none());
}

#[tokio::test]
async fn test_list_profiles_fills_missing_fields() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "anika", "full_name": "Anika Rahman", "email": "anika@example.com" },
            { "id": "bashir", "full_name": null }
        ])))
        .mount(&server)
        .await;

    let profiles = backend.list_profiles(&session()).await.unwrap();

    assert_eq!(profiles[0].full_name, "Anika Rahman");
    assert_eq!(profiles[1].id, "bashir");
    assert_eq!(profiles[1].full_name, "");
    assert_eq!(profiles[1].email, "");
}

#[tokio::test]
async fn test_error_status_carries_service_message() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/expenses"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "relation does not exist" })),
        )
        .mount(&server)
        .await;

    let err = backend.list_expenses(&session()).await.unwrap_err();

    match err {
        BackendError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "relation does not exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreadable_body_is_a_decode_error() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = backend.list_profiles(&session()).await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

// == Auth ==

#[tokio::test]
async fn test_current_user() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer tok-anika"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "anika", "email": "anika@example.com", "role": "authenticated" })),
        )
        .mount(&server)
        .await;

    let user = backend.current_user(&session()).await.unwrap().unwrap();
    assert_eq!(user.id, "anika");
    assert_eq!(user.email.as_deref(), Some("anika@example.com"));
}

#[tokio::test]
async fn test_expired_token_has_no_user() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "invalid JWT" })))
        .mount(&server)
        .await;

    assert!(backend.current_user(&session()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_sign_out_tolerates_missing_session() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    backend.sign_out(&session()).await.unwrap();
}

// == Writes ==

#[tokio::test]
async fn test_insert_posts_row() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/expenses"))
        .and(header("prefer", "return=minimal"))
        .and(body_json(json!({
            "user_id": "anika",
            "description": "Tea",
            "amount": "45.5",
            "category": "Team"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let expense = NewExpense {
        user_id: "anika".to_string(),
        description: "Tea".to_string(),
        amount: Decimal::new(455, 1),
        category: Category::Team,
    };
    backend.insert_expense(&session(), &expense).await.unwrap();
}

#[tokio::test]
async fn test_update_targets_row_by_id() {
    let (server, backend) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/expenses"))
        .and(query_param("id", "eq.e1"))
        .and(header("prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "e1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let changes = ExpenseChanges {
        description: "Bus".to_string(),
        amount: Decimal::new(500, 0),
        category: Category::Team,
    };
    backend.update_expense(&session(), "e1", &changes).await.unwrap();
}

#[tokio::test]
async fn test_delete_of_invisible_row_affects_nothing() {
    let (server, backend) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/expenses"))
        .and(query_param("id", "eq.e9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = backend.delete_expense(&session(), "e9").await.unwrap_err();
    assert!(matches!(err, BackendError::NoRowsAffected));
}
