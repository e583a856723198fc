//! Employee listing and the two-step account creation flow

mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use godown::employees::{EmployeeCreation, NewEmployee};
use godown::error::Error;
use godown::models::UserRole;

use common::{employee_ctx, owner_ctx, warehouse};

fn new_employee() -> NewEmployee {
    NewEmployee {
        name: "Shafiq Ahmed".to_string(),
        email: "shafiq@example.com".to_string(),
        password: "secret123".to_string(),
        role: UserRole::Employee,
    }
}

#[tokio::test]
async fn list_calls_the_privileged_function() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_users_with_email"))
        .and(header("apikey", "test-key"))
        .and(header("Authorization", "Bearer owner-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "owner-1",
                "name": "Mill Owner",
                "role": "owner",
                "email": "owner@example.com"
            },
            {
                "id": "employee-1",
                "name": "Clerk",
                "role": "employee",
                "email": "clerk@example.com"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let warehouse = warehouse(&server.uri());
    let profiles = warehouse
        .employees()
        .list(&owner_ctx())
        .await
        .expect("listing succeeds");

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].role, UserRole::Owner);
    assert_eq!(profiles[1].email.as_deref(), Some("clerk@example.com"));
}

#[tokio::test]
async fn list_refuses_non_owners_before_any_request() {
    let server = MockServer::start().await;
    let warehouse = warehouse(&server.uri());

    let result = warehouse.employees().list(&employee_ctx()).await;
    assert!(matches!(result, Err(Error::Forbidden)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_signs_up_then_patches_the_profile() {
    let server = MockServer::start().await;

    // Confirmation is required, so sign-up returns the bare account.
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({
            "email": "shafiq@example.com",
            "data": { "name": "Shafiq Ahmed" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "new-user-1",
            "email": "shafiq@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(wiremock::matchers::query_param("id", "eq.new-user-1"))
        .and(header("Authorization", "Bearer owner-token"))
        .and(body_partial_json(json!({
            "name": "Shafiq Ahmed",
            "role": "employee"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "new-user-1",
                "name": "Shafiq Ahmed",
                "role": "employee"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let warehouse = warehouse(&server.uri());
    let outcome = warehouse
        .employees()
        .create(&owner_ctx(), &new_employee())
        .await
        .expect("creation flow runs");

    match outcome {
        EmployeeCreation::Created(profile) => {
            assert_eq!(profile.id, "new-user-1");
            assert_eq!(profile.role, UserRole::Employee);
            assert_eq!(profile.email.as_deref(), Some("shafiq@example.com"));
        }
        EmployeeCreation::RolePatchFailed { user_id, error } => {
            panic!("unexpected partial failure for {}: {}", user_id, error)
        }
    }
}

#[tokio::test]
async fn role_patch_failure_is_a_distinct_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "new-user-1",
            "email": "shafiq@example.com"
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "permission denied for table users"
        })))
        .mount(&server)
        .await;

    let warehouse = warehouse(&server.uri());
    let outcome = warehouse
        .employees()
        .create(&owner_ctx(), &new_employee())
        .await
        .expect("partial failure is not a hard error");

    match outcome {
        EmployeeCreation::RolePatchFailed { user_id, error } => {
            assert_eq!(user_id, "new-user-1");
            assert!(matches!(error, Error::Api { status, .. } if status.as_u16() == 403));
        }
        EmployeeCreation::Created(profile) => {
            panic!("expected partial failure, got profile {}", profile.id)
        }
    }
}

#[tokio::test]
async fn sign_up_failure_fails_the_whole_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "User already registered"
        })))
        .mount(&server)
        .await;

    let warehouse = warehouse(&server.uri());
    let result = warehouse
        .employees()
        .create(&owner_ctx(), &new_employee())
        .await;

    assert!(matches!(result, Err(Error::Api { status, .. }) if status.as_u16() == 422));
}
