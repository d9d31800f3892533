use axum::http::{Method, StatusCode};
use imbds_shared::user::Role;
use serde_json::json;

mod helpers;

use helpers::{body_json, json_request, request};

fn new_user(name: &str, role: &str) -> serde_json::Value {
    json!({
        "username": name,
        "email": format!("{name}@imbds.localhost"),
        "password": "another_password",
        "role": role,
    })
}

#[tokio::test]
async fn test_listing_requires_authentication() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    app.create_user("alice", Role::Employee).await?;
    app.create_user("bob", Role::Admin).await?;

    let response = app.send(request(Method::GET, "/users", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = app.login("alice").await;
    let response = app.send(request(Method::GET, "/users", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[1]["user_role"], "Admin");
    for user in users {
        assert!(user.get("password").is_none());
    }

    Ok(())
}

#[tokio::test]
async fn test_detail() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    let id = app.create_user("alice", Role::Employee).await?;
    let cookie = app.login("alice").await;

    let response = app
        .send(request(Method::GET, &format!("/users/{id}"), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_id"], id);
    assert_eq!(body["user_status"], "online");

    let response = app.send(request(Method::GET, "/users/9999", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(request(Method::GET, &format!("/users/{id}"), None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_only_admin_registers_by_default() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    app.create_user("alice", Role::Employee).await?;
    app.create_user("bob", Role::Admin).await?;

    let response = app
        .send(json_request(Method::POST, "/users", None, new_user("carol", "Employee")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let employee = app.login("alice").await;
    let response = app
        .send(json_request(
            Method::POST,
            "/users",
            Some(&employee),
            new_user("carol", "Employee"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = app.login("bob").await;
    let response = app
        .send(json_request(
            Method::POST,
            "/users",
            Some(&admin),
            new_user("carol", "Employee"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "carol");
    assert_eq!(body["user_role"], "Employee");

    let response = app
        .send(json_request(
            Method::POST,
            "/users",
            Some(&admin),
            new_user("carol", "Employee"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_open_registration() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("open_registration = true\n").await?;

    let response = app
        .send(json_request(Method::POST, "/users", None, new_user("dave", "employee")))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .send(json_request(Method::POST, "/users", None, new_user("eve", "Admin")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_invalid_registration_data() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("open_registration = true\n").await?;

    let response = app
        .send(json_request(
            Method::POST,
            "/users",
            None,
            json!({ "username": "frank", "email": "not-an-email", "password": "short" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid data.");
    assert!(body["details"].get("email").is_some());
    assert!(body["details"].get("password").is_some());

    Ok(())
}

#[tokio::test]
async fn test_self_or_admin_update() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    let alice = app.create_user("alice", Role::Employee).await?;
    let bob = app.create_user("bob", Role::Employee).await?;
    app.create_user("root", Role::Admin).await?;

    let cookie = app.login("alice").await;

    let response = app
        .send(json_request(
            Method::PATCH,
            &format!("/users/{alice}"),
            Some(&cookie),
            json!({ "first_name": "Alice" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["first_name"], "Alice");

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/users/{bob}"),
            Some(&cookie),
            json!({ "first_name": "Bob" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(json_request(
            Method::PATCH,
            &format!("/users/{alice}"),
            Some(&cookie),
            json!({ "role": "Admin" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = app.login("root").await;
    let response = app
        .send(json_request(
            Method::PATCH,
            &format!("/users/{bob}"),
            Some(&admin),
            json!({ "role": "Admin", "last_name": "Builder" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_role"], "Admin");
    assert_eq!(body["last_name"], "Builder");

    Ok(())
}

#[tokio::test]
async fn test_password_change_applies_to_next_login() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    let alice = app.create_user("alice", Role::Employee).await?;
    let cookie = app.login("alice").await;

    let response = app
        .send(json_request(
            Method::PATCH,
            &format!("/users/{alice}"),
            Some(&cookie),
            json!({ "password": "a_brand_new_password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(json_request(
            Method::POST,
            "/login",
            None,
            json!({ "username": "alice", "password": helpers::PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request(
            Method::POST,
            "/login",
            None,
            json!({ "username": "alice", "password": "a_brand_new_password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_principals_cannot_be_deleted() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    let alice = app.create_user("alice", Role::Admin).await?;
    let cookie = app.login("alice").await;

    let response = app
        .send(request(Method::DELETE, &format!("/users/{alice}"), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}

#[tokio::test]
async fn test_write_bodies_use_view_field_names() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    let bob = app.create_user("bob", Role::Employee).await?;
    app.create_user("root", Role::Admin).await?;
    let admin = app.login("root").await;

    let response = app
        .send(json_request(
            Method::POST,
            "/users",
            Some(&admin),
            json!({
                "username": "carol",
                "email": "carol@imbds.localhost",
                "password": "another_password",
                "user_role": "Admin",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["user_role"], "Admin");

    let response = app
        .send(json_request(
            Method::PATCH,
            &format!("/users/{bob}"),
            Some(&admin),
            json!({ "user_role": "Admin", "user_status": "offline" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_role"], "Admin");
    assert_eq!(body["user_status"], "offline");

    Ok(())
}

#[tokio::test]
async fn test_unknown_write_fields_are_rejected() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    let alice = app.create_user("alice", Role::Employee).await?;
    let cookie = app.login("alice").await;

    let response = app
        .send(json_request(
            Method::PATCH,
            &format!("/users/{alice}"),
            Some(&cookie),
            json!({ "first_name": "Alice", "nickname": "al" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .send(request(Method::GET, &format!("/users/{alice}"), Some(&cookie)))
        .await;
    assert_eq!(body_json(response).await["first_name"], "");

    Ok(())
}

#[tokio::test]
async fn test_employee_full_update_restating_own_role() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    let alice = app.create_user("alice", Role::Employee).await?;
    let cookie = app.login("alice").await;

    let response = app
        .send(request(Method::GET, &format!("/users/{alice}"), Some(&cookie)))
        .await;
    let mut record = body_json(response).await;
    record["first_name"] = json!("Alice");

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/users/{alice}"),
            Some(&cookie),
            record,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["first_name"], "Alice");
    assert_eq!(body["user_role"], "Employee");

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/users/{alice}"),
            Some(&cookie),
            json!({ "first_name": "Al", "role": "Employee", "status": "online" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["first_name"], "Al");

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/users/{alice}"),
            Some(&cookie),
            json!({ "first_name": "Al", "user_status": "archived" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_update_without_changes_reports_it() -> anyhow::Result<()> {
    let app = helpers::setup_test_app("").await?;
    let alice = app.create_user("alice", Role::Employee).await?;
    let cookie = app.login("alice").await;

    let response = app
        .send(json_request(
            Method::PATCH,
            &format!("/users/{alice}"),
            Some(&cookie),
            json!({ "username": "alice", "user_role": "Employee" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "No changes made" })
    );

    Ok(())
}
