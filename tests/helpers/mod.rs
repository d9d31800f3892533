#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use http_body_util::BodyExt;
use imbds::{AppState, config::Config};
use imbds_shared::user::Role;
use imbds_user::RegisterInput;
use serde_json::Value;
use temp_dir::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "test_secret_key_minimum_32_characters_long";
pub const PASSWORD: &str = "my_password";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _dir: TempDir,
}

/// Build the real router over a temp-dir database. `extra` is appended to a
/// minimal TOML configuration.
pub async fn setup_test_app(extra: &str) -> anyhow::Result<TestApp> {
    let dir = TempDir::new()?;
    let config = Config::from_toml(&format!("[auth]\nsecret = \"{SECRET}\"\n{extra}"))?;

    let url = format!("sqlite:{}", dir.child("db.sqlite3").to_str().unwrap());
    let pool = imbds_db::create_pool(&url, 1).await?;
    imbds_db::migrate(&pool).await?;

    let state = AppState::new(config, pool);
    let app = imbds::router(state.clone());

    Ok(TestApp {
        app,
        state,
        _dir: dir,
    })
}

impl TestApp {
    pub async fn create_user(&self, name: &str, role: Role) -> anyhow::Result<i64> {
        let id = self
            .state
            .user_command
            .register(RegisterInput {
                username: name.to_owned(),
                email: format!("{name}@imbds.localhost"),
                password: PASSWORD.to_owned(),
                first_name: "".to_owned(),
                last_name: "".to_owned(),
                role,
            })
            .await?;

        Ok(id)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Log in and return the `Cookie` header value carrying both tokens.
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/login",
                None,
                serde_json::json!({ "username": username, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), 200, "login as {username}");

        set_cookies(&response)
            .iter()
            .map(|c| c.split(';').next().unwrap().to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    let mut cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    cookies.sort();
    cookies
}

/// Value of the `Set-Cookie` entry named `name`, if any.
pub fn cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|c| {
        let pair = c.split(';').next()?.to_string();
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
