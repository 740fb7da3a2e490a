// REST API: routing, handlers, and the auth hooks routes compose with.

pub mod dto;
mod error;
mod extract;

pub use error::ApiError;
pub use extract::{BearerToken, RouteGate, guard_roles};

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::{Form, Router, middleware};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::auth::{
    self, IdentityFilters, IdentityStore, IdentityUpdate, Principal, PrincipalResolver,
    RevocationRegistry, TokenCodec, hash_password, verify_password,
};
use crate::config::AuthConfig;
use crate::context::track_requests;
use crate::db::schema::{IdentityCreate, IdentityView, ProductView};
use crate::db::{Db, QueryBuilder, queries::ProductUpdate};
use crate::pagination::{Paging, PaginationInfo};
use crate::types::Email;
use crate::utils;

use dto::{
    CreatedResponse, ListResponse, LoginForm, PageQuery, ProductCreateRequest,
    ProductFilterQuery, RegisterRequest, RegisterResponse, TokenResponse, UserFilterQuery,
    UserUpdateRequest,
};

/// Shared state for all routes: the database plus the wired auth core.
#[derive(Clone)]
pub struct AppState {
    db: Db,
    identities: Arc<IdentityStore>,
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationRegistry>,
    resolver: Arc<PrincipalResolver>,
}

impl AppState {
    /// Wire up the auth core against a connected database.
    pub fn new(db: Db, auth_config: &AuthConfig) -> Self {
        let identities = Arc::new(IdentityStore::new(db.clone()));
        let codec = Arc::new(TokenCodec::new(auth_config));
        let revocations = Arc::new(RevocationRegistry::new());
        let resolver = Arc::new(PrincipalResolver::new(
            codec.clone(),
            revocations.clone(),
            identities.clone(),
        ));

        Self {
            db,
            identities,
            codec,
            revocations,
            resolver,
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn identities(&self) -> &Arc<IdentityStore> {
        &self.identities
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    pub fn revocations(&self) -> &Arc<RevocationRegistry> {
        &self.revocations
    }

    pub fn resolver(&self) -> &Arc<PrincipalResolver> {
        &self.resolver
    }
}

/// Build the full application router.
///
/// Route tiers:
/// - public: liveness and product reads
/// - authenticated (any role): `me`, logout, user reads
/// - `{admin, editor}` gated: product writes
/// - `{admin}` gated: user management, product deletion
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/{product_id}", get(get_product));

    let account = Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/users/{subject_id}", get(get_user));

    let editorial = Router::new()
        .route("/api/v1/products", post(create_products))
        .route("/api/v1/products/{product_id}", put(update_product))
        .route_layer(middleware::from_fn_with_state(
            RouteGate::new(state.clone(), &["admin", "editor"]),
            guard_roles,
        ));

    let admin = Router::new()
        .route("/api/v1/users", get(list_users))
        .route(
            "/api/v1/users/{subject_id}",
            put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            RouteGate::new(state.clone(), &["admin"]),
            guard_roles,
        ));

    Router::new()
        .merge(public)
        .merge(account)
        .merge(editorial)
        .merge(admin)
        .route("/api/v1/products/{product_id}", delete(delete_product))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(track_requests))
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// CORS for the local frontend dev servers.
fn cors_layer() -> CorsLayer {
    CorsLayer::very_permissive().allow_origin([
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ])
}

async fn root() -> Json<Value> {
    tracing::info!("root endpoint accessed");
    Json(json!({ "message": "Heal the World" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = Email::normalized(&payload.email);

    let existing = state.identities().find_by_email(&email).await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let create = IdentityCreate {
        subject_id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        email: email.into_inner(),
        phone: payload.phone.map(|p| p.trim().to_string()),
        status: payload.status,
        roles: utils::normalize_roles(payload.roles),
        password_digest: hash_password(&payload.password)?,
    };

    let record = state.identities().create_identity(&create).await.map_err(|e| {
        tracing::error!("failed to register user: {e:#}");
        ApiError::internal("Database error while registering user")
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            status: StatusCode::CREATED.as_u16(),
            data: record.into(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = Email::normalized(&form.username);
    tracing::info!(email = %email, "login attempt");

    // Unknown email and wrong password produce the same response body so
    // the endpoint cannot be used to probe for registered addresses.
    let Some(identity) = state.identities().find_by_email(&email).await? else {
        return Err(invalid_credentials());
    };
    if !verify_password(&identity.password_digest, &form.password) {
        return Err(invalid_credentials());
    }

    let roles = if identity.roles.is_empty() {
        vec![auth::DEFAULT_ROLE.to_string()]
    } else {
        identity.roles
    };

    let token = state
        .codec()
        .issue(&identity.subject_id, &roles, Utc::now())
        .map_err(|e| {
            tracing::error!("token issuance failed: {e}");
            ApiError::internal("Internal server error")
        })?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Incorrect email or password")
}

async fn me(principal: Principal) -> Json<Principal> {
    Json(principal)
}

async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Json<Value> {
    state.revocations().revoke(&token).await;
    Json(json!({ "message": "Logged out" }))
}

async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<UserFilterQuery>,
) -> Result<Json<ListResponse<IdentityView>>, ApiError> {
    let size = page.size.clamp(1, 200);
    let current_page = page.page.max(1);
    let paging = Paging::from_page_size(current_page, size);

    let filters = IdentityFilters {
        name: filters.name,
        email: filters.email.map(|e| Email::normalized(&e).into_inner()),
        status: filters.status,
    };

    let total = state.identities().count_identities(&filters).await?;
    let records = state
        .identities()
        .list_identities(&filters, paging.limit, paging.offset)
        .await?;

    Ok(Json(ListResponse {
        data: records.into_iter().map(IdentityView::from).collect(),
        pagination_info: PaginationInfo::new(total, size, current_page),
    }))
}

async fn get_user(
    _principal: Principal,
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<Json<IdentityView>, ApiError> {
    let identity = state
        .identities()
        .find_by_subject_id(&subject_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(identity.into()))
}

async fn update_user(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<IdentityView>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let update = IdentityUpdate {
        name: payload.name,
        email: payload.email.map(|e| Email::normalized(&e).into_inner()),
        phone: payload.phone,
        status: payload.status,
        roles: payload.roles.map(|r| utils::normalize_roles(Some(r))),
    };

    let updated = state
        .identities()
        .update_identity(&subject_id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(updated.into()))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.identities().delete_identity(&subject_id).await? {
        return Err(ApiError::not_found("User"));
    }

    // Best-effort: stale upload artifacts never fail the deletion itself.
    utils::remove_avatar_artifacts(FsPath::new(utils::AVATAR_DIR), &subject_id);

    Ok(StatusCode::NO_CONTENT)
}

async fn list_products(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<ProductFilterQuery>,
) -> Result<Json<ListResponse<ProductView>>, ApiError> {
    let size = page.size.clamp(1, 200);
    let current_page = page.page.max(1);
    let paging = Paging::from_page_size(current_page, size);

    let total = QueryBuilder::count_products(state.db(), filters.name.as_deref()).await?;
    let records = QueryBuilder::list_products(
        state.db(),
        filters.name.as_deref(),
        paging.limit,
        paging.offset,
    )
    .await?;

    Ok(Json(ListResponse {
        data: records.into_iter().map(ProductView::from).collect(),
        pagination_info: PaginationInfo::new(total, size, current_page),
    }))
}

async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let product = QueryBuilder::find_product_by_id(state.db(), &product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))?;

    Ok(Json(product.into()))
}

async fn create_products(
    State(state): State<AppState>,
    Json(batch): Json<Vec<ProductCreateRequest>>,
) -> Result<(StatusCode, Json<CreatedResponse<Vec<ProductView>>>), ApiError> {
    if batch.is_empty() {
        return Err(ApiError::bad_request("No products to create"));
    }

    let payloads: Vec<_> = batch.into_iter().map(|p| p.into_create()).collect();
    let records = QueryBuilder::create_products(state.db(), &payloads)
        .await
        .map_err(|e| {
            tracing::error!("failed to create products: {e:#}");
            ApiError::internal("Database error while creating products")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            status: StatusCode::CREATED.as_u16(),
            data: records.into_iter().map(ProductView::from).collect(),
        }),
    ))
}

async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<ProductView>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let updated = QueryBuilder::update_product(state.db(), &product_id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))?;

    Ok(Json(updated.into()))
}

async fn delete_product(
    principal: Principal,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // Deletion is the one product operation reserved for admins.
    auth::authorize(&principal, &["admin"])?;

    if !QueryBuilder::delete_product(state.db(), &product_id).await? {
        return Err(ApiError::not_found("Product"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::REQUEST_ID_HEADER;
    use crate::db::{DatabaseConfig, create_connection, ensure_schema};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use chrono::Duration;
    use jsonwebtoken::Algorithm;
    use tower::ServiceExt;

    async fn setup_app() -> (Router, AppState) {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();

        let state = AppState::new(
            db,
            &AuthConfig::new("api-test-secret", Algorithm::HS256, 60),
        );
        (create_router(state.clone()), state)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_user(app: &Router, email: &str, roles: Option<Vec<&str>>) -> Value {
        let mut payload = json!({
            "name": "Test User",
            "email": email,
            "password": "correct-horse",
        });
        if let Some(roles) = roles {
            payload["roles"] = json!(roles);
        }

        let (status, body) = send(app, "POST", "/api/v1/auth/register", None, Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn login_user(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={email}&password={password}")))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn token_for(app: &Router, email: &str) -> String {
        let (status, body) = login_user(app, email, "correct-horse").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().unwrap().to_string()
    }

    fn sample_product_body() -> Value {
        json!([{
            "name": "hammer",
            "category": "tools",
            "description": "a hammer",
            "stock": 5,
            "unit_price": 12.5,
            "low_stock": 1,
        }])
    }

    #[tokio::test]
    async fn test_liveness_endpoints() {
        let (app, _) = setup_app().await;

        let (status, body) = send(&app, "GET", "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Heal the World");

        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_register_defaults_to_user_role() {
        let (app, _) = setup_app().await;

        let body = register_user(&app, "alice@example.com", None).await;
        assert_eq!(body["status"], 201);
        assert_eq!(body["data"]["roles"], json!(["user"]));
        // The digest never leaves the identity store
        assert!(body["data"].get("password").is_none());
        assert!(body["data"].get("password_digest").is_none());
    }

    #[tokio::test]
    async fn test_register_normalizes_email_and_roles() {
        let (app, _) = setup_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "name": "Bob",
                "email": " Bob@Example.COM ",
                "password": "pw",
                "roles": ["Editor", "ADMIN", "editor"],
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["email"], "bob@example.com");
        assert_eq!(body["data"]["roles"], json!(["admin", "editor"]));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let (app, _) = setup_app().await;
        register_user(&app, "alice@example.com", None).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "name": "Also Alice",
                "email": "ALICE@example.com",
                "password": "pw",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "Email already registered");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (app, _) = setup_app().await;
        register_user(&app, "alice@example.com", None).await;

        let (status_bad_pw, body_bad_pw) =
            login_user(&app, "alice@example.com", "wrong").await;
        let (status_unknown, body_unknown) =
            login_user(&app, "nobody@example.com", "wrong").await;

        assert_eq!(status_bad_pw, StatusCode::UNAUTHORIZED);
        assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
        assert_eq!(body_bad_pw, body_unknown);
    }

    #[tokio::test]
    async fn test_me_round_trip() {
        let (app, _) = setup_app().await;
        let registered = register_user(&app, "alice@example.com", None).await;
        let token = token_for(&app, "alice@example.com").await;

        let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject_id"], registered["data"]["subject_id"]);
        assert_eq!(body["roles"], json!(["user"]));
        assert!(body.get("password_digest").is_none());
    }

    #[tokio::test]
    async fn test_me_without_token_is_unauthorized() {
        let (app, _) = setup_app().await;
        let (status, body) = send(&app, "GET", "/api/v1/auth/me", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Not authenticated");
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let (app, _) = setup_app().await;
        register_user(&app, "alice@example.com", None).await;
        let token = token_for(&app, "alice@example.com").await;

        let (status, body) = send(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out");

        let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Token has been revoked");
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let (app, state) = setup_app().await;
        let registered = register_user(&app, "alice@example.com", None).await;
        let subject = registered["data"]["subject_id"].as_str().unwrap();

        let expired = state
            .codec()
            .issue_with_ttl(
                subject,
                &["user".to_string()],
                Utc::now(),
                Duration::minutes(-1),
            )
            .unwrap();

        let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&expired), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Token expired");
    }

    #[tokio::test]
    async fn test_stale_subject_reads_as_invalid_token() {
        let (app, state) = setup_app().await;

        // Properly signed token whose subject was never registered
        let ghost = state
            .codec()
            .issue("ghost-subject", &["user".to_string()], Utc::now())
            .unwrap();

        let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&ghost), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid token");

        // Same body as a garbage token
        let (status, garbage) = send(&app, "GET", "/api/v1/auth/me", Some("junk"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, garbage);
    }

    #[tokio::test]
    async fn test_user_gate_denies_plain_user() {
        let (app, _) = setup_app().await;
        register_user(&app, "alice@example.com", None).await;
        let token = token_for(&app, "alice@example.com").await;

        let (status, body) = send(&app, "GET", "/api/v1/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Forbidden");
    }

    #[tokio::test]
    async fn test_user_gate_admits_admin() {
        let (app, _) = setup_app().await;
        register_user(&app, "root@example.com", Some(vec!["admin"])).await;
        let token = token_for(&app, "root@example.com").await;

        let (status, body) = send(&app, "GET", "/api/v1/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination_info"]["totalElements"], 1);
    }

    #[tokio::test]
    async fn test_user_list_pagination() {
        let (app, _) = setup_app().await;
        register_user(&app, "root@example.com", Some(vec!["admin"])).await;
        register_user(&app, "a@example.com", None).await;
        register_user(&app, "b@example.com", None).await;
        let token = token_for(&app, "root@example.com").await;

        let (status, body) =
            send(&app, "GET", "/api/v1/users?page=1&size=2", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination_info"]["totalElements"], 3);
        assert_eq!(body["pagination_info"]["totalPages"], 2);
        assert_eq!(body["pagination_info"]["currentPage"], 1);
    }

    #[tokio::test]
    async fn test_get_user_requires_auth() {
        let (app, _) = setup_app().await;
        let registered = register_user(&app, "alice@example.com", None).await;
        let subject = registered["data"]["subject_id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/users/{subject}");
        let (status, _) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = token_for(&app, "alice@example.com").await;
        let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "alice@example.com");

        let (status, body) =
            send(&app, "GET", "/api/v1/users/no-such-id", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "User not found");
    }

    #[tokio::test]
    async fn test_update_user_as_admin() {
        let (app, _) = setup_app().await;
        register_user(&app, "root@example.com", Some(vec!["admin"])).await;
        let registered = register_user(&app, "alice@example.com", None).await;
        let subject = registered["data"]["subject_id"].as_str().unwrap().to_string();
        let token = token_for(&app, "root@example.com").await;

        let uri = format!("/api/v1/users/{subject}");

        // Empty update is a client error
        let (status, body) = send(&app, "PUT", &uri, Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No fields to update");

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "status": "inactive" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "inactive");
        assert_eq!(body["name"], "Test User");

        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/users/no-such-id",
            Some(&token),
            Some(json!({ "status": "inactive" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_user_as_admin() {
        let (app, _) = setup_app().await;
        register_user(&app, "root@example.com", Some(vec!["admin"])).await;
        let registered = register_user(&app, "alice@example.com", None).await;
        let subject = registered["data"]["subject_id"].as_str().unwrap().to_string();
        let token = token_for(&app, "root@example.com").await;

        let uri = format!("/api/v1/users/{subject}");
        let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_product_reads_are_public() {
        let (app, _) = setup_app().await;

        let (status, body) = send(&app, "GET", "/api/v1/products", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination_info"]["totalElements"], 0);
    }

    #[tokio::test]
    async fn test_product_writes_are_gated() {
        let (app, _) = setup_app().await;
        register_user(&app, "alice@example.com", None).await;
        register_user(&app, "ed@example.com", Some(vec!["editor"])).await;

        // No token: 401
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/products",
            None,
            Some(sample_product_body()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Plain user: 403
        let user_token = token_for(&app, "alice@example.com").await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/products",
            Some(&user_token),
            Some(sample_product_body()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Editor passes the {admin, editor} gate
        let editor_token = token_for(&app, "ed@example.com").await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/products",
            Some(&editor_token),
            Some(sample_product_body()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["name"], "hammer");
    }

    #[tokio::test]
    async fn test_product_crud_round_trip() {
        let (app, _) = setup_app().await;
        register_user(&app, "ed@example.com", Some(vec!["editor"])).await;
        register_user(&app, "root@example.com", Some(vec!["admin"])).await;
        let editor = token_for(&app, "ed@example.com").await;
        let admin = token_for(&app, "root@example.com").await;

        let (_, created) = send(
            &app,
            "POST",
            "/api/v1/products",
            Some(&editor),
            Some(sample_product_body()),
        )
        .await;
        let product_id = created["data"][0]["product_id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/products/{product_id}");

        // Public read
        let (status, body) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "hammer");

        // Editor update
        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(&editor),
            Some(json!({ "unit_price": 20.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["unit_price"], 20.0);

        // Deletion is admin-only
        let (status, body) = send(&app, "DELETE", &uri, Some(&editor), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Forbidden");

        let (status, _) = send(&app, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_product_batch_is_rejected() {
        let (app, _) = setup_app().await;
        register_user(&app, "ed@example.com", Some(vec!["editor"])).await;
        let editor = token_for(&app, "ed@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/products",
            Some(&editor),
            Some(json!([])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No products to create");
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let (app, _) = setup_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(REQUEST_ID_HEADER, "trace-me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "trace-me"
        );
    }
}
