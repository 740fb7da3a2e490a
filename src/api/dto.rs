//! Request and response payloads for the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::db::schema::{IdentityView, ProductCreate};
use crate::pagination::PaginationInfo;

fn default_status() -> String {
    "active".to_string()
}

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    10
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub roles: Option<Vec<String>>,
}

/// Login form (urlencoded, OAuth2 password-flow field names).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Envelope for creation endpoints: echoed status plus the created data.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse<T> {
    pub status: u16,
    pub data: T,
}

/// Envelope for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination_info: PaginationInfo,
}

/// Page selection query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

/// Exact-match filters for the user list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilterQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

/// Exact-match filters for the product list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilterQuery {
    pub name: Option<String>,
}

/// Partial user update payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub roles: Option<Vec<String>>,
}

impl UserUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.status.is_none()
            && self.roles.is_none()
    }
}

/// Payload for one product in a bulk create.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreateRequest {
    pub name: String,
    pub category: String,
    pub description: String,
    pub stock: i64,
    pub unit_price: f64,
    pub low_stock: i64,
    pub image_url: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl ProductCreateRequest {
    /// Turn the request into a storable payload with a fresh product id.
    pub fn into_create(self) -> ProductCreate {
        ProductCreate {
            product_id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            category: self.category,
            description: self.description,
            stock: self.stock,
            unit_price: self.unit_price,
            low_stock: self.low_stock,
            image_url: self.image_url,
            status: self.status,
        }
    }
}

/// Response for user registration.
pub type RegisterResponse = CreatedResponse<IdentityView>;
