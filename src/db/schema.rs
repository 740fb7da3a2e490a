use serde::{Deserialize, Serialize};
use surrealdb::{RecordId, sql::Datetime};

/// Persisted representation of a registered identity.
///
/// This struct carries the stored credential digest and therefore must never
/// be serialized into an API response; use [`IdentityView`] for anything
/// that leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Stable database identifier (table: `identity`).
    pub id: RecordId,
    /// Public subject identifier, carried as the `sub` claim of tokens.
    pub subject_id: String,
    /// Display name.
    pub name: String,
    /// Normalized (lowercased) email address, unique per identity.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Account status, e.g. "active".
    pub status: String,
    /// Assigned role names. May be empty; callers apply the implicit
    /// default role when resolving.
    pub roles: Vec<String>,
    /// Salted one-way digest of the credential.
    pub password_digest: String,
    /// When this record was first created.
    pub created_at: Option<Datetime>,
    /// When this record was last updated.
    pub updated_at: Option<Datetime>,
}

/// Payload used when inserting a new identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityCreate {
    pub subject_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub roles: Vec<String>,
    pub password_digest: String,
}

/// Secret-free projection of an identity, safe to serialize into responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityView {
    pub subject_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub roles: Vec<String>,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

impl From<IdentityRecord> for IdentityView {
    fn from(record: IdentityRecord) -> Self {
        Self {
            subject_id: record.subject_id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            status: record.status,
            roles: record.roles,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Persisted representation of a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Stable database identifier (table: `product`).
    pub id: RecordId,
    /// Public product identifier (UUID string).
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Units currently on hand.
    pub stock: i64,
    pub unit_price: f64,
    /// Threshold below which the product counts as low on stock.
    pub low_stock: i64,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

/// Projection of a product without the internal record id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub stock: i64,
    pub unit_price: f64,
    pub low_stock: i64,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

impl From<ProductRecord> for ProductView {
    fn from(record: ProductRecord) -> Self {
        Self {
            product_id: record.product_id,
            name: record.name,
            category: record.category,
            description: record.description,
            stock: record.stock,
            unit_price: record.unit_price,
            low_stock: record.low_stock,
            image_url: record.image_url,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Payload used when inserting a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub stock: i64,
    pub unit_price: f64,
    pub low_stock: i64,
    pub image_url: Option<String>,
    pub status: String,
}
