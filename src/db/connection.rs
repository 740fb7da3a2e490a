use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("STOCKROOM_DB_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("STOCKROOM_DB_NAMESPACE").unwrap_or_else(|_| "stockroom".to_string()),
            database: env::var("STOCKROOM_DB_DATABASE").unwrap_or_else(|_| "catalog".to_string()),
            username: env::var("STOCKROOM_DB_USERNAME").ok(),
            password: env::var("STOCKROOM_DB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    // Use the specified namespace and database
    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    // Define schema for each table
    let schema_queries = vec![
        // Identity table: one row per registered user. The password digest
        // lives only here; it must never travel past the identity store.
        "DEFINE TABLE identity SCHEMAFULL;
         DEFINE FIELD subject_id ON TABLE identity TYPE string;
         DEFINE FIELD name ON TABLE identity TYPE string;
         DEFINE FIELD email ON TABLE identity TYPE string;
         DEFINE FIELD phone ON TABLE identity TYPE option<string>;
         DEFINE FIELD status ON TABLE identity TYPE string DEFAULT 'active';
         DEFINE FIELD roles ON TABLE identity TYPE array<string> DEFAULT [];
         DEFINE FIELD password_digest ON TABLE identity TYPE string;
         DEFINE FIELD created_at ON TABLE identity VALUE time::now();
         DEFINE FIELD updated_at ON TABLE identity VALUE time::now();",
        // Product table
        "DEFINE TABLE product SCHEMAFULL;
         DEFINE FIELD product_id ON TABLE product TYPE string;
         DEFINE FIELD name ON TABLE product TYPE string;
         DEFINE FIELD category ON TABLE product TYPE string;
         DEFINE FIELD description ON TABLE product TYPE string;
         DEFINE FIELD stock ON TABLE product TYPE number DEFAULT 0;
         DEFINE FIELD unit_price ON TABLE product TYPE float;
         DEFINE FIELD low_stock ON TABLE product TYPE number DEFAULT 0;
         DEFINE FIELD image_url ON TABLE product TYPE option<string>;
         DEFINE FIELD status ON TABLE product TYPE string DEFAULT 'active';
         DEFINE FIELD created_at ON TABLE product VALUE time::now();
         DEFINE FIELD updated_at ON TABLE product VALUE time::now();",
        // Uniqueness and lookup indexes
        "DEFINE INDEX identity_subject ON TABLE identity COLUMNS subject_id UNIQUE;
         DEFINE INDEX identity_email ON TABLE identity COLUMNS email UNIQUE;
         DEFINE INDEX product_pid ON TABLE product COLUMNS product_id UNIQUE;
         DEFINE INDEX product_name ON TABLE product COLUMNS name;",
    ];

    for query in schema_queries {
        db.query(query).await?;
    }

    Ok(())
}
