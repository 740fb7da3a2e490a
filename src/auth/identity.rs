//! Identity storage and lookup.
//!
//! The narrow interface the auth core consumes from the document store:
//! lookups by subject id and by email, plus the write operations the
//! registration and user-management flows use. Nothing outside this module
//! touches the `identity` table directly.

use anyhow::{Result, anyhow};

use crate::db::Db;
use crate::db::schema::{IdentityCreate, IdentityRecord};
use crate::types::Email;

/// Identity store backed by the document database.
pub struct IdentityStore {
    db: Db,
}

/// Optional exact-match filters for listing identities.
#[derive(Debug, Clone, Default)]
pub struct IdentityFilters {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

/// Optional field updates for an identity. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub roles: Option<Vec<String>>,
}

impl IdentityUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.status.is_none()
            && self.roles.is_none()
    }
}

impl IdentityStore {
    /// Create a new identity store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Look up an identity by its public subject id.
    pub async fn find_by_subject_id(&self, subject_id: &str) -> Result<Option<IdentityRecord>> {
        let mut res = self
            .db
            .query(
                r#"
                SELECT * FROM identity
                WHERE subject_id = $subject_id
                LIMIT 1
                "#,
            )
            .bind(("subject_id", subject_id.to_string()))
            .await?;

        let identities: Vec<IdentityRecord> = res.take(0)?;
        Ok(identities.into_iter().next())
    }

    /// Look up an identity by normalized email.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<IdentityRecord>> {
        let mut res = self
            .db
            .query(
                r#"
                SELECT * FROM identity
                WHERE email = $email
                LIMIT 1
                "#,
            )
            .bind(("email", email.as_str().to_string()))
            .await?;

        let identities: Vec<IdentityRecord> = res.take(0)?;
        Ok(identities.into_iter().next())
    }

    /// Insert a new identity.
    pub async fn create_identity(&self, create: &IdentityCreate) -> Result<IdentityRecord> {
        let mut res = self
            .db
            .query(
                r#"
                CREATE identity SET
                    subject_id = $subject_id,
                    name = $name,
                    email = $email,
                    phone = $phone,
                    status = $status,
                    roles = $roles,
                    password_digest = $password_digest,
                    created_at = time::now(),
                    updated_at = time::now()
                "#,
            )
            .bind(("subject_id", create.subject_id.clone()))
            .bind(("name", create.name.clone()))
            .bind(("email", create.email.clone()))
            .bind(("phone", create.phone.clone()))
            .bind(("status", create.status.clone()))
            .bind(("roles", create.roles.clone()))
            .bind(("password_digest", create.password_digest.clone()))
            .await?;

        let created: Option<IdentityRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create identity record"))
    }

    /// Replace the stored credential digest for a subject.
    pub async fn update_credential(&self, subject_id: &str, digest: &str) -> Result<()> {
        self.db
            .query(
                r#"
                UPDATE identity SET
                    password_digest = $digest,
                    updated_at = time::now()
                WHERE subject_id = $subject_id
                "#,
            )
            .bind(("subject_id", subject_id.to_string()))
            .bind(("digest", digest.to_string()))
            .await?;

        Ok(())
    }

    /// Apply the non-`None` fields of `update`, returning the updated record,
    /// or `None` when no identity matched.
    pub async fn update_identity(
        &self,
        subject_id: &str,
        update: &IdentityUpdate,
    ) -> Result<Option<IdentityRecord>> {
        let mut sets = Vec::new();
        if update.name.is_some() {
            sets.push("name = $name");
        }
        if update.email.is_some() {
            sets.push("email = $email");
        }
        if update.phone.is_some() {
            sets.push("phone = $phone");
        }
        if update.status.is_some() {
            sets.push("status = $status");
        }
        if update.roles.is_some() {
            sets.push("roles = $roles");
        }

        if sets.is_empty() {
            return self.find_by_subject_id(subject_id).await;
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE identity SET {} WHERE subject_id = $subject_id",
            sets.join(", ")
        );

        let mut res = self
            .db
            .query(query)
            .bind(("subject_id", subject_id.to_string()))
            .bind(("name", update.name.clone()))
            .bind(("email", update.email.clone()))
            .bind(("phone", update.phone.clone()))
            .bind(("status", update.status.clone()))
            .bind(("roles", update.roles.clone()))
            .await?;

        let updated: Option<IdentityRecord> = res.take(0)?;
        Ok(updated)
    }

    /// Delete an identity by subject id. Returns true when a record was
    /// removed.
    pub async fn delete_identity(&self, subject_id: &str) -> Result<bool> {
        let mut res = self
            .db
            .query("DELETE identity WHERE subject_id = $subject_id RETURN BEFORE")
            .bind(("subject_id", subject_id.to_string()))
            .await?;

        let removed: Vec<IdentityRecord> = res.take(0)?;
        Ok(!removed.is_empty())
    }

    /// List identities matching the filters with offset paging.
    pub async fn list_identities(
        &self,
        filters: &IdentityFilters,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<IdentityRecord>> {
        let query = format!(
            "SELECT * FROM identity{} LIMIT $limit START $offset",
            filter_clause(filters)
        );

        let mut res = self
            .db
            .query(query)
            .bind(("name", filters.name.clone()))
            .bind(("email", filters.email.clone()))
            .bind(("status", filters.status.clone()))
            .bind(("limit", limit))
            .bind(("offset", offset))
            .await?;

        let identities: Vec<IdentityRecord> = res.take(0)?;
        Ok(identities)
    }

    /// Count identities matching the filters.
    pub async fn count_identities(&self, filters: &IdentityFilters) -> Result<u64> {
        #[derive(serde::Deserialize)]
        struct CountRow {
            count: i64,
        }

        let query = format!(
            "SELECT count() AS count FROM identity{} GROUP ALL",
            filter_clause(filters)
        );

        let mut res = self
            .db
            .query(query)
            .bind(("name", filters.name.clone()))
            .bind(("email", filters.email.clone()))
            .bind(("status", filters.status.clone()))
            .await?;

        let row: Option<CountRow> = res.take(0)?;
        Ok(row.map(|r| r.count.max(0) as u64).unwrap_or(0))
    }
}

fn filter_clause(filters: &IdentityFilters) -> String {
    let mut clauses = Vec::new();
    if filters.name.is_some() {
        clauses.push("name = $name");
    }
    if filters.email.is_some() {
        clauses.push("email = $email");
    }
    if filters.status.is_some() {
        clauses.push("status = $status");
    }

    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DatabaseConfig, create_connection, ensure_schema};

    async fn setup_store() -> IdentityStore {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        IdentityStore::new(db)
    }

    fn sample_identity(email: &str) -> IdentityCreate {
        IdentityCreate {
            subject_id: uuid::Uuid::new_v4().to_string(),
            name: "Alice".to_string(),
            email: email.to_string(),
            phone: None,
            status: "active".to_string(),
            roles: vec!["user".to_string()],
            password_digest: "$argon2id$test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_subject_id() {
        let store = setup_store().await;

        let created = store
            .create_identity(&sample_identity("alice@example.com"))
            .await
            .unwrap();

        let found = store
            .find_by_subject_id(&created.subject_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.email, "alice@example.com");
        assert_eq!(found.roles, vec!["user".to_string()]);
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let store = setup_store().await;
        store
            .create_identity(&sample_identity("alice@example.com"))
            .await
            .unwrap();

        let found = store
            .find_by_email(&Email::normalized("alice@example.com"))
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = store
            .find_by_email(&Email::normalized("nobody@example.com"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = setup_store().await;
        store
            .create_identity(&sample_identity("alice@example.com"))
            .await
            .unwrap();

        let dup = store
            .create_identity(&sample_identity("alice@example.com"))
            .await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn test_update_identity_partial() {
        let store = setup_store().await;
        let created = store
            .create_identity(&sample_identity("alice@example.com"))
            .await
            .unwrap();

        let update = IdentityUpdate {
            status: Some("inactive".to_string()),
            ..Default::default()
        };
        let updated = store
            .update_identity(&created.subject_id, &update)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, "inactive");
        assert_eq!(updated.name, "Alice");
    }

    #[tokio::test]
    async fn test_update_missing_identity_is_none() {
        let store = setup_store().await;
        let update = IdentityUpdate {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        let updated = store.update_identity("no-such-subject", &update).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete_identity() {
        let store = setup_store().await;
        let created = store
            .create_identity(&sample_identity("alice@example.com"))
            .await
            .unwrap();

        assert!(store.delete_identity(&created.subject_id).await.unwrap());
        assert!(!store.delete_identity(&created.subject_id).await.unwrap());
        assert!(
            store
                .find_by_subject_id(&created.subject_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let store = setup_store().await;
        store
            .create_identity(&sample_identity("alice@example.com"))
            .await
            .unwrap();

        let mut bob = sample_identity("bob@example.com");
        bob.name = "Bob".to_string();
        bob.status = "inactive".to_string();
        store.create_identity(&bob).await.unwrap();

        let all = store
            .count_identities(&IdentityFilters::default())
            .await
            .unwrap();
        assert_eq!(all, 2);

        let filters = IdentityFilters {
            status: Some("inactive".to_string()),
            ..Default::default()
        };
        let inactive = store.list_identities(&filters, 10, 0).await.unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_update_credential() {
        let store = setup_store().await;
        let created = store
            .create_identity(&sample_identity("alice@example.com"))
            .await
            .unwrap();

        store
            .update_credential(&created.subject_id, "$argon2id$new")
            .await
            .unwrap();

        let found = store
            .find_by_subject_id(&created.subject_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.password_digest, "$argon2id$new");
    }
}
