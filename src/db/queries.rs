// Database query helpers for SurrealDB.
//
// These perform real SurrealDB queries but keep the logic deliberately
// simple so they can evolve alongside the schema.

use crate::db::schema::*;
use anyhow::{Result, anyhow};
use serde::Deserialize;
use surrealdb::{Surreal, engine::any::Any};

pub struct QueryBuilder;

/// Optional field updates for a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<f64>,
    pub low_stock: Option<i64>,
    pub status: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.unit_price.is_none()
            && self.low_stock.is_none()
            && self.status.is_none()
    }
}

#[derive(Deserialize)]
struct CountRow {
    count: i64,
}

impl QueryBuilder {
    /// Create a single product record.
    pub async fn create_product(db: &Surreal<Any>, data: &ProductCreate) -> Result<ProductRecord> {
        let mut res = db
            .query(
                r#"
                CREATE product SET
                    product_id = $product_id,
                    name = $name,
                    category = $category,
                    description = $description,
                    stock = $stock,
                    unit_price = $unit_price,
                    low_stock = $low_stock,
                    image_url = $image_url,
                    status = $status,
                    created_at = time::now(),
                    updated_at = time::now()
                "#,
            )
            .bind(("product_id", data.product_id.clone()))
            .bind(("name", data.name.clone()))
            .bind(("category", data.category.clone()))
            .bind(("description", data.description.clone()))
            .bind(("stock", data.stock))
            .bind(("unit_price", data.unit_price))
            .bind(("low_stock", data.low_stock))
            .bind(("image_url", data.image_url.clone()))
            .bind(("status", data.status.clone()))
            .await?;

        let created: Option<ProductRecord> = res.take(0)?;
        created.ok_or_else(|| anyhow!("failed to create product record"))
    }

    /// Create a batch of products, one record per payload.
    pub async fn create_products(
        db: &Surreal<Any>,
        batch: &[ProductCreate],
    ) -> Result<Vec<ProductRecord>> {
        let mut created = Vec::with_capacity(batch.len());
        for data in batch {
            created.push(Self::create_product(db, data).await?);
        }
        Ok(created)
    }

    pub async fn find_product_by_id(
        db: &Surreal<Any>,
        product_id: &str,
    ) -> Result<Option<ProductRecord>> {
        let mut res = db
            .query(
                r#"
                SELECT * FROM product
                WHERE product_id = $product_id
                LIMIT 1
                "#,
            )
            .bind(("product_id", product_id.to_string()))
            .await?;

        let product: Option<ProductRecord> = res.take(0)?;
        Ok(product)
    }

    /// List products with an optional exact-name filter and offset paging.
    pub async fn list_products(
        db: &Surreal<Any>,
        name: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ProductRecord>> {
        let query = if name.is_some() {
            "SELECT * FROM product WHERE name = $name LIMIT $limit START $offset"
        } else {
            "SELECT * FROM product LIMIT $limit START $offset"
        };

        let mut res = db
            .query(query)
            .bind(("name", name.map(|s| s.to_string())))
            .bind(("limit", limit))
            .bind(("offset", offset))
            .await?;

        let products: Vec<ProductRecord> = res.take(0)?;
        Ok(products)
    }

    /// Count products matching the optional exact-name filter.
    pub async fn count_products(db: &Surreal<Any>, name: Option<&str>) -> Result<u64> {
        let query = if name.is_some() {
            "SELECT count() AS count FROM product WHERE name = $name GROUP ALL"
        } else {
            "SELECT count() AS count FROM product GROUP ALL"
        };

        let mut res = db
            .query(query)
            .bind(("name", name.map(|s| s.to_string())))
            .await?;

        let row: Option<CountRow> = res.take(0)?;
        Ok(row.map(|r| r.count.max(0) as u64).unwrap_or(0))
    }

    /// Apply the non-`None` fields of `update` to the product, returning the
    /// updated record, or `None` when no product matched.
    pub async fn update_product(
        db: &Surreal<Any>,
        product_id: &str,
        update: &ProductUpdate,
    ) -> Result<Option<ProductRecord>> {
        let mut sets = Vec::new();
        if update.name.is_some() {
            sets.push("name = $name");
        }
        if update.category.is_some() {
            sets.push("category = $category");
        }
        if update.description.is_some() {
            sets.push("description = $description");
        }
        if update.unit_price.is_some() {
            sets.push("unit_price = $unit_price");
        }
        if update.low_stock.is_some() {
            sets.push("low_stock = $low_stock");
        }
        if update.status.is_some() {
            sets.push("status = $status");
        }

        if sets.is_empty() {
            return Self::find_product_by_id(db, product_id).await;
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE product SET {} WHERE product_id = $product_id",
            sets.join(", ")
        );

        let mut res = db
            .query(query)
            .bind(("product_id", product_id.to_string()))
            .bind(("name", update.name.clone()))
            .bind(("category", update.category.clone()))
            .bind(("description", update.description.clone()))
            .bind(("unit_price", update.unit_price))
            .bind(("low_stock", update.low_stock))
            .bind(("status", update.status.clone()))
            .await?;

        let updated: Option<ProductRecord> = res.take(0)?;
        Ok(updated)
    }

    /// Delete a product by public id. Returns true when a record was removed.
    pub async fn delete_product(db: &Surreal<Any>, product_id: &str) -> Result<bool> {
        let mut res = db
            .query("DELETE product WHERE product_id = $product_id RETURN BEFORE")
            .bind(("product_id", product_id.to_string()))
            .await?;

        let removed: Vec<ProductRecord> = res.take(0)?;
        Ok(!removed.is_empty())
    }
}
