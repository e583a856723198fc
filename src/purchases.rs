//! Append-only ledger of ad-hoc expenses

use log::info;

use crate::auth::SessionContext;
use crate::error::Error;
use crate::models::{NewPurchase, Purchase};
use crate::Warehouse;

/// Purchase ledger operations
pub struct Purchases<'a> {
    client: &'a Warehouse,
}

impl<'a> Purchases<'a> {
    pub(crate) fn new(client: &'a Warehouse) -> Self {
        Self { client }
    }

    /// Append an expense and return the created row
    pub async fn add(
        &self,
        ctx: &SessionContext,
        purchase: &NewPurchase,
    ) -> Result<Purchase, Error> {
        let created: Purchase = self
            .client
            .from("purchases")
            .with_auth(ctx.access_token())
            .insert(purchase)
            .execute_one()
            .await?;

        info!(
            "recorded purchase {} ({} x {})",
            created.id, created.item_name, created.quantity
        );
        Ok(created)
    }

    /// List expenses, newest purchase date first, optionally filtered by a
    /// case-insensitive substring of the item name
    pub async fn list(
        &self,
        ctx: &SessionContext,
        search: Option<&str>,
    ) -> Result<Vec<Purchase>, Error> {
        let mut query = self
            .client
            .from("purchases")
            .with_auth(ctx.access_token())
            .select("*");

        if let Some(term) = search {
            query.ilike("item_name", &format!("%{}%", term));
        }
        query.order("purchase_date", false);

        query.execute().await
    }
}
