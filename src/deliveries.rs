//! Delivery lifecycle: creation, partial payments and filtered listing

use std::fmt;

use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

use crate::auth::SessionContext;
use crate::error::Error;
use crate::models::{
    self, Delivery, DeliveryStatus, NewDelivery, NewPayment, NewTruck, Truck,
};
use crate::Warehouse;

/// User-entered input for a new delivery.
///
/// The total is never stored on the draft; it is recomputed from the current
/// inputs every time it is asked for, so the figure shown while the form is
/// edited and the figure persisted are the same expression.
#[derive(Debug, Clone)]
pub struct DeliveryDraft {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub truck: NewTruck,
    pub sacks_delivered: u32,
    pub per_sack_price: f64,
    pub driver_fee: f64,
    pub extra_purchase_cost: f64,
    pub extra_purchase_details: Option<String>,
    pub amount_paid: f64,
    pub delivery_date: NaiveDate,
}

impl DeliveryDraft {
    /// Start a draft for the given receiver and truck, dated today
    pub fn new(receiver_name: impl Into<String>, truck: NewTruck) -> Self {
        Self {
            receiver_name: receiver_name.into(),
            receiver_phone: String::new(),
            receiver_address: String::new(),
            truck,
            sacks_delivered: 0,
            per_sack_price: 0.0,
            driver_fee: 0.0,
            extra_purchase_cost: 0.0,
            extra_purchase_details: None,
            amount_paid: 0.0,
            delivery_date: models::today(),
        }
    }

    /// The live total for the current inputs
    pub fn total_amount(&self) -> f64 {
        models::total_amount(
            self.sacks_delivered,
            self.per_sack_price,
            self.driver_fee,
            self.extra_purchase_cost,
        )
    }

    /// The status the delivery will be created with
    pub fn status(&self) -> DeliveryStatus {
        DeliveryStatus::derive(self.amount_paid, self.total_amount())
    }
}

/// Failure modes of the two-step delivery creation.
///
/// The truck and delivery rows are written in two requests with no
/// transaction around them, so the error spells out how far the write got
/// and whether the compensating truck delete ran.
#[derive(Debug, thiserror::Error)]
pub enum CreateDeliveryError {
    /// The truck insert failed; nothing was written
    #[error("truck insert failed: {0}")]
    Truck(#[source] Error),

    /// The delivery insert failed after the truck row was created. When
    /// `compensated` is true the truck row was deleted again; otherwise it
    /// remains orphaned and carries the reported id.
    #[error("delivery insert failed after creating truck {truck_id}: {source}")]
    Delivery {
        truck_id: i64,
        compensated: bool,
        #[source]
        source: Error,
    },
}

/// Filter for the delivery listing
#[derive(Debug, Clone, Default)]
pub struct DeliveryFilter {
    /// Case-insensitive substring of the receiver name
    pub search: Option<String>,

    /// Inclusive lower bound on the delivery date
    pub from: Option<NaiveDate>,

    /// Inclusive upper bound on the delivery date
    pub to: Option<NaiveDate>,
}

#[derive(Serialize)]
struct PaymentPatch {
    amount_paid: f64,
    status: DeliveryStatus,
}

/// Delivery operations
pub struct Deliveries<'a> {
    client: &'a Warehouse,
}

impl<'a> Deliveries<'a> {
    pub(crate) fn new(client: &'a Warehouse) -> Self {
        Self { client }
    }

    /// Create a delivery and its truck.
    ///
    /// Two writes run in order: the truck row first, then the delivery row
    /// referencing it. If the second write fails the truck row is deleted
    /// again; see [`CreateDeliveryError`] for how the outcomes are reported.
    pub async fn create(
        &self,
        ctx: &SessionContext,
        draft: &DeliveryDraft,
    ) -> Result<Delivery, CreateDeliveryError> {
        let token = ctx.access_token();

        let truck: Truck = self
            .client
            .from("trucks")
            .with_auth(token)
            .insert(&draft.truck)
            .execute_one()
            .await
            .map_err(CreateDeliveryError::Truck)?;

        let record = NewDelivery {
            truck_id: truck.id,
            sacks_delivered: draft.sacks_delivered,
            total_amount: draft.total_amount(),
            amount_paid: draft.amount_paid,
            driver_fee: draft.driver_fee,
            extra_purchase_cost: draft.extra_purchase_cost,
            extra_purchase_details: draft.extra_purchase_details.clone(),
            receiver_name: draft.receiver_name.clone(),
            receiver_phone: draft.receiver_phone.clone(),
            receiver_address: draft.receiver_address.clone(),
            status: draft.status(),
            delivery_date: draft.delivery_date,
            created_by: Some(ctx.user_id().to_string()),
        };

        match self
            .client
            .from("deliveries")
            .with_auth(token)
            .insert(&record)
            .execute_one::<Delivery>()
            .await
        {
            Ok(mut created) => {
                info!(
                    "created delivery {} for {} ({} sacks, total {})",
                    created.id, created.receiver_name, created.sacks_delivered, created.total_amount
                );
                created.truck = Some(truck);
                Ok(created)
            }
            Err(source) => {
                warn!(
                    "delivery insert failed, deleting truck {}: {}",
                    truck.id, source
                );
                let compensated = self
                    .client
                    .from("trucks")
                    .with_auth(token)
                    .delete()
                    .eq("id", truck.id)
                    .execute_no_return()
                    .await
                    .is_ok();
                if !compensated {
                    warn!("truck {} left orphaned after failed compensation", truck.id);
                }
                Err(CreateDeliveryError::Delivery {
                    truck_id: truck.id,
                    compensated,
                    source,
                })
            }
        }
    }

    /// Record a settlement against a delivery.
    ///
    /// The paid amount grows by `amount`, the status is re-derived at the
    /// new figure, and an append-only payment row is written. Over-payment
    /// is allowed; the amount itself must be positive. If the payment append
    /// fails the delivery row has already been updated, and the error says
    /// so; the append can be retried without re-applying the amount.
    pub async fn record_payment(
        &self,
        ctx: &SessionContext,
        delivery: &Delivery,
        amount: f64,
    ) -> Result<Delivery, Error> {
        if amount <= 0.0 {
            return Err(Error::invalid_input("payment amount must be positive"));
        }

        let token = ctx.access_token();
        let new_amount_paid = delivery.amount_paid + amount;
        let patch = PaymentPatch {
            amount_paid: new_amount_paid,
            status: DeliveryStatus::derive(new_amount_paid, delivery.total_amount),
        };

        let mut update = self.client.from("deliveries").with_auth(token).update(&patch);
        update.eq("id", delivery.id);
        let mut updated: Delivery = update.execute_one().await?;
        updated.truck = delivery.truck.clone();

        let payment = NewPayment {
            delivery_id: delivery.id,
            payment_amount: amount,
            payment_date: models::today(),
        };
        self.client
            .from("payments")
            .with_auth(token)
            .insert(&payment)
            .execute_no_return()
            .await
            .map_err(|source| {
                Error::database(format!(
                    "delivery {} updated but payment append failed: {}",
                    delivery.id, source
                ))
            })?;

        info!(
            "recorded payment of {} on delivery {}, now {:?}",
            amount, delivery.id, updated.status
        );
        Ok(updated)
    }

    /// List deliveries with their trucks, newest delivery date first
    pub async fn list(
        &self,
        ctx: &SessionContext,
        filter: &DeliveryFilter,
    ) -> Result<Vec<Delivery>, Error> {
        let mut query = self
            .client
            .from("deliveries")
            .with_auth(ctx.access_token())
            .select("*,trucks(*)");

        if let Some(term) = filter.search.as_deref() {
            query.ilike("receiver_name", &format!("%{}%", term));
        }
        if let Some(from) = filter.from {
            query.gte("delivery_date", from);
        }
        if let Some(to) = filter.to {
            query.lte("delivery_date", to);
        }
        query.order("delivery_date", false);

        query.execute().await
    }
}

/// One billable line of an invoice
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

/// Printable view of a created delivery
#[derive(Debug, Clone)]
pub struct Invoice {
    pub delivery_id: i64,
    pub delivery_date: NaiveDate,
    pub receiver_name: String,
    pub receiver_address: String,
    pub receiver_phone: String,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: f64,
    pub amount_paid: f64,
    pub amount_due: f64,
}

impl Invoice {
    /// Build the invoice view of a delivery. Fee and extra-purchase lines
    /// appear only when they carry a cost.
    pub fn from_delivery(delivery: &Delivery) -> Self {
        let unit_price = delivery.per_sack_price();
        let sacks = f64::from(delivery.sacks_delivered);

        let sacks_description = match delivery.truck.as_ref() {
            Some(truck) => format!("Sacks delivered (driver: {})", truck.driver_name),
            None => "Sacks delivered".to_string(),
        };
        let mut lines = vec![InvoiceLine {
            description: sacks_description,
            quantity: sacks,
            unit_price,
            amount: sacks * unit_price,
        }];

        if delivery.driver_fee > 0.0 {
            lines.push(InvoiceLine {
                description: "Driver fee".to_string(),
                quantity: 1.0,
                unit_price: delivery.driver_fee,
                amount: delivery.driver_fee,
            });
        }
        if delivery.extra_purchase_cost > 0.0 {
            let details = delivery
                .extra_purchase_details
                .as_deref()
                .unwrap_or("unspecified");
            lines.push(InvoiceLine {
                description: format!("Extra purchase: {}", details),
                quantity: 1.0,
                unit_price: delivery.extra_purchase_cost,
                amount: delivery.extra_purchase_cost,
            });
        }

        Self {
            delivery_id: delivery.id,
            delivery_date: delivery.delivery_date,
            receiver_name: delivery.receiver_name.clone(),
            receiver_address: delivery.receiver_address.clone(),
            receiver_phone: delivery.receiver_phone.clone(),
            lines,
            subtotal: delivery.total_amount,
            amount_paid: delivery.amount_paid,
            amount_due: delivery.due_amount(),
        }
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Invoice #{}", self.delivery_id)?;
        writeln!(f, "Date: {}", self.delivery_date)?;
        writeln!(f, "Billed to: {}", self.receiver_name)?;
        if !self.receiver_address.is_empty() {
            writeln!(f, "           {}", self.receiver_address)?;
        }
        if !self.receiver_phone.is_empty() {
            writeln!(f, "           {}", self.receiver_phone)?;
        }
        writeln!(f)?;
        for line in &self.lines {
            writeln!(
                f,
                "{:<40} {:>8.2} x {:>10.2} = {:>12.2}",
                line.description, line.quantity, line.unit_price, line.amount
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:<40} {:>12.2}", "Subtotal", self.subtotal)?;
        writeln!(f, "{:<40} {:>12.2}", "Amount paid", self.amount_paid)?;
        write!(f, "{:<40} {:>12.2}", "Amount due", self.amount_due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> DeliveryDraft {
        let mut draft = DeliveryDraft::new(
            "Karim Traders",
            NewTruck {
                truck_name: "DH-11".to_string(),
                driver_name: "Rafiq".to_string(),
                license_number: "DH-METRO-1234".to_string(),
                contact_number: "01700000000".to_string(),
            },
        );
        draft.sacks_delivered = 10;
        draft.per_sack_price = 500.0;
        draft.driver_fee = 100.0;
        draft
    }

    #[test]
    fn draft_total_tracks_inputs() {
        let mut draft = draft();
        assert_eq!(draft.total_amount(), 5100.0);
        assert_eq!(draft.status(), DeliveryStatus::Due);

        draft.extra_purchase_cost = 250.0;
        assert_eq!(draft.total_amount(), 5350.0);

        draft.amount_paid = 5350.0;
        assert_eq!(draft.status(), DeliveryStatus::Paid);
    }

    fn delivery() -> Delivery {
        Delivery {
            id: 7,
            truck_id: 3,
            sacks_delivered: 10,
            total_amount: 5100.0,
            amount_paid: 1000.0,
            driver_fee: 100.0,
            extra_purchase_cost: 0.0,
            extra_purchase_details: None,
            receiver_name: "Karim Traders".to_string(),
            receiver_phone: "01700000000".to_string(),
            receiver_address: "Bogura".to_string(),
            status: DeliveryStatus::Partial,
            delivery_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            created_at: None,
            created_by: None,
            truck: Some(Truck {
                id: 3,
                truck_name: "DH-11".to_string(),
                driver_name: "Rafiq".to_string(),
                license_number: "DH-METRO-1234".to_string(),
                contact_number: "01700000000".to_string(),
            }),
        }
    }

    #[test]
    fn invoice_skips_zero_cost_lines() {
        let invoice = Invoice::from_delivery(&delivery());
        assert_eq!(invoice.lines.len(), 2);
        assert_eq!(
            invoice.lines[0].description,
            "Sacks delivered (driver: Rafiq)"
        );
        assert_eq!(invoice.lines[0].unit_price, 500.0);
        assert_eq!(invoice.lines[0].amount, 5000.0);
        assert_eq!(invoice.lines[1].description, "Driver fee");
        assert_eq!(invoice.amount_due, 4100.0);
    }

    #[test]
    fn invoice_includes_extra_purchase_with_details() {
        let mut delivery = delivery();
        delivery.extra_purchase_cost = 300.0;
        delivery.extra_purchase_details = Some("rope and tarpaulin".to_string());
        delivery.total_amount += 300.0;

        let invoice = Invoice::from_delivery(&delivery);
        assert_eq!(invoice.lines.len(), 3);
        assert_eq!(
            invoice.lines[2].description,
            "Extra purchase: rope and tarpaulin"
        );

        let rendered = invoice.to_string();
        assert!(rendered.contains("Invoice #7"));
        assert!(rendered.contains("Karim Traders"));
        assert!(rendered.contains("Amount due"));
    }
}
