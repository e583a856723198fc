//! Domain records and the derived financial state of a delivery

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Access level of a warehouse account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Owner,
    Employee,
}

/// Profile row of a warehouse account.
///
/// The email lives with the auth gateway, not the profile table; it is
/// filled in when the caller has it (session bootstrap, privileged listing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub email: Option<String>,
}

/// Payment completeness of a delivery, derived from its amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Paid,
    Partial,
    Due,
}

impl DeliveryStatus {
    /// Classify a delivery by its paid and total amounts: `Paid` when the
    /// total is covered, `Partial` when something but not everything has
    /// been paid, `Due` otherwise. Every status written to the backend goes
    /// through this one function.
    pub fn derive(amount_paid: f64, total_amount: f64) -> Self {
        if amount_paid >= total_amount {
            DeliveryStatus::Paid
        } else if amount_paid > 0.0 {
            DeliveryStatus::Partial
        } else {
            DeliveryStatus::Due
        }
    }
}

/// The invoice total: sacks at the unit price plus the driver fee and any
/// extra purchase made on the trip.
pub fn total_amount(
    sacks_delivered: u32,
    per_sack_price: f64,
    driver_fee: f64,
    extra_purchase_cost: f64,
) -> f64 {
    f64::from(sacks_delivered) * per_sack_price + driver_fee + extra_purchase_cost
}

/// Today's date in the warehouse's local timezone
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Truck and driver record, created alongside each delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub id: i64,
    pub truck_name: String,
    pub driver_name: String,
    pub license_number: String,
    pub contact_number: String,
}

/// Insert payload for a truck row
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTruck {
    pub truck_name: String,
    pub driver_name: String,
    pub license_number: String,
    pub contact_number: String,
}

/// A shipment with its financial state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: i64,
    pub truck_id: i64,
    pub sacks_delivered: u32,
    pub total_amount: f64,
    pub amount_paid: f64,
    #[serde(default)]
    pub driver_fee: f64,
    #[serde(default)]
    pub extra_purchase_cost: f64,
    #[serde(default)]
    pub extra_purchase_details: Option<String>,
    pub receiver_name: String,
    #[serde(default)]
    pub receiver_phone: String,
    #[serde(default)]
    pub receiver_address: String,
    pub status: DeliveryStatus,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,

    /// The truck row joined by the data API under its table name
    #[serde(rename = "trucks", default, skip_serializing_if = "Option::is_none")]
    pub truck: Option<Truck>,
}

impl Delivery {
    /// Outstanding balance; negative when the receiver has over-paid
    pub fn due_amount(&self) -> f64 {
        self.total_amount - self.amount_paid
    }

    /// Back-derive the unit price from the stored totals, for invoice
    /// rendering. Zero when no sacks were delivered.
    pub fn per_sack_price(&self) -> f64 {
        if self.sacks_delivered == 0 {
            return 0.0;
        }
        let sacks_total = self.total_amount - self.driver_fee - self.extra_purchase_cost;
        sacks_total / f64::from(self.sacks_delivered)
    }
}

/// Insert payload for a delivery row
#[derive(Debug, Clone, Serialize)]
pub struct NewDelivery {
    pub truck_id: i64,
    pub sacks_delivered: u32,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub driver_fee: f64,
    pub extra_purchase_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_purchase_details: Option<String>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub status: DeliveryStatus,
    pub delivery_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// An ad-hoc expense, unrelated to any delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub item_name: String,
    pub quantity: f64,
    pub cost: f64,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a purchase row
#[derive(Debug, Clone, Serialize)]
pub struct NewPurchase {
    pub item_name: String,
    pub quantity: f64,
    pub cost: f64,
    pub purchase_date: NaiveDate,
}

impl NewPurchase {
    /// A purchase dated today
    pub fn new(item_name: impl Into<String>, quantity: f64, cost: f64) -> Self {
        Self {
            item_name: item_name.into(),
            quantity,
            cost,
            purchase_date: today(),
        }
    }
}

/// Append-only record of a settlement against a delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub delivery_id: i64,
    pub payment_amount: f64,
    pub payment_date: NaiveDate,
}

/// Insert payload for a payment row
#[derive(Debug, Clone, Serialize)]
pub struct NewPayment {
    pub delivery_id: i64,
    pub payment_amount: f64,
    pub payment_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_amount_is_sacks_times_price_plus_fees() {
        assert_eq!(total_amount(0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(total_amount(10, 500.0, 100.0, 0.0), 5100.0);
        assert_eq!(total_amount(3, 250.5, 0.0, 49.5), 801.0);
        assert_eq!(total_amount(7, 0.0, 20.0, 5.0), 25.0);
    }

    #[test]
    fn status_trichotomy() {
        assert_eq!(DeliveryStatus::derive(0.0, 100.0), DeliveryStatus::Due);
        assert_eq!(DeliveryStatus::derive(50.0, 100.0), DeliveryStatus::Partial);
        assert_eq!(DeliveryStatus::derive(100.0, 100.0), DeliveryStatus::Paid);
        // Over-payment is not clamped; the status stays paid.
        assert_eq!(DeliveryStatus::derive(150.0, 100.0), DeliveryStatus::Paid);
        // A zero-value delivery is trivially settled.
        assert_eq!(DeliveryStatus::derive(0.0, 0.0), DeliveryStatus::Paid);
    }

    #[test]
    fn status_serializes_as_lowercase_text() {
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::Partial).unwrap(),
            "\"partial\""
        );
        assert_eq!(
            serde_json::from_str::<DeliveryStatus>("\"due\"").unwrap(),
            DeliveryStatus::Due
        );
    }

    fn delivery(total: f64, paid: f64) -> Delivery {
        Delivery {
            id: 1,
            truck_id: 1,
            sacks_delivered: 10,
            total_amount: total,
            amount_paid: paid,
            driver_fee: 100.0,
            extra_purchase_cost: 0.0,
            extra_purchase_details: None,
            receiver_name: "Receiver".to_string(),
            receiver_phone: String::new(),
            receiver_address: String::new(),
            status: DeliveryStatus::derive(paid, total),
            delivery_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            created_at: None,
            created_by: None,
            truck: None,
        }
    }

    #[test]
    fn due_amount_can_go_negative() {
        assert_eq!(delivery(5100.0, 0.0).due_amount(), 5100.0);
        assert_eq!(delivery(5100.0, 5200.0).due_amount(), -100.0);
    }

    #[test]
    fn per_sack_price_excludes_fees() {
        // 10 sacks at 500 plus a 100 driver fee.
        assert_eq!(delivery(5100.0, 0.0).per_sack_price(), 500.0);

        let mut empty = delivery(100.0, 0.0);
        empty.sacks_delivered = 0;
        assert_eq!(empty.per_sack_price(), 0.0);
    }
}
