//! Dashboard rollups computed client-side over the full deliveries set
//!
//! The backend exposes no aggregation endpoints, so the dashboard fetches
//! every delivery once and derives its figures locally. The derivations are
//! pure functions of the rows and an explicit `today`, which keeps them
//! independently testable.

use chrono::{Datelike, NaiveDate};

use crate::auth::SessionContext;
use crate::error::Error;
use crate::models::{Delivery, DeliveryStatus};
use crate::reports::first_of_month;
use crate::Warehouse;

/// Number of months shown in the monthly histogram
pub const HISTOGRAM_MONTHS: u32 = 6;

/// Number of rows in the recent-deliveries preview
pub const RECENT_COUNT: usize = 5;

/// Headline figures
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Deliveries dated today
    pub today_deliveries: usize,

    /// Deliveries dated on or after the first of the current month
    pub month_deliveries: usize,

    /// Outstanding balance across all due and partially paid deliveries
    pub total_due: f64,
}

/// One calendar-month bucket of the histogram
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub year: i32,

    /// 1-based calendar month
    pub month: u32,

    /// Short month name, e.g. `Jan`
    pub label: String,

    /// Sum of `total_amount` over deliveries dated in this month
    pub total_amount: f64,
}

/// Status counts for the pie chart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub paid: usize,
    pub due: usize,
    pub partial: usize,
}

/// Everything the dashboard shows
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub monthly: Vec<MonthBucket>,
    pub statuses: StatusBreakdown,
    pub recent: Vec<Delivery>,
}

/// Headline figures for the given rows
pub fn stats(deliveries: &[Delivery], today: NaiveDate) -> DashboardStats {
    let month_start = first_of_month(today);

    let today_deliveries = deliveries
        .iter()
        .filter(|d| d.delivery_date == today)
        .count();
    let month_deliveries = deliveries
        .iter()
        .filter(|d| d.delivery_date >= month_start)
        .count();
    let total_due = deliveries
        .iter()
        .filter(|d| matches!(d.status, DeliveryStatus::Due | DeliveryStatus::Partial))
        .map(Delivery::due_amount)
        .sum();

    DashboardStats {
        today_deliveries,
        month_deliveries,
        total_due,
    }
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn months_back(date: NaiveDate, back: u32) -> (i32, u32) {
    let total = date.year() * 12 + date.month() as i32 - 1 - back as i32;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

/// Six calendar-month totals, oldest first, ending at the month of `today`.
/// Deliveries dated outside the window contribute nothing.
pub fn monthly_totals(deliveries: &[Delivery], today: NaiveDate) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = (0..HISTOGRAM_MONTHS)
        .rev()
        .map(|back| {
            let (year, month) = months_back(today, back);
            MonthBucket {
                year,
                month,
                label: MONTH_LABELS[(month - 1) as usize].to_string(),
                total_amount: 0.0,
            }
        })
        .collect();

    for delivery in deliveries {
        let year = delivery.delivery_date.year();
        let month = delivery.delivery_date.month();
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.year == year && b.month == month)
        {
            bucket.total_amount += delivery.total_amount;
        }
    }

    buckets
}

/// Paid/due/partial counts for the given rows
pub fn status_breakdown(deliveries: &[Delivery]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();
    for delivery in deliveries {
        match delivery.status {
            DeliveryStatus::Paid => breakdown.paid += 1,
            DeliveryStatus::Due => breakdown.due += 1,
            DeliveryStatus::Partial => breakdown.partial += 1,
        }
    }
    breakdown
}

/// The `count` most recently created deliveries; rows without a creation
/// timestamp sort last
pub fn recent(deliveries: &[Delivery], count: usize) -> Vec<Delivery> {
    let mut sorted: Vec<Delivery> = deliveries.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(count);
    sorted
}

/// Dashboard assembly
pub struct Dashboard<'a> {
    client: &'a Warehouse,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(client: &'a Warehouse) -> Self {
        Self { client }
    }

    /// Fetch every delivery and derive the dashboard figures
    pub async fn snapshot(&self, ctx: &SessionContext) -> Result<DashboardSnapshot, Error> {
        let deliveries: Vec<Delivery> = self
            .client
            .from("deliveries")
            .with_auth(ctx.access_token())
            .select("*,trucks(*)")
            .execute()
            .await?;

        let today = crate::models::today();
        Ok(DashboardSnapshot {
            stats: stats(&deliveries, today),
            monthly: monthly_totals(&deliveries, today),
            statuses: status_breakdown(&deliveries),
            recent: recent(&deliveries, RECENT_COUNT),
        })
    }
}
