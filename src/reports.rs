//! Fixed-window reporting over the deliveries table

use chrono::{Datelike, Duration, NaiveDate};

use crate::auth::SessionContext;
use crate::error::Error;
use crate::models::{self, Delivery};
use crate::Warehouse;

/// Reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// Deliveries dated today
    Daily,

    /// Deliveries within the current calendar month
    Monthly,
}

impl ReportWindow {
    /// The inclusive date range of this window relative to `today`
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            ReportWindow::Daily => (today, today),
            ReportWindow::Monthly => (first_of_month(today), last_of_month(today)),
        }
    }
}

/// First day of the month `date` falls in
pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month `date` falls in
pub(crate) fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next_first| next_first - Duration::days(1))
        .unwrap_or(date)
}

/// Report queries
pub struct Reports<'a> {
    client: &'a Warehouse,
}

impl<'a> Reports<'a> {
    pub(crate) fn new(client: &'a Warehouse) -> Self {
        Self { client }
    }

    /// The rows of a report: deliveries within the window, trucks joined,
    /// newest delivery date first
    pub async fn rows(
        &self,
        ctx: &SessionContext,
        window: ReportWindow,
    ) -> Result<Vec<Delivery>, Error> {
        let (start, end) = window.range(models::today());

        let mut query = self
            .client
            .from("deliveries")
            .with_auth(ctx.access_token())
            .select("*,trucks(*)");
        query
            .gte("delivery_date", start)
            .lte("delivery_date", end)
            .order("delivery_date", false);

        query.execute().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn daily_window_is_a_single_day() {
        let today = date(2024, 1, 15);
        assert_eq!(ReportWindow::Daily.range(today), (today, today));
    }

    #[test]
    fn monthly_window_spans_the_calendar_month() {
        assert_eq!(
            ReportWindow::Monthly.range(date(2024, 1, 15)),
            (date(2024, 1, 1), date(2024, 1, 31))
        );
    }

    #[test]
    fn monthly_window_handles_leap_february() {
        assert_eq!(
            ReportWindow::Monthly.range(date(2024, 2, 10)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            ReportWindow::Monthly.range(date(2023, 2, 10)),
            (date(2023, 2, 1), date(2023, 2, 28))
        );
    }

    #[test]
    fn monthly_window_handles_december() {
        assert_eq!(
            ReportWindow::Monthly.range(date(2024, 12, 31)),
            (date(2024, 12, 1), date(2024, 12, 31))
        );
    }
}
