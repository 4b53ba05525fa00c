//! Reporting actions.
//!
//! Two read-only aggregations for dashboard display: the current calendar
//! month's sales list, and a year-over-year monthly revenue overview built
//! from the MONTH aggregate buckets.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use caravel_core::period;
use caravel_db::repository::sale::SaleWithContext;

use crate::actions::Actions;
use crate::error::ActionError;
use crate::safe_action::ActionState;
use crate::session::OrgSession;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// =============================================================================
// Payloads
// =============================================================================

/// One labelled point of the overview series.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRevenue {
    pub month: String,
    pub revenue_cents: i64,
}

/// Year-over-year monthly revenue, twelve points per year with missing
/// months at zero.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOverview {
    pub current_year: Vec<MonthRevenue>,
    pub previous_year: Vec<MonthRevenue>,
}

// =============================================================================
// Actions
// =============================================================================

impl Actions {
    /// The calling organization's sales within the current calendar month,
    /// newest first, joined with product and organization names.
    pub async fn monthly_sales(
        &self,
        caller: Option<&OrgSession>,
    ) -> ActionState<Vec<SaleWithContext>> {
        self.monthly_sales_at(caller, Utc::now()).await
    }

    /// Like [`monthly_sales`](Self::monthly_sales) with an explicit "now",
    /// for deterministic reporting windows.
    pub async fn monthly_sales_at(
        &self,
        caller: Option<&OrgSession>,
        now: DateTime<Utc>,
    ) -> ActionState<Vec<SaleWithContext>> {
        ActionState::from_result(async {
            let session = Self::require_session(caller)?;
            let month = period::month_bounds(now);

            let sales = self
                .db()
                .sales()
                .list_for_period(&session.org_id, month.start, month.end)
                .await
                .map_err(|e| ActionError::internal("Failed to fetch monthly sales", e))?;
            Ok(sales)
        }
        .await)
    }

    /// Year-over-year monthly revenue overview for the calling
    /// organization.
    pub async fn sales_overview(&self, caller: Option<&OrgSession>) -> ActionState<SalesOverview> {
        self.sales_overview_at(caller, Utc::now()).await
    }

    /// Like [`sales_overview`](Self::sales_overview) with an explicit
    /// "now".
    pub async fn sales_overview_at(
        &self,
        caller: Option<&OrgSession>,
        now: DateTime<Utc>,
    ) -> ActionState<SalesOverview> {
        ActionState::from_result(async {
            let session = Self::require_session(caller)?;
            let current_year = now.year();

            let current = self.year_series(&session.org_id, current_year).await?;
            let previous = self.year_series(&session.org_id, current_year - 1).await?;

            Ok(SalesOverview {
                current_year: current,
                previous_year: previous,
            })
        }
        .await)
    }

    /// Twelve month-labelled revenue points for one calendar year.
    async fn year_series(
        &self,
        organization_id: &str,
        year: i32,
    ) -> Result<Vec<MonthRevenue>, ActionError> {
        let rows = self
            .db()
            .sales()
            .monthly_revenue(organization_id, year_start(year), year_start(year + 1))
            .await
            .map_err(|e| ActionError::internal("Failed to fetch sales data", e))?;

        let series = MONTHS
            .iter()
            .enumerate()
            .map(|(idx, month)| {
                let revenue_cents = rows
                    .iter()
                    .find(|row| row.period_start.month0() as usize == idx)
                    .map(|row| row.revenue_cents)
                    .unwrap_or(0);
                MonthRevenue {
                    month: month.to_string(),
                    revenue_cents,
                }
            })
            .collect();

        Ok(series)
    }
}

/// Midnight of January 1st, UTC.
fn year_start(year: i32) -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(year, 1, 1).expect("january 1st is always a valid date");
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

// =============================================================================
// Unit Tests
// =============================================================================
