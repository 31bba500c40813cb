use bigdecimal::ToPrimitive;
use chrono::Timelike;
use serde::Serialize;
use sqlx::types::{
    chrono::{NaiveDate, NaiveDateTime},
    BigDecimal,
};

/// A row of the `financial_reports` table.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct FinancialReport {
    pub id: i64,
    pub date: NaiveDate,
    pub operation_type: String,
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Validated values for a row that is about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub date: NaiveDate,
    pub operation_type: String,
    pub amount: BigDecimal,
    pub description: String,
    pub category: String,
}

/// The JSON shape of a report as seen by clients.
///
/// Dates and timestamps are ISO 8601 text and the amount is a plain number,
/// so no database-native representation leaks into the response.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReportView {
    pub id: i64,
    pub date: String,
    pub operation_type: String,
    pub amount: f64,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: String,
}

impl From<FinancialReport> for ReportView {
    fn from(r: FinancialReport) -> Self {
        Self {
            id: r.id,
            date: format_date(&r.date),
            operation_type: r.operation_type,
            amount: r.amount.to_f64().unwrap_or_default(),
            description: r.description,
            category: r.category,
            created_at: format_timestamp(&r.created_at),
        }
    }
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Fractional seconds are written as microseconds, and only when non-zero.
pub fn format_timestamp(t: &NaiveDateTime) -> String {
    if t.nanosecond() == 0 {
        t.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

#[derive(Serialize)]
pub struct ReportList {
    pub reports: Vec<ReportView>,
}

#[derive(Serialize)]
pub struct CreatedReport {
    pub report: ReportView,
}

#[derive(Serialize)]
pub struct DeleteOutcome {
    pub success: bool,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn report() -> FinancialReport {
        FinancialReport {
            id: 7,
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            operation_type: "expense".to_string(),
            amount: BigDecimal::from_str("1250.50").unwrap(),
            description: Some("rent".to_string()),
            category: None,
            created_at: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
        }
    }

    #[test]
    fn view_normalizes_dates_and_amount() {
        let view = ReportView::from(report());

        assert_eq!(view.date, "2024-03-09");
        assert_eq!(view.created_at, "2024-03-09T14:05:00");
        assert_eq!(view.amount, 1250.5);
        assert_eq!(view.category, None);
    }

    #[test]
    fn timestamp_keeps_microseconds() {
        let t = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_micro_opt(8, 30, 1, 123456)
            .unwrap();

        assert_eq!(format_timestamp(&t), "2024-01-01T08:30:01.123456");
    }

    #[test]
    fn timestamp_pads_milliseconds_to_six_digits() {
        let t = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(8, 30, 1, 120)
            .unwrap();

        assert_eq!(format_timestamp(&t), "2024-01-01T08:30:01.120000");
    }

    #[test]
    fn view_serializes_amount_as_number() {
        let json = serde_json::to_value(ReportView::from(report())).unwrap();

        assert!(json["amount"].is_f64());
        assert_eq!(json["description"], "rent");
        assert!(json["category"].is_null());
    }
}
