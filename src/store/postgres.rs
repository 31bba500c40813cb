use async_trait::async_trait;
use sqlx::{Connection, PgConnection};

use super::{Connector, ReportStore};
use crate::models::{FinancialReport, NewReport};

// `SERIAL`/`TIMESTAMPTZ` columns are cast so they decode into i64/NaiveDateTime.
const LIST_REPORTS: &str = r#"
    SELECT id::BIGINT AS id, date, operation_type, amount, description, category,
        created_at::TIMESTAMP AS created_at
    FROM financial_reports
    ORDER BY date DESC, created_at DESC, id DESC
"#;

const INSERT_REPORT: &str = r#"
    INSERT INTO financial_reports (date, operation_type, amount, description, category)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id::BIGINT AS id, date, operation_type, amount, description, category,
        created_at::TIMESTAMP AS created_at
"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

#[async_trait]
impl Connector for PgConnector {
    type Store = PgReportStore;

    async fn connect(&self, database_url: &str) -> Result<PgReportStore, sqlx::Error> {
        let conn = PgConnection::connect(database_url).await?;
        Ok(PgReportStore { conn })
    }
}

pub struct PgReportStore {
    conn: PgConnection,
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn list(&mut self) -> Result<Vec<FinancialReport>, sqlx::Error> {
        sqlx::query_as::<_, FinancialReport>(LIST_REPORTS)
        .fetch_all(&mut self.conn)
        .await
    }

    async fn insert(&mut self, report: &NewReport) -> Result<FinancialReport, sqlx::Error> {
        sqlx::query_as::<_, FinancialReport>(INSERT_REPORT)
        .bind(report.date)
        .bind(&report.operation_type)
        .bind(&report.amount)
        .bind(&report.description)
        .bind(&report.category)
        .fetch_one(&mut self.conn)
        .await
    }

    async fn delete(&mut self, id: i64) -> Result<u64, sqlx::Error> {
        let res = sqlx::query("DELETE FROM financial_reports WHERE id = $1")
            .bind(id)
            .execute(&mut self.conn)
            .await?;
        Ok(res.rows_affected())
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returned_columns_decode_from_either_timestamp_type() {
        for sql in [LIST_REPORTS, INSERT_REPORT] {
            assert!(sql.contains("created_at::TIMESTAMP AS created_at"), "{sql}");
            assert!(sql.contains("id::BIGINT AS id"), "{sql}");
        }
    }
}
