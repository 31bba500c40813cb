pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::models::{FinancialReport, NewReport};

/// Opens one store connection per invocation.
#[async_trait]
pub trait Connector: Send + Sync {
    type Store: ReportStore;

    async fn connect(&self, database_url: &str) -> Result<Self::Store, sqlx::Error>;
}

/// A single open connection to the `financial_reports` table.
#[async_trait]
pub trait ReportStore: Send {
    /// All reports, newest date first, later insertions first within a date.
    async fn list(&mut self) -> Result<Vec<FinancialReport>, sqlx::Error>;

    async fn insert(&mut self, report: &NewReport) -> Result<FinancialReport, sqlx::Error>;

    /// Returns the number of deleted rows.
    async fn delete(&mut self, id: i64) -> Result<u64, sqlx::Error>;

    async fn close(self) -> Result<(), sqlx::Error>;
}
