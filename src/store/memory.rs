//! An in-memory table that mimics the Postgres store, with connection
//! accounting for lifecycle assertions in tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use super::{Connector, ReportStore};
use crate::models::{FinancialReport, NewReport};

#[derive(Debug)]
pub struct Table {
    pub rows: Vec<FinancialReport>,
    pub opened: usize,
    pub closed: usize,
    pub statements: usize,
    pub fail_connect: bool,
    pub fail_queries: bool,
    next_id: i64,
    clock: NaiveDateTime,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            opened: 0,
            closed: 0,
            statements: 0,
            fail_connect: false,
            fail_queries: false,
            next_id: 1,
            clock: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(9, 0, 0))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    table: Arc<Mutex<Table>>,
}

impl MemoryConnector {
    pub fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Store = MemoryStore;

    async fn connect(&self, _database_url: &str) -> Result<MemoryStore, sqlx::Error> {
        let mut t = self.table();
        if t.fail_connect {
            return Err(sqlx::Error::Protocol("connection refused".to_string()));
        }
        t.opened += 1;
        Ok(MemoryStore {
            table: self.table.clone(),
        })
    }
}

pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
}

impl MemoryStore {
    fn statement(&self) -> Result<MutexGuard<'_, Table>, sqlx::Error> {
        let mut t = self.table.lock().unwrap();
        t.statements += 1;
        if t.fail_queries {
            return Err(sqlx::Error::Protocol("relation does not exist".to_string()));
        }
        Ok(t)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn list(&mut self) -> Result<Vec<FinancialReport>, sqlx::Error> {
        let t = self.statement()?;
        let mut rows = t.rows.clone();
        rows.sort_by(|a, b| {
            (b.date, b.created_at, b.id).cmp(&(a.date, a.created_at, a.id))
        });
        Ok(rows)
    }

    async fn insert(&mut self, report: &NewReport) -> Result<FinancialReport, sqlx::Error> {
        let mut t = self.statement()?;
        t.clock += TimeDelta::seconds(1);
        let row = FinancialReport {
            id: t.next_id,
            date: report.date,
            operation_type: report.operation_type.clone(),
            amount: report.amount.clone(),
            description: Some(report.description.clone()),
            category: Some(report.category.clone()),
            created_at: t.clock,
        };
        t.next_id += 1;
        t.rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&mut self, id: i64) -> Result<u64, sqlx::Error> {
        let mut t = self.statement()?;
        let before = t.rows.len();
        t.rows.retain(|r| r.id != id);
        Ok((before - t.rows.len()) as u64)
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.table.lock().unwrap().closed += 1;
        Ok(())
    }
}
