//! Turns one invocation into at most one statement against the
//! `financial_reports` table and one response envelope.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use sqlx::types::BigDecimal;

use crate::{
    config::DatabaseUrl,
    envelope::{Envelope, Invocation, InvocationContext},
    error::ReportError,
    models::{CreatedReport, DeleteOutcome, NewReport, ReportList, ReportView},
    store::{Connector, ReportStore},
};

#[derive(Deserialize, Debug, Default)]
pub struct CreateReportRequest {
    pub date: Option<Value>,
    pub operation_type: Option<Value>,
    pub amount: Option<Value>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// `null`, `false`, zero, `""`, `[]` and `{}` all count as "not provided".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn provided(field: &Option<Value>) -> Option<&Value> {
    field.as_ref().filter(|v| !is_falsy(v))
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

/// Clients send the amount either as a JSON number or as numeric text.
fn parse_amount(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

impl CreateReportRequest {
    pub fn parse(body: &str) -> Result<Self, ReportError> {
        serde_json::from_str(body).map_err(|err| ReportError::InvalidBody(err.to_string()))
    }

    /// Required fields that are missing or falsy are all rejected the same
    /// way, before any value is coerced.
    pub fn validate(self) -> Result<NewReport, ReportError> {
        let (Some(date), Some(operation_type), Some(amount)) = (
            provided(&self.date),
            provided(&self.operation_type),
            provided(&self.amount),
        ) else {
            return Err(ReportError::MissingFields);
        };

        let date = parse_date(date).ok_or_else(|| {
            ReportError::InvalidBody(format!("date must be YYYY-MM-DD, got {date}"))
        })?;
        let operation_type = operation_type.as_str().ok_or_else(|| {
            ReportError::InvalidBody(format!("operation_type must be text, got {operation_type}"))
        })?;
        let amount = parse_amount(amount).ok_or_else(|| {
            ReportError::InvalidBody(format!("amount must be a number, got {amount}"))
        })?;

        Ok(NewReport {
            date,
            operation_type: operation_type.to_string(),
            amount,
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Create,
    Delete,
}

impl Operation {
    fn from_method(method: &str) -> Result<Self, ReportError> {
        match method {
            "GET" => Ok(Operation::List),
            "POST" => Ok(Operation::Create),
            "DELETE" => Ok(Operation::Delete),
            other => Err(ReportError::MethodNotAllowed(other.to_string())),
        }
    }

    async fn run<S: ReportStore>(
        self,
        event: &Invocation,
        store: &mut S,
    ) -> Result<Envelope, ReportError> {
        match self {
            Operation::List => {
                let reports: Vec<ReportView> =
                    store.list().await?.into_iter().map(ReportView::from).collect();
                log::debug!("listed {} reports", reports.len());
                Ok(Envelope::json(200, &ReportList { reports }))
            }
            Operation::Create => {
                let report = CreateReportRequest::parse(event.body_or_empty_object())?.validate()?;
                let created = store.insert(&report).await?;
                log::info!("created report {}", created.id);
                Ok(Envelope::json(
                    201,
                    &CreatedReport {
                        report: created.into(),
                    },
                ))
            }
            Operation::Delete => {
                let raw = event
                    .query_param("id")
                    .filter(|id| !id.is_empty())
                    .ok_or(ReportError::MissingId)?;
                let id: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ReportError::InvalidId(raw.to_string()))?;
                let deleted = store.delete(id).await?;
                log::info!("deleted report {id} ({deleted} rows)");
                Ok(Envelope::json(200, &DeleteOutcome { success: true }))
            }
        }
    }
}

pub struct ReportService<C> {
    connector: C,
    database_url: DatabaseUrl,
}

impl<C: Connector> ReportService<C> {
    pub fn new(connector: C, database_url: DatabaseUrl) -> Self {
        Self {
            connector,
            database_url,
        }
    }

    pub async fn handle(&self, event: &Invocation, ctx: &InvocationContext) -> Envelope {
        let method = event.method();
        log::info!(
            "{} [{}] {} invocation",
            ctx.function_name,
            ctx.request_id,
            method
        );

        match self.try_handle(&method, event).await {
            Ok(env) => env,
            Err(err) => err.into(),
        }
    }

    async fn try_handle(&self, method: &str, event: &Invocation) -> Result<Envelope, ReportError> {
        if method == "OPTIONS" {
            return Ok(Envelope::preflight());
        }

        let url = self
            .database_url
            .resolve()
            .ok_or(ReportError::NotConfigured)?;
        let op = Operation::from_method(method)?;

        let mut store = self.connector.connect(&url).await?;
        let outcome = op.run(event, &mut store).await;
        if let Err(err) = store.close().await {
            log::warn!("cannot close database connection: {err}");
        }
        outcome
    }
}
