//! Best-effort win reporting
//!
//! A win is recorded locally first. Reporting it to the server only ever adds
//! the optional rank (`nthGuessNormal`); every failure maps to "no update".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the win-report endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinReportResponse {
    #[serde(default)]
    pub data: Value,
}

impl WinReportResponse {
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Integral rank carried in `data`, if any. `12.0` counts as integral.
    #[must_use]
    pub fn rank(&self) -> Option<i64> {
        if let Some(rank) = self.data.as_i64() {
            return Some(rank);
        }
        let float = self.data.as_f64()?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let whole = float as i64;
        #[allow(clippy::cast_precision_loss)]
        let exact = float.is_finite() && (whole as f64 - float).abs() < f64::EPSILON;
        exact.then_some(whole)
    }
}

/// The remote endpoint told about wins.
#[async_trait]
pub trait WinReporter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Post a win.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    async fn report_win(&self) -> Result<WinReportResponse, Self::Error>;
}

/// Handle for a pending report of one win.
///
/// Carries no borrow of the game so the report can run detached; its result
/// is applied later and only for the day it was issued on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WinTicket {
    /// Session wall-clock ms of the winning day.
    pub day_ms: i64,
    pub tank_id: i64,
    pub guess_count: u32,
}

/// What came back for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinReportResult {
    pub ticket: WinTicket,
    pub rank: Option<i64>,
}

impl WinTicket {
    /// Run the report. Never fails: errors and unusable bodies yield no rank.
    pub async fn send<R>(self, reporter: &R) -> WinReportResult
    where
        R: WinReporter + ?Sized + Sync,
    {
        let rank = match reporter.report_win().await {
            Ok(response) => {
                let rank = response.rank();
                if rank.is_none() {
                    log::debug!("Win report returned no usable rank: {}", response.data);
                }
                rank
            }
            Err(err) => {
                log::debug!("Win report failed: {err}");
                None
            }
        };
        WinReportResult { ticket: self, rank }
    }
}

/// Run a report on the tokio runtime; await the handle and apply its result.
#[cfg(feature = "async")]
pub fn spawn_report<R>(
    ticket: WinTicket,
    reporter: std::sync::Arc<R>,
) -> tokio::task::JoinHandle<WinReportResult>
where
    R: WinReporter + Send + Sync + 'static,
{
    tokio::spawn(async move { ticket.send(reporter.as_ref()).await })
}
