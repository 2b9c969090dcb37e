use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use wotdle_game::{WinReportResponse, WinReporter};

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("POST {path} failed: endpoint unreachable")]
    Unreachable { path: String },
}

/// Stand-in for the win-report endpoint that answers with a fixed body.
#[derive(Debug, Clone)]
pub struct StaticReporter {
    data: Value,
}

impl StaticReporter {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn ranked(rank: i64) -> Self {
        Self::new(Value::from(rank))
    }
}

#[async_trait]
impl WinReporter for StaticReporter {
    type Error = ReporterError;

    async fn report_win(&self) -> Result<WinReportResponse, Self::Error> {
        Ok(WinReportResponse::new(self.data.clone()))
    }
}

/// Win-report endpoint that is never reachable.
#[derive(Debug, Clone)]
pub struct OfflineReporter {
    path: String,
}

impl OfflineReporter {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WinReporter for OfflineReporter {
    type Error = ReporterError;

    async fn report_win(&self) -> Result<WinReportResponse, Self::Error> {
        log::debug!("Simulating unreachable {}", self.path);
        Err(ReporterError::Unreachable {
            path: self.path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_reporter_answers_with_rank() {
        let response = tokio_test::block_on(StaticReporter::ranked(17).report_win()).unwrap();
        assert_eq!(response.rank(), Some(17));
    }

    #[test]
    fn offline_reporter_names_the_endpoint() {
        let err = tokio_test::block_on(OfflineReporter::new("/api/winnormal").report_win())
            .unwrap_err();
        assert_eq!(err.to_string(), "POST /api/winnormal failed: endpoint unreachable");
    }
}
