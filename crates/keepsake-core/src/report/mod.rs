//! Error-report boundary.
//!
//! The application forms structured error records and hands them to a
//! sink; remote delivery itself lives behind the [`ErrorSink`] trait and
//! is out of scope here. Sink failures are logged and swallowed: error
//! reporting must never affect the persistence layer's own operation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Severity of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Coarse classification of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Network,
    #[serde(rename = "authentication")]
    Auth,
    Database,
    Api,
    Validation,
    Unknown,
}

/// Caller-supplied error details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ErrorData {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Device context attached to every report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub hostname: String,
    pub os: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    pub app_version: String,
}

/// Source of device context; platform-supplied, opaque to this layer.
pub trait DeviceInfoSource: Send + Sync {
    fn device_info(&self) -> DeviceInfo;
}

/// Device info from the host environment.
#[derive(Debug, Default, Clone)]
pub struct HostDeviceInfo;

impl DeviceInfoSource for HostDeviceInfo {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            hostname: gethostname::gethostname().to_string_lossy().into_owned(),
            os: std::env::consts::OS.to_string(),
            os_version: None,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A fully formed error record, ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
    pub device_info: DeviceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Destination for formed error records.
#[async_trait]
pub trait ErrorSink: Send + Sync {
    async fn deliver(&self, report: &ErrorReport) -> anyhow::Result<()>;
}

/// Sink that emits reports as structured tracing events.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

#[async_trait]
impl ErrorSink for TracingSink {
    async fn deliver(&self, report: &ErrorReport) -> anyhow::Result<()> {
        match report.severity {
            Severity::Info => {
                tracing::info!(kind = ?report.kind, message = %report.message, "error report")
            }
            Severity::Warning => {
                tracing::warn!(kind = ?report.kind, message = %report.message, "error report")
            }
            Severity::Error | Severity::Critical => {
                tracing::error!(kind = ?report.kind, message = %report.message, "error report")
            }
        }
        Ok(())
    }
}

/// Builds error records and hands them to the configured sink.
pub struct ErrorReporter {
    sink: Arc<dyn ErrorSink>,
    device: Arc<dyn DeviceInfoSource>,
    user_id: RwLock<Option<String>>,
}

impl ErrorReporter {
    pub fn new(sink: Arc<dyn ErrorSink>, device: Arc<dyn DeviceInfoSource>) -> Self {
        Self {
            sink,
            device,
            user_id: RwLock::new(None),
        }
    }

    /// Attach a user id to subsequent reports.
    pub async fn set_user_id(&self, user_id: impl Into<String>) {
        *self.user_id.write().await = Some(user_id.into());
    }

    /// Stop attaching a user id (e.g. on logout).
    pub async fn clear_user_id(&self) {
        *self.user_id.write().await = None;
    }

    /// Form a record and deliver it.
    ///
    /// Delivery failure is logged and swallowed; the formed record is
    /// returned either way.
    pub async fn report(&self, severity: Severity, kind: ErrorKind, data: ErrorData) -> ErrorReport {
        let report = ErrorReport {
            timestamp: Utc::now(),
            severity,
            kind,
            message: data.message,
            code: data.code,
            stack: data.stack,
            context: data.context,
            device_info: self.device.device_info(),
            user_id: self.user_id.read().await.clone(),
        };

        if let Err(e) = self.sink.deliver(&report).await {
            tracing::error!(error = %e, "Failed to deliver error report");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CaptureSink {
        reports: Mutex<Vec<ErrorReport>>,
    }

    #[async_trait]
    impl ErrorSink for CaptureSink {
        async fn deliver(&self, report: &ErrorReport) -> anyhow::Result<()> {
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl ErrorSink for FailingSink {
        async fn deliver(&self, _report: &ErrorReport) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("sink offline"))
        }
    }

    fn reporter(sink: Arc<dyn ErrorSink>) -> ErrorReporter {
        ErrorReporter::new(sink, Arc::new(HostDeviceInfo))
    }

    #[tokio::test]
    async fn test_report_shapes_record() {
        let sink = Arc::new(CaptureSink::default());
        let reporter = reporter(sink.clone());

        reporter.set_user_id("user-1").await;
        reporter
            .report(
                Severity::Error,
                ErrorKind::Database,
                ErrorData {
                    message: "write failed".to_string(),
                    code: Some("SQLITE_BUSY".to_string()),
                    ..Default::default()
                },
            )
            .await;

        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "write failed");
        assert_eq!(reports[0].code.as_deref(), Some("SQLITE_BUSY"));
        assert_eq!(reports[0].user_id.as_deref(), Some("user-1"));
        assert_eq!(reports[0].device_info.os, std::env::consts::OS);
    }

    #[tokio::test]
    async fn test_clear_user_id() {
        let sink = Arc::new(CaptureSink::default());
        let reporter = reporter(sink.clone());

        reporter.set_user_id("user-1").await;
        reporter.clear_user_id().await;
        reporter
            .report(
                Severity::Info,
                ErrorKind::Unknown,
                ErrorData::message("hello"),
            )
            .await;

        assert!(sink.reports.lock().unwrap()[0].user_id.is_none());
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let reporter = reporter(Arc::new(FailingSink));

        // Must not panic or propagate
        let report = reporter
            .report(
                Severity::Critical,
                ErrorKind::Network,
                ErrorData::message("offline"),
            )
            .await;
        assert_eq!(report.message, "offline");
    }

    #[test]
    fn test_kind_serialization_spelling() {
        assert_eq!(serde_json::to_string(&ErrorKind::Auth).unwrap(), "\"authentication\"");
        assert_eq!(serde_json::to_string(&ErrorKind::Network).unwrap(), "\"network\"");
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"critical\"");
    }
}
