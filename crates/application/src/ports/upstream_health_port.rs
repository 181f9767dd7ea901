use serde::Serialize;

/// Status of an upstream DoH server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamStatus {
    Healthy,
    Unhealthy,
    /// Health checking is disabled (threshold 0).
    Unchecked,
}

impl UpstreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Unchecked => "unchecked",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpstreamHealthReport {
    pub upstream: String,
    pub status: UpstreamStatus,
    pub failures: u32,
}

/// Port for querying upstream health status.
pub trait UpstreamHealthPort: Send + Sync {
    fn upstream_health(&self) -> Vec<UpstreamHealthReport>;
}
