use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 全量生成任务的固定任务名
pub const VOUCHER_JOB_NAME: &str = "voucherForAll";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum JobStatus {
    Active,
    Inactive,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "Active",
            JobStatus::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_as_str() {
        assert_eq!(JobStatus::Active.as_str(), "Active");
        assert_eq!(JobStatus::Inactive.as_str(), "Inactive");
        assert_eq!(JobStatus::Active.to_string(), "Active");
    }
}
