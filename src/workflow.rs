//! Workflow instance status as reported by the sidecar.

use crate::error::{ensure_not_empty, DaprError};
use crate::proto::GetWorkflowRequest;
use crate::DaprClient;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

const OPERATION: &str = "get workflow";

/// Runtime status of a workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkflowRuntimeStatus {
    /// A status this client does not know.
    #[default]
    Unknown,
    Running,
    Completed,
    Failed,
    Terminated,
    Pending,
    Suspended,
}

impl WorkflowRuntimeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowRuntimeStatus::Unknown => "UNKNOWN",
            WorkflowRuntimeStatus::Running => "RUNNING",
            WorkflowRuntimeStatus::Completed => "COMPLETED",
            WorkflowRuntimeStatus::Failed => "FAILED",
            WorkflowRuntimeStatus::Terminated => "TERMINATED",
            WorkflowRuntimeStatus::Pending => "PENDING",
            WorkflowRuntimeStatus::Suspended => "SUSPENDED",
        }
    }

    /// `true` once the instance can no longer make progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowRuntimeStatus::Completed
                | WorkflowRuntimeStatus::Failed
                | WorkflowRuntimeStatus::Terminated
        )
    }
}

impl FromStr for WorkflowRuntimeStatus {
    type Err = std::convert::Infallible;

    /// Never fails: unrecognised statuses parse as `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => WorkflowRuntimeStatus::Running,
            "COMPLETED" => WorkflowRuntimeStatus::Completed,
            "FAILED" => WorkflowRuntimeStatus::Failed,
            "TERMINATED" => WorkflowRuntimeStatus::Terminated,
            "PENDING" => WorkflowRuntimeStatus::Pending,
            "SUSPENDED" => WorkflowRuntimeStatus::Suspended,
            _ => WorkflowRuntimeStatus::Unknown,
        })
    }
}

impl fmt::Display for WorkflowRuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    pub instance_id: String,
    pub workflow_name: String,
    pub runtime_status: WorkflowRuntimeStatus,
    pub properties: HashMap<String, String>,
}

impl DaprClient {
    /// Fetches the state of workflow `instance_id` from `workflow_component`.
    #[instrument(skip(self))]
    pub async fn get_workflow(
        &self,
        instance_id: &str,
        workflow_component: &str,
    ) -> Result<WorkflowState, DaprError> {
        ensure_not_empty("instance_id", instance_id)?;
        ensure_not_empty("workflow_component", workflow_component)?;

        let request = GetWorkflowRequest {
            instance_id: instance_id.to_string(),
            workflow_component: workflow_component.to_string(),
        };
        let response = self
            .call(
                OPERATION,
                None,
                self.channel().get_workflow(request, self.call_metadata()),
            )
            .await?;

        let runtime_status = response
            .runtime_status
            .parse()
            .unwrap_or(WorkflowRuntimeStatus::Unknown);
        Ok(WorkflowState {
            instance_id: response.instance_id,
            workflow_name: response.workflow_name,
            runtime_status,
            properties: response.properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::GetWorkflowResponse;
    use crate::transport::mock::MockSidecar;

    #[test]
    fn test_status_parsing() {
        let parse = |s: &str| s.parse::<WorkflowRuntimeStatus>().unwrap();
        assert_eq!(parse("RUNNING"), WorkflowRuntimeStatus::Running);
        assert_eq!(parse("completed"), WorkflowRuntimeStatus::Completed);
        assert_eq!(parse("SUSPENDED"), WorkflowRuntimeStatus::Suspended);
        assert_eq!(parse("CONTINUED_AS_NEW"), WorkflowRuntimeStatus::Unknown);
        assert_eq!(parse(""), WorkflowRuntimeStatus::Unknown);
        assert!(parse("TERMINATED").is_terminal());
        assert!(!parse("PENDING").is_terminal());
    }

    #[tokio::test]
    async fn test_get_workflow_maps_response() {
        let mut mock = MockSidecar::new();
        mock.expect_get_workflow().return_ok(GetWorkflowResponse {
            instance_id: "order-17".to_string(),
            workflow_name: "OrderProcessing".to_string(),
            runtime_status: "FAILED".to_string(),
            properties: HashMap::from([(
                "dapr.workflow.last_updated".to_string(),
                "x".to_string(),
            )]),
        });

        let client = DaprClient::new(mock.channel());
        let state = client.get_workflow("order-17", "dapr").await.unwrap();
        assert_eq!(state.instance_id, "order-17");
        assert_eq!(state.workflow_name, "OrderProcessing");
        assert_eq!(state.runtime_status, WorkflowRuntimeStatus::Failed);
        assert_eq!(state.properties.len(), 1);
        mock.verify();
    }
}
