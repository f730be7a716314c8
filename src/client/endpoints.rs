//! Typed wrappers for every backend operation the console uses

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::dto::{
    AdminDashboard, ApprovalQueue, ApprovedLogsPayload, ImportOutcome, LoginResponse,
    OperatorDashboard,
};
use crate::client::http::ApiClient;
use crate::domain::{DeclarationPayload, User, WorkLog};
use crate::import::ImportBatch;
use crate::session::AuthGateway;
use crate::shared::decode::Listish;
use crate::shared::errors::ApiResult;

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.post("auth/login", &json!({ "email": email, "password": password }))
            .await
    }

    async fn fetch_profile(&self) -> ApiResult<User> {
        self.get("auth/me").await
    }
}

impl ApiClient {
    /// Approved and recent logs, line items and completion counts for
    /// the logged-in operator.
    pub async fn operator_dashboard(&self) -> ApiResult<OperatorDashboard> {
        self.get("operator_dashboard").await
    }

    /// Open assignments; the endpoint answers bare or `{items}`-wrapped.
    pub async fn assigned_works(&self) -> ApiResult<Vec<WorkLog>> {
        Ok(self.get::<Listish<WorkLog>>("cavi").await?.into_vec())
    }

    pub async fn declare_work(&self, payload: &DeclarationPayload) -> ApiResult<Value> {
        self.post("dichiara_lavoro", payload).await
    }

    pub async fn admin_dashboard(&self) -> ApiResult<AdminDashboard> {
        self.get("admin_dashboard").await
    }

    pub async fn approval_queue(&self) -> ApiResult<ApprovalQueue> {
        let payload: Value = self.get("get_admin_logs").await?;
        Ok(ApprovalQueue::from_value(&payload))
    }

    pub async fn approve_work(&self, work_log_id: i64) -> ApiResult<()> {
        let _: Value = self
            .post("approva_lavoro", &json!({ "work_log_id": work_log_id }))
            .await?;
        Ok(())
    }

    pub async fn reject_work(&self, work_log_id: i64) -> ApiResult<()> {
        let _: Value = self
            .post("rifiuta_lavoro", &json!({ "work_log_id": work_log_id }))
            .await?;
        Ok(())
    }

    /// Import target candidates.
    pub async fn technicians(&self) -> ApiResult<Vec<User>> {
        Ok(self
            .get::<Listish<User>>("admin/technicians")
            .await?
            .into_vec())
    }

    pub async fn import_work_logs(&self, batch: &ImportBatch) -> ApiResult<ImportOutcome> {
        self.post("admin/import_work_logs", batch).await
    }

    /// Everything the approved-works report renders, in one call.
    pub async fn approved_logs(&self) -> ApiResult<ApprovedLogsPayload> {
        self.get("get_approved_logs").await
    }
}
