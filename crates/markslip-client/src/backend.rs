use async_trait::async_trait;
use markslip_core::{Defaults, MarkslipData, Selection, Student};
use serde_json::Value;

use crate::error::ApiError;
use crate::protocol::{
    check_envelope, decode_data, Action, ApiRequest, ClassList, Roster, SmartCheckOutcome,
    WriteOutcome,
};

/// The remote markslip backend.
///
/// Implementors provide the transport in [`Backend::send`]; the typed actions
/// are built on top of it and check the response envelope.
#[async_trait(?Send)]
pub trait Backend {
    /// Perform one request and return the raw JSON body of a 2xx response
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;

    /// Whether a deployment URL is set; nothing is sent otherwise
    fn is_configured(&self) -> bool;

    async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        check_envelope(self.send(request).await?)
    }

    async fn get_defaults(&self) -> Result<Defaults, ApiError> {
        decode_data(self.call(ApiRequest::get_defaults()).await?)
    }

    async fn get_classes(&self) -> Result<Vec<String>, ApiError> {
        let classes: ClassList = decode_data(self.call(ApiRequest::get_classes()).await?)?;
        Ok(classes.into_vec())
    }

    async fn smart_check(&self, selection: &Selection) -> Result<SmartCheckOutcome, ApiError> {
        let body = self.call(ApiRequest::smart_check(selection)).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn load_markslip(&self, markslip_id: &str) -> Result<MarkslipData, ApiError> {
        decode_data(self.call(ApiRequest::load_markslip(markslip_id)).await?)
    }

    async fn load_students(&self, class_name: &str, session: &str) -> Result<Vec<Student>, ApiError> {
        let roster: Roster =
            decode_data(self.call(ApiRequest::load_students(class_name, session)).await?)?;
        Ok(roster.students)
    }

    async fn save_markslip(&self, markslip: &MarkslipData) -> Result<WriteOutcome, ApiError> {
        self.write(Action::SaveMarkslip, markslip).await
    }

    async fn generate_markslip(&self, markslip: &MarkslipData) -> Result<WriteOutcome, ApiError> {
        self.write(Action::GenerateMarkslip, markslip).await
    }

    async fn auto_save(&self, markslip: &MarkslipData) -> Result<WriteOutcome, ApiError> {
        self.write(Action::AutoSave, markslip).await
    }

    async fn write(&self, action: Action, markslip: &MarkslipData) -> Result<WriteOutcome, ApiError> {
        let body = self.call(ApiRequest::write(action, markslip)?).await?;
        Ok(serde_json::from_value(body)?)
    }
}
