//! Custom per-descriptor checks run after a submission is verified.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use credgate_exchange::VerifiedSubmissionData;

/// Failure raised by a custom handler while evaluating submission data.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A predicate over the verified data of one input descriptor.
///
/// `Ok(true)` accepts, `Ok(false)` rejects the submission.
#[async_trait]
pub trait SubmissionHandler: Send + Sync {
    async fn handle(&self, data: &VerifiedSubmissionData) -> Result<bool, HandlerError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> SubmissionHandler for FnHandler<F>
where
    F: Fn(&VerifiedSubmissionData) -> Result<bool, HandlerError> + Send + Sync,
{
    async fn handle(&self, data: &VerifiedSubmissionData) -> Result<bool, HandlerError> {
        (self.0)(data)
    }
}

/// A handler bound to the input descriptor it evaluates.
#[derive(Clone)]
pub struct CustomHandler {
    input_descriptor_id: String,
    handler: Arc<dyn SubmissionHandler>,
}

impl CustomHandler {
    pub fn new(input_descriptor_id: impl Into<String>, handler: impl SubmissionHandler + 'static) -> Self {
        Self {
            input_descriptor_id: input_descriptor_id.into(),
            handler: Arc::new(handler),
        }
    }

    /// Wrap a synchronous closure.
    pub fn from_fn<F>(input_descriptor_id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&VerifiedSubmissionData) -> Result<bool, HandlerError> + Send + Sync + 'static,
    {
        Self::new(input_descriptor_id, FnHandler(f))
    }

    pub fn input_descriptor_id(&self) -> &str {
        &self.input_descriptor_id
    }

    pub async fn handle(&self, data: &VerifiedSubmissionData) -> Result<bool, HandlerError> {
        self.handler.handle(data).await
    }
}

impl fmt::Debug for CustomHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomHandler")
            .field("input_descriptor_id", &self.input_descriptor_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(credential: serde_json::Value) -> VerifiedSubmissionData {
        VerifiedSubmissionData {
            input_descriptor_id: "employee".into(),
            claim: json!("a.b.c"),
            credential,
            filtered_data: serde_json::Value::Null,
        }
    }

    struct RoleCheck;

    #[async_trait]
    impl SubmissionHandler for RoleCheck {
        async fn handle(&self, data: &VerifiedSubmissionData) -> Result<bool, HandlerError> {
            let role = data
                .credential
                .pointer("/vc/credentialSubject/role")
                .and_then(|v| v.as_str())
                .ok_or_else(|| HandlerError::Failed("no role".into()))?;
            Ok(role == "admin")
        }
    }

    #[tokio::test]
    async fn test_trait_handler() {
        let handler = CustomHandler::new("employee", RoleCheck);
        assert_eq!(handler.input_descriptor_id(), "employee");
        let claim = json!({"vc": {"credentialSubject": {"role": "admin"}}});
        assert!(handler.handle(&data(claim)).await.unwrap());
        let claim = json!({"vc": {"credentialSubject": {"role": "guest"}}});
        assert!(!handler.handle(&data(claim)).await.unwrap());
        assert!(handler.handle(&data(json!({}))).await.is_err());
    }

    #[tokio::test]
    async fn test_fn_handler() {
        let handler = CustomHandler::from_fn("employee", |d| Ok(d.claim == "a.b.c"));
        assert!(handler.handle(&data(json!({}))).await.unwrap());
    }

    #[test]
    fn test_debug_omits_handler() {
        let handler = CustomHandler::from_fn("employee", |_| Ok(true));
        assert!(format!("{:?}", handler).contains("employee"));
    }
}
