//! Cloud Run Admin API v2 client over `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use budgetguard_core::error::{GuardError, Result};
use budgetguard_core::iam::IamPolicy;
use budgetguard_core::operation::Operation;

use crate::auth::{AccessToken, TokenSource};

use super::{ApiConnector, ServiceAdminApi};

/// Authenticated client bound to one access token.
pub struct RunAdminClient {
    http: Client,
    base_url: String,
    token: AccessToken,
}

impl RunAdminClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: AccessToken) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, call: &str, target: &str) -> Result<T> {
        let resp = req
            .bearer_auth(self.token.secret())
            .send()
            .await
            .map_err(|e| GuardError::Api(format!("{call} {target}: request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            if call == "setIamPolicy" && is_conflict(status, &body) {
                return Err(GuardError::PolicyConflict(target.to_string()));
            }
            return Err(GuardError::Api(format!(
                "{call} {target}: HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| GuardError::Api(format!("{call} {target}: invalid response body: {e}")))
    }
}

fn is_conflict(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT
        || status == StatusCode::PRECONDITION_FAILED
        || body.contains("\"ABORTED\"")
}

#[async_trait]
impl ServiceAdminApi for RunAdminClient {
    async fn get_iam_policy(&self, resource: &str) -> Result<IamPolicy> {
        let req = self.http.get(self.url(&format!("{resource}:getIamPolicy")));
        self.send(req, "getIamPolicy", resource).await
    }

    async fn set_iam_policy(&self, resource: &str, policy: &IamPolicy) -> Result<IamPolicy> {
        let req = self
            .http
            .post(self.url(&format!("{resource}:setIamPolicy")))
            .json(&json!({ "policy": policy }));
        self.send(req, "setIamPolicy", resource).await
    }

    async fn patch_ingress(&self, resource: &str, ingress: &str) -> Result<Operation> {
        let req = self
            .http
            .patch(self.url(resource))
            .query(&[("updateMask", "ingress")])
            .json(&json!({ "ingress": ingress }));
        self.send(req, "patch", resource).await
    }

    async fn get_operation(&self, name: &str) -> Result<Operation> {
        let req = self.http.get(self.url(name));
        self.send(req, "getOperation", name).await
    }
}

/// Fetches a fresh token per connect and hands out a `RunAdminClient`.
pub struct HttpConnector {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl HttpConnector {
    pub fn new(http: Client, base_url: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            tokens,
        }
    }
}

#[async_trait]
impl ApiConnector for HttpConnector {
    async fn connect(&self) -> Result<Arc<dyn ServiceAdminApi>> {
        let token = self.tokens.fetch().await?;
        Ok(Arc::new(RunAdminClient::new(
            self.http.clone(),
            self.base_url.clone(),
            token,
        )))
    }
}
