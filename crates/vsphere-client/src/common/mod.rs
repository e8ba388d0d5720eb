//! Common utilities for the vSphere API client
//!
//! Provides the session-bound HTTP wrapper used by every API call.

pub mod path;

use crate::error::VSphereError;
use crate::models::{ObjectRef, RawMethodFault};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Header carrying the VI/JSON session token
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// HTTP client wrapper bound to one vCenter session
pub struct HttpClient {
    client: Client,
    base_url: String,
    session_id: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    ///
    /// `base_url` is the versioned API root, e.g. `https://vc/sdk/vim25/8.0.1.0`.
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: None,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach the session token returned by `Login`
    pub fn set_session(&mut self, session_id: String) {
        self.session_id = Some(session_id);
    }

    /// Build the URL of a property or method on a managed object
    pub fn object_url(&self, object: &ObjectRef, member: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            object.kind,
            urlencoding::encode(&object.value),
            member
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header("Accept", "application/json");
        match &self.session_id {
            Some(id) => builder.header(SESSION_HEADER, id),
            None => builder,
        }
    }

    /// Read one property of a managed object
    pub async fn get_property<T: for<'de> Deserialize<'de>>(
        &self,
        object: &ObjectRef,
        property: &str,
    ) -> Result<T, VSphereError> {
        let url = self.object_url(object, property);
        debug!("GET {}", url);

        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(VSphereError::Http)?;

        let response = check_status(response, "GET", object, property).await?;
        response.json().await.map_err(VSphereError::Http)
    }

    /// Invoke a method and decode its return value
    pub async fn invoke<T: for<'de> Deserialize<'de>>(
        &self,
        object: &ObjectRef,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, VSphereError> {
        let response = self.send_invoke(object, method, body).await?;
        response.json().await.map_err(VSphereError::Http)
    }

    /// Invoke a method that returns nothing
    pub async fn invoke_void(
        &self,
        object: &ObjectRef,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<(), VSphereError> {
        self.send_invoke(object, method, body).await?;
        Ok(())
    }

    /// Invoke a method and return the raw response (used by `Login` to read headers)
    pub async fn send_invoke(
        &self,
        object: &ObjectRef,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<Response, VSphereError> {
        let url = self.object_url(object, method);
        debug!("POST {}", url);

        let response = self
            .request(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(VSphereError::Http)?;

        check_status(response, "POST", object, method).await
    }
}

/// Map a non-success response to a `VSphereError`
///
/// VI/JSON reports faults as a JSON `MethodFault` body.
async fn check_status(
    response: Response,
    verb: &str,
    object: &ObjectRef,
    member: &str,
) -> Result<Response, VSphereError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let fault = serde_json::from_str::<RawMethodFault>(&body).ok();
    let fault_name = fault.as_ref().map(|f| f.type_name.as_str()).unwrap_or("");

    if status == StatusCode::NOT_FOUND || fault_name == "ManagedObjectNotFound" {
        return Err(VSphereError::NotFound(format!(
            "{} {} on {} - {}",
            verb, member, object, body
        )));
    }

    if status == StatusCode::UNAUTHORIZED
        || fault_name == "NotAuthenticated"
        || fault_name == "InvalidLogin"
    {
        return Err(VSphereError::Authentication(format!(
            "{} {} on {}: {} - {}",
            verb, member, object, status, body
        )));
    }

    Err(VSphereError::Api(format!(
        "{} {} on {} failed: {} - {}",
        verb, member, object, status, body
    )))
}

/// Tag a serialized data object with its vim25 type name
pub fn with_type_name(mut value: serde_json::Value, type_name: &str) -> serde_json::Value {
    if let serde_json::Value::Object(map) = &mut value {
        map.insert(
            "_typeName".to_string(),
            serde_json::Value::String(type_name.to_string()),
        );
    }
    value
}
