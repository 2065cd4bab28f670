//! Signed blocking HTTP implementation of [`ControlPlane`].

use std::time::Duration;

use alb_config::Credentials;
use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::client::ControlPlane;
use crate::error::ApiError;
use crate::model::{
    ActivationRequest, ActivationStatus, CurrentActivations, LoadBalancerConfiguration,
    NewVersion, Policy, PolicyId, PolicyVersionDocument,
};
use crate::signing::{EdgeGridSigner, SignedRequest};

const ORIGINS: [&str; 4] = ["cloudlets", "api", "v2", "origins"];
const POLICIES: [&str; 4] = ["cloudlets", "api", "v2", "policies"];

/// Request target built from path segments, each percent-encoded on its own
/// so identifiers cannot add segments or start a query.
struct Target<'a> {
    segments: Vec<&'a str>,
    query: Option<String>,
}

impl<'a> Target<'a> {
    fn new(root: [&'a str; 4]) -> Self {
        Self {
            segments: root.to_vec(),
            query: None,
        }
    }

    fn segment(mut self, segment: &'a str) -> Self {
        self.segments.push(segment);
        self
    }

    fn query(mut self, query: String) -> Self {
        self.query = Some(query);
        self
    }

    fn describe(&self) -> String {
        self.segments.join("/")
    }
}

/// Talks to the cloudlets API with `EG1-HMAC-SHA256` signed requests.
#[derive(Debug, Clone)]
pub struct EdgeGridClient {
    http: Client,
    base: Url,
    signer: EdgeGridSigner,
}

struct Reply {
    endpoint: String,
    status: u16,
    body: String,
}

impl EdgeGridClient {
    /// Creates a client for `https://{host}` from `credentials`.
    ///
    /// # Errors
    /// Returns [`ApiError`] if the host is not a valid URL authority or the
    /// HTTP client cannot be built.
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self, ApiError> {
        let origin = format!("https://{}/", credentials.host);
        let base = Url::parse(&origin).map_err(|source| ApiError::Url {
            path: origin,
            source,
        })?;
        Self::with_base_url(credentials, base, timeout)
    }

    /// Creates a client that sends every request to `base`.
    ///
    /// # Errors
    /// Returns [`ApiError::Client`] if the HTTP client cannot be built.
    pub fn with_base_url(
        credentials: &Credentials,
        base: Url,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            http,
            base,
            signer: EdgeGridSigner::new(credentials),
        })
    }

    fn endpoint(&self, target: &Target<'_>) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url {
                path: target.describe(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .extend(&target.segments);
        url.set_query(target.query.as_deref());
        Ok(url)
    }

    fn send(&self, method: Method, target: &Target<'_>, body: Vec<u8>) -> Result<Reply, ApiError> {
        let url = self.endpoint(target)?;
        let endpoint = url.to_string();
        let authorization = self.signer.authorization(&SignedRequest {
            method: method.as_str(),
            url: &url,
            body: &body,
        })?;
        debug!(%method, endpoint, "sending request");
        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, authorization);
        if !body.is_empty() {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }
        let response = request.send().map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        let status = response.status().as_u16();
        let text = response.text().map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        debug!(endpoint, status, body = %text, "response received");
        Ok(Reply {
            endpoint,
            status,
            body: text,
        })
    }

    fn decode<T: DeserializeOwned>(reply: Reply) -> Result<T, ApiError> {
        if !(200..300).contains(&reply.status) {
            return Err(ApiError::status(reply.endpoint, reply.status, reply.body));
        }
        serde_json::from_str(&reply.body).map_err(|source| ApiError::decode(reply.endpoint, source))
    }

    fn get_json<T: DeserializeOwned>(&self, target: &Target<'_>) -> Result<T, ApiError> {
        Self::decode(self.send(Method::GET, target, Vec::new())?)
    }

    fn post<B: Serialize>(&self, target: &Target<'_>, body: &B) -> Result<Reply, ApiError> {
        let payload = serde_json::to_vec(body).map_err(ApiError::Encode)?;
        self.send(Method::POST, target, payload)
    }
}

impl ControlPlane for EdgeGridClient {
    fn current_activations(&self) -> Result<CurrentActivations, ApiError> {
        self.get_json(&Target::new(ORIGINS).segment("currentActivations"))
    }

    fn load_balancer_version(
        &self,
        load_id: &str,
        version: u64,
    ) -> Result<LoadBalancerConfiguration, ApiError> {
        let version = version.to_string();
        let target = Target::new(ORIGINS)
            .segment(load_id)
            .segment("versions")
            .segment(&version)
            .query(String::from("validate=false"));
        self.get_json(&target)
    }

    fn create_load_balancer_version(
        &self,
        load_id: &str,
        config: &LoadBalancerConfiguration,
    ) -> Result<NewVersion, ApiError> {
        let target = Target::new(ORIGINS).segment(load_id).segment("versions");
        let reply = self.post(&target, config)?;
        Self::decode(reply)
    }

    fn activate_load_balancer(
        &self,
        request: &ActivationRequest,
    ) -> Result<ActivationStatus, ApiError> {
        let target = Target::new(ORIGINS)
            .segment(&request.origin_id)
            .segment("activations");
        let reply = self.post(&target, request)?;
        Ok(ActivationStatus {
            status: reply.status,
        })
    }

    fn policies(&self, cloudlet_id: u32) -> Result<Vec<Policy>, ApiError> {
        self.get_json(&Target::new(POLICIES).query(format!("cloudletId={cloudlet_id}")))
    }

    fn policy_version(
        &self,
        policy_id: &PolicyId,
        version: u64,
    ) -> Result<PolicyVersionDocument, ApiError> {
        let version = version.to_string();
        let target = Target::new(POLICIES)
            .segment(policy_id.as_str())
            .segment("versions")
            .segment(&version);
        self.get_json(&target)
    }
}
