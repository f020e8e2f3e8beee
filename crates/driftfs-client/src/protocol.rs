use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::token::{TokenState, TokenStore};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use tracing::{debug, warn};

/// Fixed base of the remote API. Overridable for tests.
pub const API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Scopes requested during the consent flow.
pub const OAUTH_SCOPE: &str = "files.readwrite.all offline_access";

/// Additional attempts after the first unauthorized response (4 total).
const MAX_UNAUTHORIZED_RETRIES: u32 = 3;

/// Authenticated remote access.
///
/// Every resource call attaches the current access token and recovers from
/// an unauthorized response by refreshing tokens and retrying, up to
/// [`MAX_UNAUTHORIZED_RETRIES`] extra attempts. Any other unexpected status
/// is fatal on first occurrence.
pub struct ProtocolClient {
    config: ClientConfig,
    store: TokenStore,
    token: Option<TokenState>,
    transport: Box<dyn Transport>,
    api_base: String,
}

impl ProtocolClient {
    pub fn new(
        config: ClientConfig,
        store: TokenStore,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        let token = store.load()?;
        Ok(ProtocolClient {
            config,
            store,
            token,
            transport,
            api_base: API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Ready-to-open consent URL for the interactive authorization step.
    pub fn consent_url(&self) -> String {
        format!(
            "{}?client_id={}&scope={}&response_type=code&redirect_uri={}",
            self.config.auth_url(),
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(OAUTH_SCOPE),
            urlencoding::encode(&self.config.redirect_uri),
        )
    }

    /// Completes the token setup.
    ///
    /// With no authorization code configured this is a terminal setup
    /// failure carrying the consent URL as remediation text. With a code
    /// but no stored tokens, redeems the code at the token endpoint and
    /// persists the result.
    pub fn initialize(&mut self) -> Result<()> {
        if self.config.authorization_code.is_empty() {
            return Err(ClientError::Setup(format!(
                "missing authorization code\n\n\
                 Open the following URL in your browser (private window) and \
                 retrieve the authorization code:\n{}",
                self.consent_url()
            )));
        }

        if self.token.is_none() {
            debug!("protocol: redeeming authorization code");
            let response = self.token_grant(vec![
                ("client_id".to_string(), self.config.client_id.clone()),
                ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
                ("code".to_string(), self.config.authorization_code.clone()),
                ("grant_type".to_string(), "authorization_code".to_string()),
            ])?;
            if response.status != 200 {
                return Err(ClientError::Remote {
                    status: response.status,
                    body: response.text(),
                });
            }
            self.persist_tokens(&response.body)?;
        }

        Ok(())
    }

    /// Exchanges the stored refresh token for a new token pair.
    ///
    /// Failure is fatal; no further retry happens at this layer.
    pub fn refresh(&mut self) -> Result<()> {
        let refresh_token = match &self.token {
            Some(t) => t.refresh_token.clone(),
            None => {
                return Err(ClientError::Auth(
                    "no refresh token available; run initialization first".to_string(),
                ))
            }
        };

        debug!("protocol: refreshing access token");
        let response = self.token_grant(vec![
            ("client_id".to_string(), self.config.client_id.clone()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("refresh_token".to_string(), refresh_token),
            ("grant_type".to_string(), "refresh_token".to_string()),
        ])?;
        if response.status != 200 {
            return Err(ClientError::Auth(format!(
                "token refresh rejected with {}: {}",
                response.status,
                response.text()
            )));
        }
        self.persist_tokens(&response.body)
    }

    /// GET a resource body (expects 200).
    pub fn get(&mut self, resource: &str) -> Result<Vec<u8>> {
        let response = self.request(Method::Get, resource, Vec::new(), RequestBodyKind::None, &[200])?;
        Ok(response.body)
    }

    /// GET a byte range of a resource (expects 200/206; 416 means the
    /// requested range starts at or past end-of-content and yields an
    /// empty body).
    pub fn get_range(&mut self, resource: &str, offset: u64, size: u64) -> Result<Vec<u8>> {
        let range = format!("bytes={}-{}", offset, offset + size.saturating_sub(1));
        let response = self.request(
            Method::Get,
            resource,
            vec![("Range".to_string(), range)],
            RequestBodyKind::None,
            &[200, 206, 416],
        )?;
        if response.status == 416 {
            return Ok(Vec::new());
        }
        Ok(response.body)
    }

    /// POST a body (expects 200).
    pub fn post(&mut self, resource: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let response =
            self.request(Method::Post, resource, Vec::new(), RequestBodyKind::Bytes(body), &[200])?;
        Ok(response.body)
    }

    /// PATCH a body (expects 200).
    pub fn patch(&mut self, resource: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let response = self.request(
            Method::Patch,
            resource,
            Vec::new(),
            RequestBodyKind::Bytes(body),
            &[200],
        )?;
        Ok(response.body)
    }

    /// PUT a body, e.g. a content upload (expects 200/201).
    pub fn put(&mut self, resource: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let response = self.request(
            Method::Put,
            resource,
            Vec::new(),
            RequestBodyKind::Bytes(body),
            &[200, 201],
        )?;
        Ok(response.body)
    }

    /// DELETE a resource (expects 204).
    pub fn delete(&mut self, resource: &str) -> Result<()> {
        self.request(Method::Delete, resource, Vec::new(), RequestBodyKind::None, &[204])?;
        Ok(())
    }

    fn request(
        &mut self,
        method: Method,
        resource: &str,
        extra_headers: Vec<(String, String)>,
        body: RequestBodyKind,
        expected: &[u16],
    ) -> Result<HttpResponse> {
        let url = format!("{}{}", self.api_base, resource);

        for attempt in 0..=MAX_UNAUTHORIZED_RETRIES {
            let token = self.token.as_ref().ok_or_else(|| {
                ClientError::Setup("no tokens available; run initialization first".to_string())
            })?;

            let mut request =
                HttpRequest::new(method, url.clone()).header("Authorization", token.authorization_header());
            for (name, value) in &extra_headers {
                request = request.header(name.clone(), value.clone());
            }
            request = match &body {
                RequestBodyKind::None => request,
                RequestBodyKind::Bytes(bytes) => request.bytes(bytes.clone()),
            };

            let response = self.transport.execute(&request)?;

            if response.status == 401 {
                if attempt == MAX_UNAUTHORIZED_RETRIES {
                    warn!(
                        "protocol: still unauthorized after {} attempts for {}",
                        attempt + 1,
                        resource
                    );
                    return Err(ClientError::Remote {
                        status: response.status,
                        body: response.text(),
                    });
                }
                debug!(
                    "protocol: unauthorized on attempt {} for {}, refreshing",
                    attempt + 1,
                    resource
                );
                self.refresh()?;
                continue;
            }

            if expected.contains(&response.status) {
                return Ok(response);
            }

            // Any other status is fatal on first occurrence.
            return Err(ClientError::Remote {
                status: response.status,
                body: response.text(),
            });
        }

        unreachable!("retry loop always returns")
    }

    /// One form-encoded call against the token endpoint, without an
    /// authorization header and outside the retry policy.
    fn token_grant(&mut self, params: Vec<(String, String)>) -> Result<HttpResponse> {
        let request = HttpRequest::new(Method::Post, self.config.token_url()).form(params);
        Ok(self.transport.execute(&request)?)
    }

    fn persist_tokens(&mut self, body: &[u8]) -> Result<()> {
        self.store.save_raw(body)?;
        // Reload wholesale; the on-disk record is the durable copy.
        self.token = self.store.load()?;
        Ok(())
    }
}

enum RequestBodyKind {
    None,
    Bytes(Vec<u8>),
}
