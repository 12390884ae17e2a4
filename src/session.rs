// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session structure definition.
//!
//! The Session object wraps an `osauth` session: authentication, the HTTP
//! client and endpoint overrides all come from it. On top of it the session
//! resolves the orchestration endpoint and issues requests without
//! interpreting status codes.

use osauth::client::AuthenticatedClient;
use osauth::services::{GenericService, ServiceType, VersionSelector};
use osauth::AuthType;
use reqwest::header::HeaderValue;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;

use super::utils;
use super::{Error, ErrorKind, Result};

/// The Orchestration service.
pub const ORCHESTRATION: GenericService =
    GenericService::new("orchestration", VersionSelector::Major(1));

/// Header carrying a pre-issued token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// A single HTTP response as received by the session.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Raw body.
    pub body: Vec<u8>,
}

/// An orchestration API session.
///
/// Cheap to clone, clones share the authentication.
#[derive(Debug, Clone)]
pub struct Session {
    inner: osauth::Session,
    token: Option<HeaderValue>,
    #[cfg(test)]
    mock: Option<test::MockTransport>,
}

impl From<osauth::Session> for Session {
    fn from(value: osauth::Session) -> Session {
        Session {
            inner: value,
            token: None,
            #[cfg(test)]
            mock: None,
        }
    }
}

impl Session {
    /// Create a new session with a given authentication.
    ///
    /// Use `osauth::NoAuth` with the orchestration API root (e.g.
    /// `https://cloud.local:8004/v1/<project id>`) to talk to a fixed endpoint,
    /// or `osauth::identity::Token` / `osauth::identity::Password` to go
    /// through the Identity service catalog.
    pub async fn new<Auth: AuthType + 'static>(auth_type: Auth) -> Result<Session> {
        let client = AuthenticatedClient::new(Client::new(), auth_type).await?;
        Ok(osauth::Session::new_with_authenticated_client(client).into())
    }

    /// Create a session from environment variables.
    ///
    /// See [config::from_env](../config/fn.from_env.html).
    #[inline]
    pub fn from_env() -> Result<Session> {
        super::config::from_env()
    }

    /// Create a session from a `clouds.yaml` entry.
    ///
    /// See [config::from_config](../config/fn.from_config.html).
    #[inline]
    pub fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Session> {
        super::config::from_config(cloud_name)
    }

    /// The underlying `osauth` session.
    #[inline]
    pub fn inner(&self) -> &osauth::Session {
        &self.inner
    }

    /// Authentication in use.
    #[inline]
    pub fn auth_type(&self) -> &dyn AuthType {
        self.inner.auth_type()
    }

    /// Set a new authentication for this session.
    #[inline]
    pub fn set_auth_type<Auth: AuthType + 'static>(&mut self, auth_type: Auth) {
        self.inner.set_auth_type(auth_type);
    }

    /// Convert this session into one using the given authentication.
    #[inline]
    pub fn with_auth_type<Auth: AuthType + 'static>(mut self, auth_type: Auth) -> Session {
        self.set_auth_type(auth_type);
        self
    }

    /// Override the orchestration endpoint.
    #[inline]
    pub fn set_endpoint(&mut self, endpoint: Url) {
        self.inner.set_endpoint_override(ORCHESTRATION, endpoint);
    }

    /// Convert this session into one using the given orchestration endpoint.
    #[inline]
    pub fn with_endpoint(mut self, endpoint: Url) -> Session {
        self.set_endpoint(endpoint);
        self
    }

    /// Send a pre-issued token in the `X-Auth-Token` header of every request.
    ///
    /// Useful with `osauth::NoAuth` when the token is obtained out of band.
    pub fn set_token<S: AsRef<str>>(&mut self, token: S) -> Result<()> {
        let mut value = HeaderValue::from_str(token.as_ref()).map_err(|e| {
            Error::new(ErrorKind::InvalidConfig, format!("Invalid token: {}", e))
        })?;
        value.set_sensitive(true);
        self.token = Some(value);
        Ok(())
    }

    /// Convert this session into one sending the given pre-issued token.
    #[inline]
    pub fn with_token<S: AsRef<str>>(mut self, token: S) -> Result<Session> {
        self.set_token(token)?;
        Ok(self)
    }

    /// Base URL of the orchestration API.
    ///
    /// An endpoint override wins, otherwise the authentication is asked for
    /// the `orchestration` endpoint.
    pub async fn endpoint(&self) -> Result<Url> {
        let service_type = ORCHESTRATION.catalog_type();
        if let Some(url) = self.inner.endpoint_overrides().get(service_type) {
            trace!("Using endpoint override {} for {}", url, service_type);
            return Ok(url.clone());
        }

        let url = self
            .inner
            .client()
            .get_endpoint(
                service_type,
                self.inner.endpoint_filters(),
            )
            .await?;
        debug!("Using {} endpoint {}", service_type, url);
        Ok(url)
    }

    /// Build a URL relative to the endpoint.
    pub async fn url<I>(&self, path: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        utils::url::extend(self.endpoint().await?, path)
    }

    /// Issue a request to an absolute URL.
    ///
    /// The status code is not checked, any response that arrives is returned.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<HttpResponse> {
        #[cfg(test)]
        if let Some(ref mock) = self.mock {
            return mock.execute(test::HttpRequest {
                method,
                url,
                token: self.token.clone(),
                body,
            });
        }

        trace!("Sending HTTP {} request to {}", method, url);
        let mut builder = self.inner.client().request(method, url);
        if let Some(ref token) = self.token {
            builder = builder.header(AUTH_TOKEN_HEADER, token.clone());
        }
        if let Some(ref body) = body {
            builder = builder.json(body);
        }

        let response = builder.send_unchecked().await?;
        let status = response.status();
        trace!("HTTP request to {} returned {}", response.url(), status);
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
