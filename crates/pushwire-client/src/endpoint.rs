//! Connector endpoint (immutable once built).
//!
//! The scheme is always pinned to `wss`, whatever the base URL says. The
//! client and access tokens travel as `ClientToken` / `AccessToken` query
//! parameters.

use std::fmt;

use url::Url;

use pushwire_core::error::{PushError, Result};

use crate::config::EndpointSection;

const CLIENT_TOKEN_PARAM: &str = "ClientToken";
const ACCESS_TOKEN_PARAM: &str = "AccessToken";

#[derive(Clone)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Build from a base URL (`scheme://host/path[?query]`) and credentials.
    pub fn new(base: &str, client_token: &str, access_token: &str) -> Result<Self> {
        let mut url = Url::parse(base)
            .map_err(|e| PushError::Config(format!("invalid endpoint url {base:?}: {e}")))?;
        if url.host_str().is_none() {
            return Err(PushError::Config(format!("endpoint url {base:?} has no host")));
        }
        url.set_scheme("wss")
            .map_err(|_| PushError::Config(format!("cannot use {base:?} as a wss endpoint")))?;
        url.query_pairs_mut()
            .append_pair(CLIENT_TOKEN_PARAM, client_token)
            .append_pair(ACCESS_TOKEN_PARAM, access_token);
        Ok(Self { url })
    }

    pub fn from_config(section: &EndpointSection) -> Result<Self> {
        let base = format!("wss://{}{}", section.host(), section.path);
        Self::new(&base, &section.client_token, &section.access_token)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL with the access token masked, for logs.
    pub fn redacted(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == ACCESS_TOKEN_PARAM { "***".into() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Endpoint").field(&self.redacted()).finish()
    }
}
