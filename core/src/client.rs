//! Client facade for the YApi open API.
//!
//! # Design
//! `Client` owns the transport (agent + base URL) and the token, both fixed at
//! construction. The resource services are cheap borrowed views handed out
//! per call, so one `Client` can be shared by reference across threads as far
//! as the underlying `ureq` agent allows.

use url::Url;

use crate::auth::Authentication;
use crate::category::CategoryMenuService;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::interface::InterfaceService;
use crate::project::ProjectService;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct Client {
    transport: Transport,
    auth: Authentication,
}

impl Client {
    /// Client with default agent settings.
    ///
    /// The base URL must parse; its path should end with `/` or every request
    /// fails with [`ApiError::Config`].
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        Self::from_config(&ClientConfig::new(base_url, token))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut client = Self::with_agent(config.agent(), &config.base_url, &config.token)?;
        client.transport = client.transport.with_body_limit(config.body_limit);
        Ok(client)
    }

    /// Client using a caller-built agent. Build it with
    /// `http_status_as_error(false)` so non-2xx answers reach status handling.
    /// The body limit is [`crate::config::DEFAULT_BODY_LIMIT`].
    pub fn with_agent(agent: ureq::Agent, base_url: &str, token: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            transport: Transport::new(agent, base_url),
            auth: Authentication::new(token),
        })
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub fn authentication(&self) -> &Authentication {
        &self.auth
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn project(&self) -> ProjectService<'_> {
        ProjectService::new(&self.transport, &self.auth)
    }

    pub fn category_menu(&self) -> CategoryMenuService<'_> {
        CategoryMenuService::new(&self.transport, &self.auth)
    }

    pub fn interface(&self) -> InterfaceService<'_> {
        InterfaceService::new(&self.transport, &self.auth)
    }
}
