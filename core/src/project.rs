//! Project metadata for the token's project.
//!
//! # Design
//! The token identifies the project, so the single operation takes no
//! arguments: `GET api/project/get?token=…`. The reply carries the project's
//! name, owner and environments (domains plus default headers and globals).

use tracing::debug;

use crate::auth::Authentication;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::query::{Query, ToQuery};
use crate::transport::{Reply, Transport};
use crate::types::Project;

pub const PROJECT_GET_PATH: &str = "api/project/get";

/// Query of `api/project/get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectParams<'a> {
    pub token: &'a str,
}

impl ToQuery for ProjectParams<'_> {
    fn write_query(&self, query: &mut Query) {
        query.push("token", self.token);
    }
}

/// Project metadata of the token's project.
#[derive(Debug, Clone, Copy)]
pub struct ProjectService<'a> {
    transport: &'a Transport,
    auth: &'a Authentication,
}

impl<'a> ProjectService<'a> {
    pub(crate) fn new(transport: &'a Transport, auth: &'a Authentication) -> Self {
        Self { transport, auth }
    }

    pub fn build_get(&self) -> Result<HttpRequest, ApiError> {
        let params = ProjectParams {
            token: self.auth.token(),
        };
        self.transport.build_get(PROJECT_GET_PATH, &params)
    }

    /// Fetch the project the token belongs to.
    pub fn get(&self) -> Result<Reply<Project>, ApiError> {
        debug!("fetching project");
        self.transport.execute(&self.build_get()?)
    }
}
