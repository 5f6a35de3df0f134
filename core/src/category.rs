//! Category menu of a project: listing and upserting categories.
//!
//! # Design
//! Listing is a GET keyed by project id. Upserting posts a flat
//! [`AddCategoryRequest`] built from [`CategoryParams`] and the token. `_id`
//! is only sent when non-zero; without it the server matches on the name and
//! either creates the category or updates its description.

use serde::Serialize;
use tracing::debug;

use crate::auth::Authentication;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::query::{Query, ToQuery};
use crate::transport::{Reply, Transport};
use crate::types::{CategoryMenu, ModifyResponse};

pub const CATEGORY_MENU_PATH: &str = "api/interface/getCatMenu";
pub const CATEGORY_ADD_PATH: &str = "api/interface/add_cat";

/// Query of `api/interface/getCatMenu`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMenuParams<'a> {
    pub token: &'a str,
    pub project_id: i64,
}

impl ToQuery for CategoryMenuParams<'_> {
    fn write_query(&self, query: &mut Query) {
        query.push("token", self.token).push("project_id", self.project_id);
    }
}

/// Caller input for creating or updating a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryParams {
    pub project_id: i64,
    /// Existing category id, or 0 to let the server decide.
    pub id: i64,
    pub name: String,
    pub desc: String,
}

impl CategoryParams {
    pub fn new(project_id: i64, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }
}

/// JSON body of `api/interface/add_cat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddCategoryRequest<'a> {
    pub token: &'a str,
    pub project_id: i64,
    #[serde(rename = "_id", skip_serializing_if = "is_zero")]
    pub id: i64,
    pub name: &'a str,
    pub desc: &'a str,
}

impl<'a> AddCategoryRequest<'a> {
    pub fn new(token: &'a str, params: &'a CategoryParams) -> Self {
        Self {
            token,
            project_id: params.project_id,
            id: params.id,
            name: &params.name,
            desc: &params.desc,
        }
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryMenuService<'a> {
    transport: &'a Transport,
    auth: &'a Authentication,
}

impl<'a> CategoryMenuService<'a> {
    pub(crate) fn new(transport: &'a Transport, auth: &'a Authentication) -> Self {
        Self { transport, auth }
    }

    pub fn build_get(&self, project_id: i64) -> Result<HttpRequest, ApiError> {
        let params = CategoryMenuParams {
            token: self.auth.token(),
            project_id,
        };
        self.transport.build_get(CATEGORY_MENU_PATH, &params)
    }

    /// Categories of `project_id`, in server order.
    pub fn get(&self, project_id: i64) -> Result<Reply<CategoryMenu>, ApiError> {
        debug!(project_id, "fetching category menu");
        self.transport.execute(&self.build_get(project_id)?)
    }

    pub fn build_add_or_update(&self, params: &CategoryParams) -> Result<HttpRequest, ApiError> {
        let body = AddCategoryRequest::new(self.auth.token(), params);
        self.transport.build_post(CATEGORY_ADD_PATH, &body)
    }

    /// Create the category, or update it if the server already has it.
    /// Never deletes.
    pub fn add_or_update(&self, params: &CategoryParams) -> Result<Reply<ModifyResponse>, ApiError> {
        debug!(project_id = params.project_id, name = %params.name, "upserting category");
        self.transport.execute(&self.build_add_or_update(params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::Client;

    fn client() -> Client {
        Client::new("http://example.test/", "T").unwrap()
    }

    #[test]
    fn get_encodes_project_id() {
        let req = client().category_menu().build_get(11).unwrap();
        assert_eq!(
            req.url.as_str(),
            "http://example.test/api/interface/getCatMenu?token=T&project_id=11"
        );
    }

    #[test]
    fn add_body_carries_token_and_fields() {
        let params = CategoryParams::new(11, "users").desc("user endpoints");
        let req = client().category_menu().build_add_or_update(&params).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"token":"T","project_id":11,"name":"users","desc":"user endpoints"})
        );
    }

    #[test]
    fn update_body_carries_the_category_id() {
        let params = CategoryParams {
            id: 4,
            ..CategoryParams::new(11, "users")
        };
        let req = client().category_menu().build_add_or_update(&params).unwrap();
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["_id"], 4);
    }
}
