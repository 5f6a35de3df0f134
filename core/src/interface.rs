//! Interface definitions: listing, fetching, upserting and bulk import.
//!
//! # Design
//! - Listing pages through a project (or one category when `cat_id` is
//!   non-zero). `Page` and `limit` are sent as given, so page 0 returns an
//!   empty page.
//! - Upsert posts the token next to the flattened [`InterfaceData`] record.
//!   `_id == 0` creates, anything else updates that definition.
//! - Swagger import always uses the `swagger` type and `merge` mode, so
//!   importing the same document twice leaves one copy of each definition.

use serde::Serialize;
use tracing::debug;

use crate::auth::Authentication;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::query::{Query, ToQuery};
use crate::transport::{Reply, Transport};
use crate::types::{Interface, InterfaceData, InterfaceList, ModifyResponse};

pub const INTERFACE_LIST_PATH: &str = "api/interface/list_cat";
pub const INTERFACE_GET_PATH: &str = "api/interface/get";
pub const INTERFACE_SAVE_PATH: &str = "api/interface/save";
pub const IMPORT_DATA_PATH: &str = "api/open/import_data";

/// Import format understood by `api/open/import_data`.
pub const IMPORT_TYPE_SWAGGER: &str = "swagger";
/// Imported definitions are merged into the existing ones.
pub const IMPORT_MODE_MERGE: &str = "merge";

/// Caller input for listing interfaces.
///
/// `cat_id == 0` lists across every category the token can see. `page` and
/// `limit` are sent as given; out-of-range values yield an empty page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceListParams {
    pub cat_id: i64,
    pub page: u32,
    pub limit: u32,
}

impl InterfaceListParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            cat_id: 0,
            page,
            limit,
        }
    }

    pub fn category(mut self, cat_id: i64) -> Self {
        self.cat_id = cat_id;
        self
    }
}

/// Query of `api/interface/list_cat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceListQuery<'a> {
    pub token: &'a str,
    pub params: InterfaceListParams,
}

impl ToQuery for InterfaceListQuery<'_> {
    fn write_query(&self, query: &mut Query) {
        query
            .push_nonempty("token", self.token)
            .push_nonzero("catid", self.params.cat_id)
            .push("Page", self.params.page)
            .push("limit", self.params.limit);
    }
}

/// Query of `api/interface/get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceParams<'a> {
    pub token: &'a str,
    pub id: i64,
}

impl ToQuery for InterfaceParams<'_> {
    fn write_query(&self, query: &mut Query) {
        query.push("token", self.token).push("id", self.id);
    }
}

/// JSON body of `api/interface/save`: the token next to the full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveInterfaceRequest<'a> {
    pub token: &'a str,
    #[serde(flatten)]
    pub data: &'a InterfaceData,
}

/// JSON body of `api/open/import_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportDataRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub json: &'a str,
    pub merge: &'static str,
    pub token: &'a str,
}

impl<'a> ImportDataRequest<'a> {
    pub fn swagger(token: &'a str, document: &'a str) -> Self {
        Self {
            kind: IMPORT_TYPE_SWAGGER,
            json: document,
            merge: IMPORT_MODE_MERGE,
            token,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InterfaceService<'a> {
    transport: &'a Transport,
    auth: &'a Authentication,
}

impl<'a> InterfaceService<'a> {
    pub(crate) fn new(transport: &'a Transport, auth: &'a Authentication) -> Self {
        Self { transport, auth }
    }

    pub fn build_get_list(&self, params: InterfaceListParams) -> Result<HttpRequest, ApiError> {
        let query = InterfaceListQuery {
            token: self.auth.token(),
            params,
        };
        self.transport.build_get(INTERFACE_LIST_PATH, &query)
    }

    /// One page of interfaces, optionally restricted to a category.
    pub fn get_list(&self, params: InterfaceListParams) -> Result<Reply<InterfaceList>, ApiError> {
        debug!(cat_id = params.cat_id, page = params.page, limit = params.limit, "listing interfaces");
        self.transport.execute(&self.build_get_list(params)?)
    }

    pub fn build_get(&self, id: i64) -> Result<HttpRequest, ApiError> {
        let params = InterfaceParams {
            token: self.auth.token(),
            id,
        };
        self.transport.build_get(INTERFACE_GET_PATH, &params)
    }

    /// Full definition of interface `id`.
    pub fn get(&self, id: i64) -> Result<Reply<Interface>, ApiError> {
        debug!(id, "fetching interface");
        self.transport.execute(&self.build_get(id)?)
    }

    pub fn build_add_or_update(&self, data: &InterfaceData) -> Result<HttpRequest, ApiError> {
        let body = SaveInterfaceRequest {
            token: self.auth.token(),
            data,
        };
        self.transport.build_post(INTERFACE_SAVE_PATH, &body)
    }

    /// Save `data`: created when `data.id == 0`, otherwise updated in place.
    pub fn add_or_update(&self, data: &InterfaceData) -> Result<Reply<ModifyResponse>, ApiError> {
        if data.is_new() {
            debug!(method = %data.method, path = %data.path, "creating interface");
        } else {
            debug!(id = data.id, "updating interface");
        }
        self.transport.execute(&self.build_add_or_update(data)?)
    }

    pub fn build_upload_swagger(&self, document: &str) -> Result<HttpRequest, ApiError> {
        let body = ImportDataRequest::swagger(self.auth.token(), document);
        self.transport.build_post(IMPORT_DATA_PATH, &body)
    }

    /// Import a whole Swagger/OpenAPI document, merging with what exists.
    pub fn upload_swagger(&self, document: &str) -> Result<Reply<ModifyResponse>, ApiError> {
        debug!(bytes = document.len(), "importing swagger document");
        self.transport.execute(&self.build_upload_swagger(document)?)
    }
}
