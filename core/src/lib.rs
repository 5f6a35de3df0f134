//! Blocking client for the YApi open API.
//!
//! # Overview
//! Typed access to project metadata, category menus and interface
//! definitions of an interface-documentation server, plus bulk import of a
//! Swagger document. Every call sends one HTTP request carrying the project
//! token and returns the decoded `{errcode, errmsg, data}` envelope together
//! with the raw response.
//!
//! # Design
//! - `Client` holds the base URL, the `ureq` agent and the token; services
//!   are borrowed views created per call.
//! - Each operation has a pure `build_*` step producing an `HttpRequest`, so
//!   URLs, queries and bodies can be checked without a server.
//! - Non-2xx statuses and undecodable bodies become `ApiError`s. A non-zero
//!   `errcode` does not; callers check the envelope.
//! - Nothing is retried or cached.

pub mod auth;
pub mod category;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interface;
pub mod project;
pub mod query;
pub mod transport;
pub mod types;

pub use auth::Authentication;
pub use category::{CategoryMenuService, CategoryParams};
pub use client::Client;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interface::{InterfaceListParams, InterfaceService};
pub use project::ProjectService;
pub use query::{Query, ToQuery};
pub use transport::{check_response, decode, Reply, Transport};
pub use types::{
    CategoryData, CategoryMenu, CommonResponse, Envelope, Interface, InterfaceData, InterfaceList,
    InterfaceListData, ModifyResponse, ModifyResult, Project, ProjectData, ProjectEnv, ReqField,
    ReqParam,
};
