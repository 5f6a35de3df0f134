//! Response envelope and the records carried inside it.
//!
//! # Design
//! Every endpoint answers with `{"errcode", "errmsg", "data"}`. The envelope
//! is generic over `data`; `null` or missing data decodes to the payload's
//! default value. Records default their missing fields, since the remote API
//! omits fields freely between versions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The `{errcode, errmsg, data}` wrapper shared by all responses.
///
/// `errcode == 0` signals success. The client never branches on it; callers
/// check [`Envelope::is_success`] after a successful call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }

    pub fn common(&self) -> CommonResponse {
        CommonResponse {
            errcode: self.errcode,
            errmsg: self.errmsg.clone(),
        }
    }
}

impl Envelope<Value> {
    /// Modification summary of an update, when the payload carries one.
    ///
    /// Updates answer with `{ok, nModified, n}`, sometimes wrapped in a
    /// one-element array. Creates answer with the new record instead and
    /// yield `None`.
    pub fn modify_result(&self) -> Option<ModifyResult> {
        let candidate = match &self.data {
            Value::Array(items) if items.len() == 1 => &items[0],
            other => other,
        };
        let object = candidate.as_object()?;
        if !object.contains_key("nModified") && !object.contains_key("n") {
            return None;
        }
        serde_json::from_value(candidate.clone()).ok()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The envelope without its payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonResponse {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyResult {
    pub ok: i64,
    #[serde(rename = "nModified")]
    pub n_modified: i64,
    pub n: i64,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvHeader {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvGlobal {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// One deployment environment of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEnv {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<EnvHeader>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global: Vec<EnvGlobal>,
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    #[serde(rename = "_id")]
    pub id: i64,
    pub uid: i64,
    pub group_id: i64,
    pub name: String,
    pub role: bool,
    pub env: Vec<ProjectEnv>,
}

pub type Project = Envelope<ProjectData>;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A named group of interfaces within a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryData {
    #[serde(rename = "_id")]
    pub id: i64,
    pub uid: i64,
    pub name: String,
    pub desc: String,
}

pub type CategoryMenu = Envelope<Vec<CategoryData>>;

/// Envelope of the modifying endpoints; the payload shape varies.
pub type ModifyResponse = Envelope<Value>;

// ---------------------------------------------------------------------------
// Interface
// ---------------------------------------------------------------------------

/// A name/value pair of a path parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqParam {
    pub name: String,
    pub value: String,
    pub example: String,
    pub desc: String,
}

/// A typed header, query or form field. `required` is `"1"` or `"0"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqField {
    pub name: String,
    pub value: String,
    pub example: String,
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: String,
}

/// A documented endpoint: route, method, request schemas and response schema.
///
/// `id == 0` marks a definition not yet stored remotely; saving it creates a
/// new interface. A non-zero id updates the existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceData {
    #[serde(rename = "_id")]
    pub id: i64,
    pub uid: i64,
    #[serde(rename = "catid")]
    pub cat_id: i64,
    pub project_id: i64,
    pub edit_uid: i64,
    pub add_time: i64,
    pub up_time: i64,
    pub status: String,
    pub title: String,
    pub path: String,
    pub method: String,
    pub tag: Vec<String>,

    pub req_params: Vec<ReqParam>,
    pub req_headers: Vec<ReqField>,
    pub req_query: Vec<ReqField>,
    pub req_body_form: Vec<ReqField>,
    pub req_body_is_json_schema: bool,
    pub req_body_type: String,
    pub req_body_other: String,

    pub res_body_is_json_schema: bool,
    pub res_body_type: String,
    pub res_body: String,
}

impl InterfaceData {
    pub fn is_new(&self) -> bool {
        self.id == 0
    }
}

pub type Interface = Envelope<InterfaceData>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceListData {
    pub count: i64,
    pub total: i64,
    pub list: Vec<InterfaceData>,
}

pub type InterfaceList = Envelope<InterfaceListData>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_envelope_decodes() {
        let body = r#"{"errcode":0,"errmsg":"","data":{"_id":1,"uid":2,"group_id":0,"name":"demo","role":false,"env":[]}}"#;
        let project: Project = serde_json::from_str(body).unwrap();
        assert!(project.is_success());
        assert_eq!(project.data.id, 1);
        assert_eq!(project.data.uid, 2);
        assert_eq!(project.data.name, "demo");
        assert!(project.data.env.is_empty());
    }

    #[test]
    fn null_data_decodes_to_default() {
        let body = r#"{"errcode":40011,"errmsg":"token invalid","data":null}"#;
        let project: Project = serde_json::from_str(body).unwrap();
        assert!(!project.is_success());
        assert_eq!(project.data, ProjectData::default());
        assert_eq!(project.common().errmsg, "token invalid");
    }

    #[test]
    fn missing_data_decodes_to_default() {
        let menu: CategoryMenu = serde_json::from_str(r#"{"errcode":0,"errmsg":"ok"}"#).unwrap();
        assert!(menu.data.is_empty());
    }

    #[test]
    fn empty_env_fields_are_omitted_when_serialized() {
        let env = ProjectEnv {
            id: "e1".to_string(),
            name: "local".to_string(),
            domain: "http://127.0.0.1".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&env).unwrap();
        assert!(json.get("header").is_none());
        assert!(json.get("global").is_none());
        assert_eq!(json["_id"], "e1");

        let header = EnvHeader {
            name: "X-Env".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&header).unwrap();
        assert!(json.get("_id").is_none());
        assert!(json.get("value").is_none());
        assert_eq!(json["name"], "X-Env");
    }

    #[test]
    fn interface_uses_wire_names() {
        let data = InterfaceData {
            id: 9,
            cat_id: 3,
            req_headers: vec![ReqField {
                name: "Content-Type".to_string(),
                kind: "text".to_string(),
                required: "1".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["_id"], 9);
        assert_eq!(json["catid"], 3);
        assert_eq!(json["req_headers"][0]["type"], "text");
        assert_eq!(json["req_headers"][0]["required"], "1");
    }

    #[test]
    fn interface_tolerates_missing_fields() {
        let data: InterfaceData =
            serde_json::from_str(r#"{"_id":5,"title":"Ping","method":"GET","path":"/ping"}"#).unwrap();
        assert_eq!(data.id, 5);
        assert!(!data.is_new());
        assert!(data.req_query.is_empty());
    }

    #[test]
    fn modify_result_from_object_or_single_element_array() {
        let direct: ModifyResponse =
            serde_json::from_str(r#"{"errcode":0,"errmsg":"","data":{"ok":1,"nModified":1,"n":1}}"#).unwrap();
        assert_eq!(
            direct.modify_result(),
            Some(ModifyResult { ok: 1, n_modified: 1, n: 1 })
        );

        let wrapped: ModifyResponse =
            serde_json::from_str(r#"{"errcode":0,"errmsg":"","data":[{"ok":1,"nModified":0,"n":1}]}"#).unwrap();
        assert_eq!(wrapped.modify_result().map(|r| r.n_modified), Some(0));
    }

    #[test]
    fn created_record_is_not_a_modify_result() {
        let created: ModifyResponse =
            serde_json::from_str(r#"{"errcode":0,"errmsg":"","data":{"_id":12,"name":"new"}}"#).unwrap();
        assert_eq!(created.modify_result(), None);
    }
}
