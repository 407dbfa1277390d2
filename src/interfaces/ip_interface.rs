//! IP interface (LIF) adapter
//!
//! Maps network IP interfaces onto `network/ip/interfaces`. Interfaces are
//! immutable once created: there is no modify call, changing a field means
//! delete and recreate.

use crate::error::{Diagnostic, ErrorHandler, ErrorKind};
use crate::ontap::client::RestClient;
use crate::ontap::query::flatten_to_query;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Collection path for IP interfaces
pub const API: &str = "network/ip/interfaces";

/// Projection requested on every read
const READ_FIELDS: &[&str] = &["name", "svm.name", "ip", "scope"];

/// Whether an interface belongs to the cluster or to one SVM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Cluster,
    Svm,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Cluster => "cluster",
            Scope::Svm => "svm",
        }
    }

    /// Scope implied by the owning SVM name (empty means cluster)
    pub fn for_svm(svm_name: &str) -> Self {
        if svm_name.is_empty() {
            Scope::Cluster
        } else {
            Scope::Svm
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cluster" => Ok(Scope::Cluster),
            "svm" => Ok(Scope::Svm),
            other => Err(format!("unknown scope '{}', expected cluster or svm", other)),
        }
    }
}

/// `{name}` reference used for SVMs and nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

impl NamedRef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Address and netmask length
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpAddressMask {
    pub address: String,
    pub netmask: i64,
}

/// Interface as read back from the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpInterfaceRecord {
    pub name: String,
    pub scope: Scope,
    /// Owning SVM, empty for cluster-scoped interfaces
    pub svm_name: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<IpAddressMask>,
}

// Wire shape of a record. ONTAP reports the netmask as a string on GET and
// may omit scope from a POST echo, so both are loosened here and checked in
// `decode_record`.
#[derive(Debug, Deserialize)]
struct IpInterfaceWire {
    #[serde(default)]
    name: String,
    #[serde(default)]
    scope: Option<Scope>,
    #[serde(default)]
    svm: Option<NamedRef>,
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    ip: Option<IpWire>,
}

#[derive(Debug, Deserialize)]
struct IpWire {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    netmask: Option<NetmaskWire>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NetmaskWire {
    Bits(i64),
    Text(String),
}

impl NetmaskWire {
    fn bits(&self) -> Result<i64, String> {
        match self {
            NetmaskWire::Bits(n) => Ok(*n),
            NetmaskWire::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("netmask '{}' is not a bit length", s)),
        }
    }
}

/// Map one JSON record onto an [`IpInterfaceRecord`]
pub fn decode_record(value: &Value) -> Result<IpInterfaceRecord, String> {
    let wire: IpInterfaceWire = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;

    if wire.uuid.is_empty() {
        return Err("record has no uuid".to_string());
    }
    if wire.name.is_empty() {
        return Err(format!("record {} has no name", wire.uuid));
    }

    let svm_name = wire.svm.map(|s| s.name).unwrap_or_default();
    let scope = wire.scope.unwrap_or_else(|| Scope::for_svm(&svm_name));
    match scope {
        Scope::Svm if svm_name.is_empty() => {
            return Err(format!("svm-scoped interface {} has no svm name", wire.uuid));
        }
        Scope::Cluster if !svm_name.is_empty() => {
            return Err(format!(
                "cluster-scoped interface {} is owned by svm {}",
                wire.uuid, svm_name
            ));
        }
        _ => {}
    }

    let ip = match wire.ip {
        Some(IpWire {
            address: Some(address),
            netmask: Some(netmask),
        }) => Some(IpAddressMask {
            address,
            netmask: netmask.bits()?,
        }),
        _ => None,
    };

    Ok(IpInterfaceRecord {
        name: wire.name,
        scope,
        svm_name,
        uuid: wire.uuid,
        ip,
    })
}

/// Narrows a multi-record read; empty fields are unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IpInterfaceFilter {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(rename = "svm.name", skip_serializing_if = "String::is_empty")]
    pub svm_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uuid: String,
}

impl IpInterfaceFilter {
    /// Query parameters for the constrained fields only
    pub fn to_query_values(&self) -> Result<Vec<(String, String)>, String> {
        flatten_to_query(self)
    }

    /// True when `record` satisfies every constrained field
    pub fn matches(&self, record: &IpInterfaceRecord) -> bool {
        (self.name.is_empty() || self.name == record.name)
            && self.scope.map_or(true, |s| s == record.scope)
            && (self.svm_name.is_empty() || self.svm_name == record.svm_name)
            && (self.uuid.is_empty() || self.uuid == record.uuid)
    }
}

/// `location.home_port`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePort {
    pub name: String,
    pub node: NamedRef,
}

/// Optional placement; each directive is independent of the other
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_node: Option<NamedRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_port: Option<HomePort>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.home_node.is_none() && self.home_port.is_none()
    }
}

/// POST body for a new interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpInterfaceBody {
    pub name: String,
    pub svm: NamedRef,
    pub ip: IpAddressMask,
    #[serde(skip_serializing_if = "Location::is_empty")]
    pub location: Location,
}

impl IpInterfaceBody {
    pub fn new(name: &str, svm_name: &str, address: &str, netmask: i64) -> Self {
        Self {
            name: name.to_string(),
            svm: NamedRef::new(svm_name),
            ip: IpAddressMask {
                address: address.to_string(),
                netmask,
            },
            location: Location::default(),
        }
    }

    pub fn with_home_node(mut self, node: &str) -> Self {
        self.location.home_node = Some(NamedRef::new(node));
        self
    }

    pub fn with_home_port(mut self, port: &str, node: &str) -> Self {
        self.location.home_port = Some(HomePort {
            name: port.to_string(),
            node: NamedRef::new(node),
        });
        self
    }
}

/// Read one interface by name, in cluster scope when `svm_name` is empty
///
/// No match is reported as a not-found [`Diagnostic`], never as success.
/// A reply without a `records` member is an empty response, not a miss.
pub async fn get_ip_interface(
    error_handler: &ErrorHandler,
    r: &dyn RestClient,
    name: &str,
    svm_name: &str,
) -> Result<IpInterfaceRecord, Diagnostic> {
    if name.trim().is_empty() {
        return Err(error_handler.make_and_report_error(
            "error reading ip_interface info",
            format!("refusing GET {} without an interface name", API),
            ErrorKind::Encode("empty name".to_string()),
        ));
    }

    let mut query = r.new_query();
    query.set("name", name);
    if svm_name.is_empty() {
        query.set("scope", Scope::Cluster.as_str());
    } else {
        query.set("svm.name", svm_name);
        query.set("scope", Scope::Svm.as_str());
    }
    query.fields(READ_FIELDS);

    let (status_code, response) = match r.get_nil_or_one_record(API, &query).await {
        Ok(result) => result,
        Err(err) => {
            let detail = format!("error on GET {}: {}, statusCode {}", API, err, err.status);
            let kind = if err.empty_response {
                ErrorKind::EmptyResponse {
                    api: API.to_string(),
                }
            } else {
                ErrorKind::Transport {
                    status: err.status,
                    message: err.message,
                }
            };
            return Err(error_handler.make_and_report_error(
                "error reading ip_interface info",
                detail,
                kind,
            ));
        }
    };

    let Some(response) = response else {
        return Err(error_handler.make_and_report_error(
            "error reading ip_interface info",
            format!(
                "error on GET {}: no ip_interface named '{}' in {}, statusCode {}",
                API,
                name,
                if svm_name.is_empty() { "cluster scope" } else { svm_name },
                status_code
            ),
            ErrorKind::NotFound {
                api: API.to_string(),
            },
        ));
    };

    let record = decode_record(&response).map_err(|err| {
        error_handler.make_and_report_error(
            format!("failed to decode response from GET {}", API),
            format!("error: {}, statusCode {}, response {}", err, status_code, response),
            ErrorKind::Decode(err),
        )
    })?;

    tracing::debug!("Read ip_interface data source: {:?}", record);
    Ok(record)
}

/// Read every interface matching `filter` (all of them when `None`)
///
/// Records come back in server order. One undecodable record fails the
/// whole call.
pub async fn get_ip_interfaces(
    error_handler: &ErrorHandler,
    r: &dyn RestClient,
    filter: Option<&IpInterfaceFilter>,
) -> Result<Vec<IpInterfaceRecord>, Diagnostic> {
    let mut query = r.new_query();
    query.fields(READ_FIELDS);
    if let Some(filter) = filter {
        let values = filter.to_query_values().map_err(|err| {
            error_handler.make_and_report_error(
                "error encoding ip_interface filter info",
                format!("error on filter {:?}: {}", filter, err),
                ErrorKind::Encode(err),
            )
        })?;
        query.set_values(values);
    }

    let (status_code, response) = match r.get_zero_or_more_records(API, &query).await {
        Ok(result) => result,
        Err(err) => {
            return Err(error_handler.make_and_report_error(
                "error reading ip_interfaces info",
                format!("error on GET {}: {}, statusCode {}", API, err, err.status),
                ErrorKind::Transport {
                    status: err.status,
                    message: err.message,
                },
            ));
        }
    };

    let Some(response) = response else {
        return Err(error_handler.make_and_report_error(
            "error reading ip_interfaces info",
            format!("error on GET {}: no response for GET {}, statusCode {}", API, API, status_code),
            ErrorKind::EmptyResponse {
                api: API.to_string(),
            },
        ));
    };

    let records = response
        .iter()
        .map(|info| {
            decode_record(info).map_err(|err| {
                error_handler.make_and_report_error(
                    format!("failed to decode response from GET {}", API),
                    format!("error: {}, statusCode {}, info {}", err, status_code, info),
                    ErrorKind::Decode(err),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Read {} ip_interfaces: {:?}", records.len(), records);
    Ok(records)
}

/// Create an interface and return the record the cluster echoes back
///
/// Not idempotent: calling twice asks for two interfaces.
pub async fn create_ip_interface(
    error_handler: &ErrorHandler,
    r: &dyn RestClient,
    body: &IpInterfaceBody,
) -> Result<IpInterfaceRecord, Diagnostic> {
    let body_value = serde_json::to_value(body).map_err(|err| {
        error_handler.make_and_report_error(
            "error encoding ip_interface body",
            format!("error on encoding {} body: {}, body: {:?}", API, err, body),
            ErrorKind::Encode(err.to_string()),
        )
    })?;

    let mut query = r.new_query();
    query.add("return_records", "true");

    let (status_code, response) = match r.call_create_method(API, &query, &body_value).await {
        Ok(result) => result,
        Err(err) => {
            return Err(error_handler.make_and_report_error(
                "error creating ip_interface",
                format!("error on POST {}: {}, statusCode {}", API, err, err.status),
                ErrorKind::Transport {
                    status: err.status,
                    message: err.message,
                },
            ));
        }
    };

    let Some(first) = response.records.first() else {
        return Err(error_handler.make_and_report_error(
            "error creating ip_interface",
            format!("no records returned from POST {}, statusCode {}", API, status_code),
            ErrorKind::EmptyResponse {
                api: API.to_string(),
            },
        ));
    };

    let record = decode_record(first).map_err(|err| {
        error_handler.make_and_report_error(
            "error decoding ip_interface info",
            format!(
                "error on decode {} info: {}, statusCode {}, response {:?}",
                API, err, status_code, response
            ),
            ErrorKind::Decode(err),
        )
    })?;

    tracing::debug!("Create ip_interface source - data: {:?}", record);
    Ok(record)
}

/// Delete the interface with the given uuid
pub async fn delete_ip_interface(
    error_handler: &ErrorHandler,
    r: &dyn RestClient,
    uuid: &str,
) -> Result<(), Diagnostic> {
    // An empty uuid would address the whole collection
    if uuid.trim().is_empty() {
        return Err(error_handler.make_and_report_error(
            "error deleting ip_interface",
            format!("refusing DELETE {} without an interface uuid", API),
            ErrorKind::Encode("empty uuid".to_string()),
        ));
    }

    let api = format!("{}/{}", API, urlencoding::encode(uuid));
    if let Err(err) = r.call_delete_method(&api, None).await {
        return Err(error_handler.make_and_report_error(
            "error deleting ip_interface",
            format!("error on DELETE {}: {}, statusCode {}", api, err, err.status),
            ErrorKind::Transport {
                status: err.status,
                message: err.message,
            },
        ));
    }

    tracing::debug!("Deleted ip_interface {}", uuid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontap::client::RestResponse;
    use crate::ontap::http::RestError;
    use crate::ontap::query::Query;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// One call seen by the recording client
    #[derive(Debug, Clone)]
    struct Call {
        method: &'static str,
        api: String,
        query: Option<Query>,
        body: Option<Value>,
    }

    /// Records every call and answers with canned results
    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<Call>>,
        one: Option<Result<(u16, Option<Value>), RestError>>,
        many: Option<Result<(u16, Option<Vec<Value>>), RestError>>,
        create: Option<Result<(u16, RestResponse), RestError>>,
        delete: Option<Result<(u16, RestResponse), RestError>>,
    }

    impl RecordingClient {
        fn record(&self, method: &'static str, api: &str, query: Option<&Query>, body: Option<&Value>) {
            self.calls.lock().unwrap().push(Call {
                method,
                api: api.to_string(),
                query: query.cloned(),
                body: body.cloned(),
            });
        }

        fn last_call(&self) -> Call {
            self.calls.lock().unwrap().last().cloned().expect("no call recorded")
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RestClient for RecordingClient {
        async fn get_nil_or_one_record(
            &self,
            api: &str,
            query: &Query,
        ) -> Result<(u16, Option<Value>), RestError> {
            self.record("GET", api, Some(query), None);
            self.one.clone().unwrap_or(Ok((200, None)))
        }

        async fn get_zero_or_more_records(
            &self,
            api: &str,
            query: &Query,
        ) -> Result<(u16, Option<Vec<Value>>), RestError> {
            self.record("GET", api, Some(query), None);
            self.many.clone().unwrap_or(Ok((200, Some(Vec::new()))))
        }

        async fn call_create_method(
            &self,
            api: &str,
            query: &Query,
            body: &Value,
        ) -> Result<(u16, RestResponse), RestError> {
            self.record("POST", api, Some(query), Some(body));
            self.create.clone().unwrap_or(Ok((201, RestResponse::default())))
        }

        async fn call_delete_method(
            &self,
            api: &str,
            query: Option<&Query>,
        ) -> Result<(u16, RestResponse), RestError> {
            self.record("DELETE", api, query, None);
            self.delete.clone().unwrap_or(Ok((200, RestResponse::default())))
        }
    }

    fn svm_record() -> Value {
        json!({
            "uuid": "1f9a1b2e-5f0c-11ee-9d2c-005056bb1234",
            "name": "lif1",
            "scope": "svm",
            "svm": {"name": "vs1", "uuid": "aa11"},
            "ip": {"address": "10.0.0.5", "netmask": "24", "family": "ipv4"}
        })
    }

    fn cluster_record(name: &str, uuid: &str) -> Value {
        json!({"uuid": uuid, "name": name, "scope": "cluster"})
    }

    #[tokio::test]
    async fn test_get_one_cluster_scope_query() {
        let client = RecordingClient {
            one: Some(Ok((200, Some(cluster_record("lif1", "u-1"))))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interface");

        let record = get_ip_interface(&handler, &client, "lif1", "").await.unwrap();
        assert_eq!(record.scope, Scope::Cluster);
        assert_eq!(record.svm_name, "");

        let call = client.last_call();
        let query = call.query.unwrap();
        assert_eq!(call.api, API);
        assert_eq!(query.get("name"), Some("lif1"));
        assert_eq!(query.get("scope"), Some("cluster"));
        assert!(!query.contains("svm.name"));
        assert_eq!(query.get("fields"), Some("name,svm.name,ip,scope"));
    }

    #[tokio::test]
    async fn test_get_one_svm_scope_query() {
        let client = RecordingClient {
            one: Some(Ok((200, Some(svm_record())))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interface");

        let record = get_ip_interface(&handler, &client, "lif1", "vs1").await.unwrap();
        assert_eq!(record.name, "lif1");
        assert_eq!(record.svm_name, "vs1");
        assert_eq!(
            record.ip,
            Some(IpAddressMask {
                address: "10.0.0.5".to_string(),
                netmask: 24
            })
        );

        let query = client.last_call().query.unwrap();
        assert_eq!(query.to_query_string(), "name=lif1&svm.name=vs1&scope=svm&fields=name%2Csvm.name%2Cip%2Cscope");
    }

    #[tokio::test]
    async fn test_get_one_nil_response_is_not_found_error() {
        let client = RecordingClient::default();
        let handler = ErrorHandler::new("ip_interface");

        let err = get_ip_interface(&handler, &client, "lif1", "vs1").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.summary, "error reading ip_interface info");
        assert_eq!(handler.diagnostics().len(), 1);
    }

    #[tokio::test]
    async fn test_get_one_missing_records_member_is_empty_response() {
        let client = RecordingClient {
            one: Some(Err(RestError::empty_response(200, API))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interface");

        let err = get_ip_interface(&handler, &client, "lif1", "").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EmptyResponse { .. }));
        assert!(!err.is_not_found());
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_get_one_without_name_sends_nothing() {
        let client = RecordingClient::default();
        let handler = ErrorHandler::new("ip_interface");

        let err = get_ip_interface(&handler, &client, "", "vs1").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Encode(_)));
        assert!(!err.is_not_found());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_get_one_transport_error_keeps_status() {
        let client = RecordingClient {
            one: Some(Err(RestError::new(401, "not authorized"))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interface");

        let err = get_ip_interface(&handler, &client, "lif1", "").await.unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        assert!(err.detail.contains("not authorized"));
        assert!(err.detail.contains("statusCode 401"));
    }

    #[tokio::test]
    async fn test_get_one_decode_error() {
        let client = RecordingClient {
            one: Some(Ok((200, Some(json!({"uuid": "u-1", "name": "lif1", "scope": "node"}))))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interface");

        let err = get_ip_interface(&handler, &client, "lif1", "").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Decode(_)));
        assert_eq!(err.summary, "failed to decode response from GET network/ip/interfaces");
    }

    #[tokio::test]
    async fn test_get_many_without_filter_only_selects_fields() {
        let client = RecordingClient {
            many: Some(Ok((
                200,
                Some(vec![cluster_record("b", "u-2"), cluster_record("a", "u-1")]),
            ))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interfaces");

        let records = get_ip_interfaces(&handler, &client, None).await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);

        let query = client.last_call().query.unwrap();
        assert_eq!(query.pairs().len(), 1);
        assert!(query.contains("fields"));
    }

    #[tokio::test]
    async fn test_get_many_filter_skips_empty_fields() {
        let client = RecordingClient::default();
        let handler = ErrorHandler::new("ip_interfaces");
        let filter = IpInterfaceFilter {
            svm_name: "vs1".to_string(),
            scope: Some(Scope::Svm),
            ..Default::default()
        };

        let records = get_ip_interfaces(&handler, &client, Some(&filter)).await.unwrap();
        assert!(records.is_empty());

        let query = client.last_call().query.unwrap();
        assert_eq!(query.get("svm.name"), Some("vs1"));
        assert_eq!(query.get("scope"), Some("svm"));
        assert!(!query.contains("name"));
        assert!(!query.contains("uuid"));
    }

    #[tokio::test]
    async fn test_get_many_missing_records_is_empty_response() {
        let client = RecordingClient {
            many: Some(Ok((200, None))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interfaces");

        let err = get_ip_interfaces(&handler, &client, None).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_get_many_decode_is_all_or_nothing() {
        let client = RecordingClient {
            many: Some(Ok((
                200,
                Some(vec![cluster_record("a", "u-1"), json!({"name": "broken"})]),
            ))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interfaces");

        let err = get_ip_interfaces(&handler, &client, None).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Decode(_)));
        assert!(err.detail.contains("broken"));
    }

    #[tokio::test]
    async fn test_create_without_placement_omits_location() {
        let client = RecordingClient {
            create: Some(Ok((201, RestResponse {
                num_records: 1,
                records: vec![json!({
                    "uuid": "u-9",
                    "name": "lif1",
                    "svm": {"name": "vs1"},
                    "ip": {"address": "10.0.0.5", "netmask": 24}
                })],
            }))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interface");
        let body = IpInterfaceBody::new("lif1", "vs1", "10.0.0.5", 24);

        let record = create_ip_interface(&handler, &client, &body).await.unwrap();
        assert_eq!(record.name, "lif1");
        assert_eq!(record.svm_name, "vs1");
        assert_eq!(record.scope, Scope::Svm);
        assert_eq!(record.uuid, "u-9");

        let call = client.last_call();
        assert_eq!(call.method, "POST");
        assert_eq!(call.query.unwrap().get("return_records"), Some("true"));
        assert_eq!(
            call.body.unwrap(),
            json!({
                "name": "lif1",
                "svm": {"name": "vs1"},
                "ip": {"address": "10.0.0.5", "netmask": 24}
            })
        );
    }

    #[test]
    fn test_body_placement_directives_are_independent() {
        let node_only = IpInterfaceBody::new("lif1", "vs1", "10.0.0.5", 24).with_home_node("node1");
        assert_eq!(
            serde_json::to_value(&node_only).unwrap()["location"],
            json!({"home_node": {"name": "node1"}})
        );

        let port_only = IpInterfaceBody::new("lif1", "vs1", "10.0.0.5", 24).with_home_port("e0c", "node2");
        assert_eq!(
            serde_json::to_value(&port_only).unwrap()["location"],
            json!({"home_port": {"name": "e0c", "node": {"name": "node2"}}})
        );

        let both = node_only.with_home_port("e0d", "node1");
        let location = &serde_json::to_value(&both).unwrap()["location"];
        assert_eq!(location["home_node"]["name"], "node1");
        assert_eq!(location["home_port"]["name"], "e0d");
    }

    #[tokio::test]
    async fn test_create_with_no_records_is_empty_response() {
        let client = RecordingClient::default();
        let handler = ErrorHandler::new("ip_interface");
        let body = IpInterfaceBody::new("lif1", "vs1", "10.0.0.5", 24);

        let err = create_ip_interface(&handler, &client, &body).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EmptyResponse { .. }));
        assert!(err.detail.contains("no records returned"));
    }

    #[tokio::test]
    async fn test_create_rejection_surfaces_status() {
        let client = RecordingClient {
            create: Some(Err(RestError::new(409, "Duplicate interface name"))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interface");
        let body = IpInterfaceBody::new("lif1", "vs1", "10.0.0.5", 24);

        let err = create_ip_interface(&handler, &client, &body).await.unwrap_err();
        assert_eq!(err.summary, "error creating ip_interface");
        assert_eq!(err.status_code(), Some(409));
    }

    #[tokio::test]
    async fn test_delete_addresses_uuid() {
        let client = RecordingClient::default();
        let handler = ErrorHandler::new("ip_interface");

        delete_ip_interface(&handler, &client, "u-1").await.unwrap();
        let call = client.last_call();
        assert_eq!(call.method, "DELETE");
        assert_eq!(call.api, "network/ip/interfaces/u-1");
        assert!(call.body.is_none());
    }

    #[tokio::test]
    async fn test_delete_not_found_is_transport_error() {
        let client = RecordingClient {
            delete: Some(Err(RestError::new(404, "entry doesn't exist"))),
            ..Default::default()
        };
        let handler = ErrorHandler::new("ip_interface");

        let err = delete_ip_interface(&handler, &client, "u-1").await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.summary, "error deleting ip_interface");
    }

    #[tokio::test]
    async fn test_delete_without_uuid_sends_nothing() {
        let client = RecordingClient::default();
        let handler = ErrorHandler::new("ip_interface");

        let err = delete_ip_interface(&handler, &client, "  ").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Encode(_)));
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_decode_rejects_inconsistent_scope() {
        assert!(decode_record(&json!({"uuid": "u", "name": "a", "scope": "svm"})).is_err());
        assert!(decode_record(&json!({
            "uuid": "u", "name": "a", "scope": "cluster", "svm": {"name": "vs1"}
        }))
        .is_err());
    }

    #[test]
    fn test_decode_requires_uuid_and_numeric_netmask() {
        assert!(decode_record(&json!({"name": "a", "scope": "cluster"})).is_err());
        assert!(decode_record(&json!({
            "uuid": "u", "name": "a", "ip": {"address": "10.0.0.1", "netmask": "255.255.255.0"}
        }))
        .is_err());
    }

    #[test]
    fn test_decode_requires_name() {
        let err = decode_record(&json!({"uuid": "u-1", "scope": "cluster"})).unwrap_err();
        assert!(err.contains("no name"));
        assert!(decode_record(&json!({"uuid": "u-1", "name": "", "scope": "cluster"})).is_err());
    }

    #[test]
    fn test_scope_display_honours_width() {
        assert_eq!(format!("[{:<8}]", Scope::Svm), "[svm     ]");
        assert_eq!(format!("[{:>8}]", Scope::Cluster), "[ cluster]");
        assert_eq!(Scope::Svm.to_string(), "svm");
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("SVM".parse::<Scope>(), Ok(Scope::Svm));
        assert_eq!("cluster".parse::<Scope>(), Ok(Scope::Cluster));
        assert!("node".parse::<Scope>().is_err());
    }
}
