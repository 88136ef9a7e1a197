//! Kind-specific normalization rules. Expressed as explicit normalization
//! functions rather than `#[serde(default = "fn")]` since these fields are
//! runtime-computed from declared strings (a URL to split, an IPv6 literal
//! to expand), not pure serde defaults.

use gatesync_core::CoreError;
use serde_json::{Map, Value};
use std::net::Ipv6Addr;

fn obj_mut(attrs: &mut Value) -> &mut Map<String, Value> {
    if !attrs.is_object() {
        *attrs = Value::Object(Map::new());
    }
    attrs.as_object_mut().expect("just ensured object")
}

/// S1: service defaults — `protocol: "http"`, and the three 60s timeouts,
/// applied only when the field is unspecified.
pub fn normalize_service(attrs: &mut Value) {
    let map = obj_mut(attrs);
    map.entry("protocol").or_insert_with(|| Value::String("http".to_string()));
    map.entry("connect_timeout").or_insert(Value::Number(60000.into()));
    map.entry("write_timeout").or_insert(Value::Number(60000.into()));
    map.entry("read_timeout").or_insert(Value::Number(60000.into()));

    // Split a declared `url` into scheme/host/port/path, mirroring how
    // decK-style documents accept a single convenience URL field.
    if let Some(Value::String(url)) = map.remove("url") {
        if let Some((scheme, rest)) = url.split_once("://") {
            let (host_port, path) = rest.split_once('/').map_or((rest, ""), |(h, p)| (h, p));
            let (host, port) = host_port
                .rsplit_once(':')
                .map_or((host_port, None), |(h, p)| (h, p.parse::<u64>().ok()));
            map.insert("protocol".to_string(), Value::String(scheme.to_string()));
            map.insert("host".to_string(), Value::String(host.to_string()));
            if let Some(port) = port {
                map.insert("port".to_string(), Value::Number(port.into()));
            }
            if !path.is_empty() {
                map.insert("path".to_string(), Value::String(format!("/{path}")));
            }
        }
    }
}

const NON_HTTP_PROTOCOLS: &[&str] = &["tcp", "udp", "tls", "grpc", "grpcs"];

/// S3 + expression-mode rules: `strip_path` cannot be explicitly `true`
/// when any declared protocol is a non-HTTP streaming scheme; it is forced
/// to `false` when unspecified under that condition. Expression-mode
/// routes (carrying an `expression` field) drop the traditional-only
/// `regex_priority`/`path_handling` fields when the gateway version
/// doesn't support them, and default `priority` to 0.
pub fn normalize_route(attrs: &mut Value, gateway_supports_expressions: bool) -> Result<(), CoreError> {
    let protocols: Vec<String> = attrs
        .get("protocols")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    let has_non_http = protocols.iter().any(|p| NON_HTTP_PROTOCOLS.contains(&p.as_str()));

    let map = obj_mut(attrs);

    if has_non_http {
        match map.get("strip_path") {
            Some(Value::Bool(true)) => {
                return Err(CoreError::Validation {
                    kind: "route".to_string(),
                    message: "strip_path: cannot set true for non-HTTP protocol".to_string(),
                });
            }
            _ => {
                map.insert("strip_path".to_string(), Value::Bool(false));
            }
        }
    }

    let is_expression = map.contains_key("expression");
    if is_expression {
        if !gateway_supports_expressions {
            map.remove("regex_priority");
            map.remove("path_handling");
        }
        map.entry("priority").or_insert(Value::Number(0.into()));
    }

    Ok(())
}

/// S4: expand a target address's IPv6 literal to its canonical fully
/// expanded `[aaaa:bbbb:...]:port` form, defaulting the port to 8000 when
/// absent. Non-IPv6 targets (plain host:port, IPv4) pass through
/// unchanged.
pub fn normalize_target_address(target: &str) -> String {
    let Some(bracket_end) = target.strip_prefix('[').and_then(|rest| rest.find(']')) else {
        return target.to_string();
    };
    let host = &target[1..=bracket_end];
    let remainder = &target[bracket_end + 2..];

    let Ok(addr) = host.parse::<Ipv6Addr>() else {
        return target.to_string();
    };

    let port: &str = remainder.strip_prefix(':').unwrap_or("8000");
    let port = if port.is_empty() { "8000" } else { port };

    format!("[{}]:{}", expand_ipv6(addr), port)
}

fn expand_ipv6(addr: Ipv6Addr) -> String {
    addr.segments()
        .iter()
        .map(|seg| format!("{seg:04x}"))
        .collect::<Vec<_>>()
        .join(":")
}
