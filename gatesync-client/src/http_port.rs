//! `reqwest`-based implementation of `gatesync_registry::EntityPort` against
//! the Gateway's generic per-kind admin-API shape:
//! `PUT/GET/DELETE /{kind}/{id}`, `GET /schemas/{kind}`.

use async_trait::async_trait;
use gatesync_build::natural_key;
use gatesync_core::entity::Timestamps;
use gatesync_core::{Entity, EntityKind};
use gatesync_registry::{EntityPort, PortError};
use gatesync_store::SchemaDescriptor;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// One port per entity kind, all sharing the same underlying client and
/// base URL — the kind just changes the path segment and, for responses,
/// how the natural key is re-derived.
pub struct HttpEntityPort {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    kind: EntityKind,
}

impl HttpEntityPort {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>, kind: EntityKind) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            kind,
        }
    }

    fn kind_path(&self) -> String {
        self.kind.to_string()
    }

    fn entity_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.kind_path(), id)
    }

    fn schema_url(&self) -> String {
        format!("{}/schemas/{}", self.base_url, self.kind_path())
    }

    fn request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("Kong-Admin-Token", key),
            None => req,
        }
    }

    /// Builds the wire body from an entity's `attrs`, folding in the fields
    /// the envelope carries separately (`id`, `tags`) the way the
    /// declarative document itself nests them.
    fn to_wire_body(entity: &Entity) -> Value {
        let mut body = entity.attrs.clone();
        if !body.is_object() {
            body = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut body {
            if let Some(id) = &entity.id {
                map.insert("id".to_string(), Value::String(id.clone()));
            }
            if !entity.tags.is_empty() {
                map.insert("tags".to_string(), Value::from(entity.tags.clone()));
            }
        }
        body
    }

    /// Reconstructs the result entity from a successful response, using the
    /// request entity as a template for everything the response doesn't
    /// override (natural key, foreign refs, `id_declared`) since a
    /// successful CRUD echoes back the same relationships it was given.
    fn merge_response(template: &Entity, mut body: Value) -> Entity {
        let mut result = template.clone();
        let (created_at, updated_at) = match &mut body {
            Value::Object(map) => (
                map.remove("created_at").and_then(|v| v.as_i64()),
                map.remove("updated_at").and_then(|v| v.as_i64()),
            ),
            _ => (None, None),
        };
        if let Value::Object(map) = &body {
            if let Some(Value::String(id)) = map.get("id") {
                result.id = Some(id.clone());
            }
        }
        result.timestamps = Timestamps { created_at, updated_at };
        result.attrs = body;
        result
    }

    async fn send_for_entity(
        &self,
        template: &Entity,
        req: reqwest::RequestBuilder,
    ) -> Result<Entity, PortError> {
        let resp = req.send().await.map_err(|e| PortError::Permanent {
            status: 0,
            message: e.to_string(),
        })?;
        let status = resp.status();
        let body_text = resp.text().await.unwrap_or_default();
        if status.is_success() {
            let body: Value = serde_json::from_str(&body_text).unwrap_or(Value::Null);
            return Ok(Self::merge_response(template, body));
        }
        Err(classify(status, body_text))
    }
}

fn classify(status: StatusCode, body: String) -> PortError {
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        PortError::Http500(body)
    } else if status == StatusCode::NOT_FOUND {
        PortError::NotFound
    } else {
        PortError::Permanent {
            status: status.as_u16(),
            message: body,
        }
    }
}

#[async_trait]
impl EntityPort for HttpEntityPort {
    async fn create(&self, entity: &Entity) -> Result<Entity, PortError> {
        let id = entity.id.as_deref().ok_or_else(|| PortError::Permanent {
            status: 0,
            message: "create requires an assigned id".to_string(),
        })?;
        let body = Self::to_wire_body(entity);
        let req = self.request(self.client.put(self.entity_url(id)).json(&body));
        self.send_for_entity(entity, req).await
    }

    async fn update(&self, entity: &Entity) -> Result<Entity, PortError> {
        self.create(entity).await
    }

    async fn delete(&self, entity: &Entity) -> Result<(), PortError> {
        let id = entity.id.as_deref().ok_or_else(|| PortError::Permanent {
            status: 0,
            message: "delete requires an assigned id".to_string(),
        })?;
        let req = self.request(self.client.delete(self.entity_url(id)));
        let resp = req.send().await.map_err(|e| PortError::Permanent {
            status: 0,
            message: e.to_string(),
        })?;
        let status = resp.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(classify(status, body))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Entity>, PortError> {
        let req = self.request(self.client.get(self.entity_url(id)));
        let resp = req.send().await.map_err(|e| PortError::Permanent {
            status: 0,
            message: e.to_string(),
        })?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body_text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(classify(status, body_text));
        }
        let body: Value = serde_json::from_str(&body_text).unwrap_or(Value::Null);
        let natural_key = natural_key::extract(self.kind, &body);
        let mut entity = Entity::new(self.kind, natural_key, body.clone());
        entity.id = body.get("id").and_then(Value::as_str).map(str::to_string);
        Ok(Some(entity))
    }

    async fn get_full_schema(&self) -> Result<Option<SchemaDescriptor>, PortError> {
        let req = self.request(self.client.get(self.schema_url()));
        let resp = match req.send().await {
            Ok(r) => r,
            Err(_) => return Ok(None),
        };
        if !resp.status().is_success() {
            return Ok(None);
        }
        let body: Value = match resp.json().await {
            Ok(b) => b,
            Err(_) => return Ok(None),
        };
        let defaults = match body.get("defaults").and_then(Value::as_object) {
            Some(map) => map.clone(),
            None => body.as_object().cloned().unwrap_or_default(),
        };
        Ok(Some(SchemaDescriptor { defaults }))
    }
}
