//! Schema-driven entities: JSON casting in both directions plus the REST
//! verbs of the entity's endpoint.

mod caster;
mod entity;
mod groups;
mod value;

pub use caster::Caster;
pub use entity::Entity;
pub use value::PropertyValue;

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use restmodel_domain::json::{is_truthy, to_display_string};
use restmodel_domain::{
    DomainError, DomainResult, HttpMethod, PropertyKind, QueryParameters, RequestPayload, Response,
    Schema,
};

use crate::api::Api;
use crate::error::ApplicationResult;
use crate::events::{HasResponseEvents, ResponseEvents};
use crate::query_builder::QueryBuilder;
use crate::request::Request;
use groups::{Accessors, Attributes, Counts, PropertyGroup, Relations, Values};

/// An entity instance described by a static [`Schema`].
///
/// `Clone` copies the instance as configured: values, query parameters,
/// headers and pending request callbacks, under a fresh request identity.
/// [`Model::clone_entity`] instead copies only the data, through its wire
/// form, keeping nothing but the client.
#[derive(Clone)]
pub struct Model {
    schema: &'static Schema,
    values: Values,
    request: Request,
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.values == other.values
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("schema", &self.schema.name())
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Creates an instance holding the declared defaults.
    #[must_use]
    pub fn new(schema: &'static Schema) -> Self {
        let mut values = Values::new();
        Accessors::initialize_defaults(schema, &mut values);
        Attributes::initialize_defaults(schema, &mut values);
        Counts::initialize_defaults(schema, &mut values);
        Relations::initialize_defaults(schema, &mut values);
        Self {
            schema,
            values,
            request: Request::default(),
        }
    }

    /// Casts a wire object into a new instance.
    #[must_use]
    pub fn from_json(schema: &'static Schema, json: &Value) -> Self {
        let mut model = Self::new(schema);
        Accessors::apply_from_json(schema, json, &mut model.values);
        Attributes::apply_from_json(schema, json, &mut model.values);
        Counts::apply_from_json(schema, json, &mut model.values);
        Relations::apply_from_json(schema, json, &mut model.values);
        model
    }

    /// Wire representation of every group, merged in declaration group
    /// order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut json = Accessors::to_json(self.schema, &self.values);
        json.extend(Attributes::to_json(self.schema, &self.values));
        json.extend(Counts::to_json(self.schema, &self.values));
        json.extend(Relations::to_json(self.schema, &self.values));
        Value::Object(json)
    }

    /// Wire representation of the attributes only, as sent by `store` and
    /// `update`.
    #[must_use]
    pub fn attributes_json(&self) -> Map<String, Value> {
        Attributes::to_json(self.schema, &self.values)
    }

    /// Sets attributes and relations by in-memory name; other keys are
    /// ignored. Values are stored as given, without casting.
    pub fn fill(&mut self, values: &Map<String, Value>) -> &mut Self {
        for (name, value) in values {
            let property = PropertyValue::Json(value.clone());
            if !Attributes::set(self.schema, &mut self.values, name, property.clone()) {
                Relations::set(self.schema, &mut self.values, name, property);
            }
        }
        self
    }

    /// Deep copy through the wire representation, bound to the same client.
    #[must_use]
    pub fn clone_entity(&self) -> Self {
        let mut copy = Self::from_json(self.schema, &self.to_json());
        if let Some(api) = self.request.api() {
            copy.request.set_api(api.clone());
        }
        copy
    }

    /// The describing schema.
    #[must_use]
    pub const fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Current value of a property, by in-memory name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        Accessors::get(self.schema, &self.values, name)
            .or_else(|| Attributes::get(self.schema, &self.values, name))
            .or_else(|| Counts::get(self.schema, &self.values, name))
            .or_else(|| Relations::get(self.schema, &self.values, name))
    }

    /// Current value of a property as JSON; `null` when undeclared.
    #[must_use]
    pub fn value(&self, name: &str) -> Value {
        self.get(name).map_or(Value::Null, PropertyValue::to_json)
    }

    /// A nested entity held by a relation or attribute.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Self> {
        self.get(name).and_then(PropertyValue::as_entity)
    }

    /// The nested entities of a list-valued property.
    #[must_use]
    pub fn entities(&self, name: &str) -> Vec<&Self> {
        match self.get(name) {
            Some(PropertyValue::List(items)) => {
                items.iter().filter_map(PropertyValue::as_entity).collect()
            }
            Some(PropertyValue::Entity(model)) => vec![model],
            _ => Vec::new(),
        }
    }

    /// Sets a property by in-memory name.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownProperty`] when no group declares
    /// `name`.
    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) -> DomainResult<&mut Self> {
        let value = value.into();
        let stored = match self.schema.find(name).map(|(kind, _)| kind) {
            Some(PropertyKind::Accessor) => Accessors::set(self.schema, &mut self.values, name, value),
            Some(PropertyKind::Attribute) => Attributes::set(self.schema, &mut self.values, name, value),
            Some(PropertyKind::Count) => Counts::set(self.schema, &mut self.values, name, value),
            Some(PropertyKind::Relation) => Relations::set(self.schema, &mut self.values, name, value),
            None => false,
        };
        if stored {
            Ok(self)
        } else {
            Err(DomainError::UnknownProperty {
                entity: self.schema.name().to_string(),
                name: name.to_string(),
            })
        }
    }

    /// A count by its declared name (`comments` reads `commentsCount`).
    #[must_use]
    pub fn count(&self, name: &str) -> Option<i64> {
        self.schema
            .properties(PropertyKind::Count)
            .iter()
            .find(|declaration| {
                declaration.name() == name || declaration.memory_key(PropertyKind::Count) == name
            })
            .and_then(|declaration| self.values.get(&declaration.memory_key(PropertyKind::Count)))
            .and_then(PropertyValue::as_json)
            .and_then(Value::as_i64)
    }

    /// The identity value; absent when missing or falsy.
    #[must_use]
    pub fn identifier(&self) -> Option<Value> {
        Some(self.value(self.schema.identifier())).filter(is_truthy)
    }

    /// Binds the instance to a client.
    #[must_use]
    pub fn with_api(mut self, api: Api) -> Self {
        self.request.set_api(api);
        self
    }

    /// Binds the instance to a client.
    pub fn set_api(&mut self, api: Api) -> &mut Self {
        self.request.set_api(api);
        self
    }

    /// Overrides the schema endpoint for this instance.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.request.set_url(url);
        self
    }

    /// Sets the deduplication key of the instance's requests.
    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.request.set_key(key);
        self
    }

    /// The underlying request.
    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.request
    }

    /// The last recorded response.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        self.request.response()
    }

    /// Aborts the running verb, if any.
    pub fn cancel(&self) -> &Self {
        self.request.cancel();
        self
    }

    /// Fetches a list: `POST {endpoint}/index`. Items are read from
    /// `data.items`, or from `data` when it is an array.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn index(&mut self) -> ApplicationResult<Option<Vec<Self>>> {
        let url = format!("{}/index", self.base_url()?);
        let payload = RequestPayload::Json(self.request.body_parameters());
        let response = self.request.send(HttpMethod::Post, &url, payload).await?;

        let items = Self::succeeded(&response).map(|data| {
            let list = match data {
                Value::Array(items) => items.as_slice(),
                other => other
                    .get("items")
                    .and_then(Value::as_array)
                    .map_or(&[][..], Vec::as_slice),
            };
            list.iter().map(|item| self.cast(item)).collect::<Vec<_>>()
        });
        let success = items
            .as_ref()
            .map(|items| Value::Array(items.iter().map(Self::to_json).collect()));
        self.request.trigger_response_events(response, success).await?;
        Ok(items)
    }

    /// Fetches one instance: `POST {endpoint}/show/{id}`. `id` defaults to
    /// this instance's identity; without either nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn show(&mut self, id: Option<Value>) -> ApplicationResult<Option<Self>> {
        let Some(id) = id.filter(is_truthy).or_else(|| self.identifier()) else {
            return Ok(None);
        };
        let url = format!("{}/show/{}", self.base_url()?, to_display_string(&id));
        let payload = RequestPayload::Json(self.request.body_parameters());
        self.single(HttpMethod::Post, &url, payload).await
    }

    /// Creates the instance: `POST {endpoint}` with the attributes and
    /// `extra`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn store(&mut self, extra: Map<String, Value>) -> ApplicationResult<Option<Self>> {
        let url = self.base_url()?;
        let payload = RequestPayload::Json(self.write_body(extra));
        self.single(HttpMethod::Post, &url, payload).await
    }

    /// Updates the instance: `PUT {endpoint}/{id}` with the attributes and
    /// `extra`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn update(&mut self, extra: Map<String, Value>) -> ApplicationResult<Option<Self>> {
        let url = self.member_url()?;
        let payload = RequestPayload::Json(self.write_body(extra));
        self.single(HttpMethod::Put, &url, payload).await
    }

    /// Deletes the instance: `DELETE {endpoint}/{id}`. Returns whether the
    /// server confirmed with a non-empty body.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn destroy(&mut self) -> ApplicationResult<bool> {
        let url = self.member_url()?;
        let response = self
            .request
            .send(HttpMethod::Delete, &url, RequestPayload::Empty)
            .await?;
        let deleted = Self::succeeded(&response).is_some();
        self.request.trigger_response_events(response, None).await?;
        Ok(deleted)
    }

    /// `store` without an identity, `update` with one.
    ///
    /// # Errors
    ///
    /// See [`Model::store`] and [`Model::update`].
    pub async fn save(&mut self, extra: Map<String, Value>) -> ApplicationResult<Option<Self>> {
        if self.identifier().is_some() {
            self.update(extra).await
        } else {
            self.store(extra).await
        }
    }

    async fn single(
        &mut self,
        method: HttpMethod,
        url: &str,
        payload: RequestPayload,
    ) -> ApplicationResult<Option<Self>> {
        let response = self.request.send(method, url, payload).await?;
        let item = Self::succeeded(&response).map(|data| self.cast(data));
        let success = item.as_ref().map(Self::to_json);
        self.request.trigger_response_events(response, success).await?;
        Ok(item)
    }

    fn succeeded(response: &Arc<Response>) -> Option<&Value> {
        response
            .data()
            .filter(|data| !response.is_failed() && is_truthy(data))
    }

    fn cast(&self, json: &Value) -> Self {
        let mut model = Self::from_json(self.schema, json);
        if let Some(api) = self.request.api() {
            model.request.set_api(api.clone());
        }
        model
    }

    fn write_body(&self, extra: Map<String, Value>) -> Map<String, Value> {
        let mut body = self.attributes_json();
        body.extend(extra);
        body
    }

    fn base_url(&self) -> DomainResult<String> {
        match self.request.url() {
            Some(url) => Ok(url.to_string()),
            None => self.schema.endpoint().map(str::to_string),
        }
    }

    fn member_url(&self) -> DomainResult<String> {
        let base = self.base_url()?;
        Ok(match self.identifier() {
            Some(id) => format!("{base}/{}", to_display_string(&id)),
            None => base,
        })
    }
}

impl QueryBuilder for Model {
    fn query_mut(&mut self) -> &mut QueryParameters {
        self.request.query_mut()
    }

    fn identifier_value(&self) -> Value {
        self.identifier().unwrap_or(Value::Null)
    }
}

impl HasResponseEvents for Model {
    fn response_events_mut(&mut self) -> &mut ResponseEvents {
        self.request.response_events_mut()
    }
}
