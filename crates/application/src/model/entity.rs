//! Typed wrappers over [`Model`].

use serde_json::{Map, Value};

use restmodel_domain::Schema;

use super::Model;
use crate::api::Api;
use crate::error::ApplicationResult;

/// A concrete entity type backed by a [`Model`].
///
/// Implementors supply the schema and access to the inner model; casting
/// and the REST verbs come for free and return `Self`.
#[allow(async_fn_in_trait)]
pub trait Entity: Sized {
    /// The schema shared by every instance.
    fn schema() -> &'static Schema;

    /// Wraps a model of [`Entity::schema`].
    fn from_model(model: Model) -> Self;

    /// The inner model.
    fn model(&self) -> &Model;

    /// The inner model, mutably.
    fn model_mut(&mut self) -> &mut Model;

    /// An instance holding the declared defaults, bound to `api`.
    fn new(api: Api) -> Self {
        Self::from_model(Model::new(Self::schema()).with_api(api))
    }

    /// Casts a wire object.
    fn from_json(json: &Value) -> Self {
        Self::from_model(Model::from_json(Self::schema(), json))
    }

    /// The wire representation.
    fn to_json(&self) -> Value {
        self.model().to_json()
    }

    /// See [`Model::index`].
    async fn index(&mut self) -> ApplicationResult<Option<Vec<Self>>> {
        let items = self.model_mut().index().await?;
        Ok(items.map(|items| items.into_iter().map(Self::from_model).collect()))
    }

    /// See [`Model::show`].
    async fn show(&mut self, id: Option<Value>) -> ApplicationResult<Option<Self>> {
        Ok(self.model_mut().show(id).await?.map(Self::from_model))
    }

    /// See [`Model::store`].
    async fn store(&mut self, extra: Map<String, Value>) -> ApplicationResult<Option<Self>> {
        Ok(self.model_mut().store(extra).await?.map(Self::from_model))
    }

    /// See [`Model::update`].
    async fn update(&mut self, extra: Map<String, Value>) -> ApplicationResult<Option<Self>> {
        Ok(self.model_mut().update(extra).await?.map(Self::from_model))
    }

    /// See [`Model::destroy`].
    async fn destroy(&mut self) -> ApplicationResult<bool> {
        self.model_mut().destroy().await
    }

    /// See [`Model::save`].
    async fn save(&mut self, extra: Map<String, Value>) -> ApplicationResult<Option<Self>> {
        Ok(self.model_mut().save(extra).await?.map(Self::from_model))
    }
}
