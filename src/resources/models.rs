use crate::client::{RequestSpec, XenoClient};
use crate::error::Result;
use crate::types::{Model, ModelList};

/// The catalogue of models served by the API.
pub struct Models<'c> {
    client: &'c XenoClient,
}

impl<'c> Models<'c> {
    pub(crate) fn new(client: &'c XenoClient) -> Self {
        Self { client }
    }

    /// Lists every available model.
    pub async fn list(&self) -> Result<ModelList> {
        self.client.request_json(RequestSpec::get("/models")).await
    }

    /// Retrieves a single model by id.
    pub async fn retrieve(&self, model_id: &str) -> Result<Model> {
        let path = format!("/models/{}", model_id);
        self.client.request_json(RequestSpec::get(&path)).await
    }
}
