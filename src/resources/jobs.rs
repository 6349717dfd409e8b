use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::fill_model;
use crate::client::{RequestSpec, XenoClient};
use crate::error::Result;
use crate::polling::poll_until_terminal;
use crate::types::Generation;

/// The `/{domain}/generations` endpoints shared by video and music.
pub(crate) struct JobEndpoint<'c> {
    client: &'c XenoClient,
    path: &'static str,
}

impl<'c> JobEndpoint<'c> {
    pub(crate) fn new(client: &'c XenoClient, path: &'static str) -> Self {
        Self { client, path }
    }

    /// Starts a job and, when `wait` is given, polls it at that interval
    /// until it finishes.
    pub(crate) async fn submit<T: DeserializeOwned>(
        &self,
        body: Value,
        model: &str,
        wait: Option<Duration>,
    ) -> Result<Generation<T>> {
        let mut generation: Generation<T> = self
            .client
            .request_json(RequestSpec::post(self.path, body))
            .await?;
        debug!(id = %generation.id, status = ?generation.status, "generation submitted");

        if let Some(interval) = wait {
            if generation.status.is_in_progress() {
                generation = self.wait(&generation.id, interval).await?;
            }
        }

        fill_model(&mut generation.model, model);
        Ok(generation)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<Generation<T>> {
        let path = format!("{}/{}", self.path, id);
        self.client.request_json(RequestSpec::get(&path)).await
    }

    /// Polls the job without retrying individual status fetches.
    pub(crate) async fn wait<T: DeserializeOwned>(
        &self,
        id: &str,
        interval: Duration,
    ) -> Result<Generation<T>> {
        let path = format!("{}/{}", self.path, id);
        let path: &str = &path;
        let client = self.client;
        poll_until_terminal(id, interval, move || {
            client.execute_json::<Generation<T>>(RequestSpec::get(path))
        })
        .await
    }
}
