use std::sync::Arc;

use serde_json::json;

use crate::errors::ApiError;
use crate::pipeline::RequestPipeline;

use super::types::{Boat, BoatType, CreateBoatRequest, Page, Pageable, UpdateBoatRequest};

pub const BOATS_ENDPOINT: &str = "/api/v1/boats";

/// Boat CRUD calls. Pass-through payloads; the pipeline takes care of tokens
/// and session failures.
#[derive(Clone)]
pub struct BoatService {
    pipeline: Arc<RequestPipeline>,
}

impl BoatService {
    pub fn new(pipeline: Arc<RequestPipeline>) -> Self {
        Self { pipeline }
    }

    pub async fn list(&self, pageable: &Pageable) -> Result<Page<Boat>, ApiError> {
        let endpoint = format!("{BOATS_ENDPOINT}{}", pageable.to_query_string());
        self.pipeline.get(&endpoint).await
    }

    pub async fn get(&self, id: i64) -> Result<Boat, ApiError> {
        self.pipeline.get(&boat_endpoint(id)).await
    }

    pub async fn create(&self, boat: &CreateBoatRequest) -> Result<Boat, ApiError> {
        tracing::debug!("Creating boat {}", boat.name);
        self.pipeline.post(BOATS_ENDPOINT, boat).await
    }

    pub async fn update(&self, id: i64, boat: &UpdateBoatRequest) -> Result<Boat, ApiError> {
        self.pipeline.put(&boat_endpoint(id), boat).await
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<Boat, ApiError> {
        let endpoint = format!("{}/name", boat_endpoint(id));
        self.pipeline.patch(&endpoint, &json!({ "name": name })).await
    }

    pub async fn update_description(&self, id: i64, description: &str) -> Result<Boat, ApiError> {
        let endpoint = format!("{}/description", boat_endpoint(id));
        self.pipeline
            .patch(&endpoint, &json!({ "description": description }))
            .await
    }

    pub async fn update_type(&self, id: i64, boat_type: BoatType) -> Result<Boat, ApiError> {
        let endpoint = format!("{}/type", boat_endpoint(id));
        self.pipeline
            .patch(&endpoint, &json!({ "boatType": boat_type }))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        tracing::debug!("Deleting boat {}", id);
        self.pipeline.delete(&boat_endpoint(id)).await
    }
}

fn boat_endpoint(id: i64) -> String {
    format!("{BOATS_ENDPOINT}/{id}")
}
