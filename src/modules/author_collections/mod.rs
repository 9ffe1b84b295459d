pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use courselib_kernel::{InitCtx, Module};
use serde_json::json;

use super::SharedStore;

/// Batch creation and exact-set retrieval of authors
pub struct AuthorCollectionsModule {
    store: SharedStore,
}

impl AuthorCollectionsModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for AuthorCollectionsModule {
    fn name(&self) -> &'static str {
        "authorcollections"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "author collections module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(routes::create_author_collection))
            .route("/{ids}", get(routes::get_author_collection))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let problem = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/problem+json": {
                        "schema": { "$ref": "#/components/schemas/ProblemDetails" }
                    }
                }
            })
        };
        let authors = json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/AuthorDto" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create several authors at once",
                        "tags": ["Author collections"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/AuthorForCreationDto" }
                                    }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created authors; Location names the collection",
                                "content": { "application/json": { "schema": authors.clone() } }
                            },
                            "400": problem("Malformed or empty payload"),
                            "422": problem("Validation failed")
                        }
                    }
                },
                "/{ids}": {
                    "get": {
                        "summary": "Get exactly the listed authors",
                        "tags": ["Author collections"],
                        "parameters": [{
                            "name": "ids", "in": "path", "required": true,
                            "description": "Comma-separated author ids",
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Authors ordered by name",
                                "content": { "application/json": { "schema": authors } }
                            },
                            "400": problem("Blank or malformed id list"),
                            "404": problem("One or more authors not found")
                        }
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "author collections module stopped");
        Ok(())
    }
}

pub fn create_module(store: SharedStore) -> Arc<dyn Module> {
    Arc::new(AuthorCollectionsModule::new(store))
}
