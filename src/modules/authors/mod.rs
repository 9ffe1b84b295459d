pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use courselib_kernel::{InitCtx, Module};
use serde_json::json;

use super::{schema_of, SharedStore};
use models::{AuthorDto, AuthorForCreationDto};

/// Author resource: listing, lookup, creation and removal
pub struct AuthorsModule {
    store: SharedStore,
}

impl AuthorsModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(routes::list_authors)
                    .post(routes::create_author)
                    .options(routes::authors_options),
            )
            .route(
                "/{author_id}",
                get(routes::get_author).delete(routes::delete_author),
            )
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
        let author_response = json!({
            "description": "Author",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/AuthorDto" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors ordered by name",
                        "tags": ["Authors"],
                        "parameters": [
                            {
                                "name": "mainCategory", "in": "query", "required": false,
                                "description": "Exact category match",
                                "schema": { "type": "string" }
                            },
                            {
                                "name": "searchQuery", "in": "query", "required": false,
                                "description": "Substring of category, first name or last name",
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Authors",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/AuthorDto" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create an author with optional courses",
                        "tags": ["Authors"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AuthorForCreationDto" }
                                }
                            }
                        },
                        "responses": {
                            "201": author_response.clone(),
                            "400": problem("Malformed payload"),
                            "422": problem("Validation failed")
                        }
                    },
                    "options": {
                        "summary": "Supported methods",
                        "tags": ["Authors"],
                        "responses": {
                            "200": {
                                "description": "Allow header lists the supported methods",
                                "headers": { "Allow": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                },
                "/{author_id}": {
                    "parameters": [{
                        "name": "author_id", "in": "path", "required": true,
                        "schema": { "type": "string", "format": "uuid" }
                    }],
                    "get": {
                        "summary": "Get an author",
                        "tags": ["Authors"],
                        "responses": {
                            "200": author_response,
                            "400": problem("Malformed author id"),
                            "404": problem("Author not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete an author and their courses",
                        "tags": ["Authors"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": problem("Author not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "AuthorDto": schema_of::<AuthorDto>(),
                    "AuthorForCreationDto": schema_of::<AuthorForCreationDto>()
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

pub fn create_module(store: SharedStore) -> Arc<dyn Module> {
    Arc::new(AuthorsModule::new(store))
}
