pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use courselib_kernel::{InitCtx, Module};
use serde_json::json;

use super::{schema_of, SharedStore};
use models::{CourseDto, CourseForCreationDto, CourseForUpdateDto};

/// Courses owned by a single author, nested under the author resource
pub struct CoursesModule {
    store: SharedStore,
}

impl CoursesModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for CoursesModule {
    fn name(&self) -> &'static str {
        "courses"
    }

    fn mount_path(&self) -> String {
        "/api/authors/{author_id}/courses".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "courses module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_courses).post(routes::create_course))
            .route(
                "/{course_id}",
                get(routes::get_course)
                    .put(routes::upsert_course)
                    .patch(routes::patch_course)
                    .delete(routes::delete_course),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let author_id = json!({
            "name": "author_id", "in": "path", "required": true,
            "schema": { "type": "string", "format": "uuid" }
        });
        let course_id = json!({
            "name": "course_id", "in": "path", "required": true,
            "schema": { "type": "string", "format": "uuid" }
        });
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
        let course_body = |schema: &str| {
            json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{schema}") }
                    }
                }
            })
        };
        let course_response = json!({
            "description": "Course",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/CourseDto" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "parameters": [author_id.clone()],
                    "get": {
                        "summary": "List the author's courses ordered by title",
                        "tags": ["Courses"],
                        "responses": {
                            "200": {
                                "description": "Courses",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/CourseDto" }
                                        }
                                    }
                                }
                            },
                            "404": problem("Author not found")
                        }
                    },
                    "post": {
                        "summary": "Create a course for the author",
                        "tags": ["Courses"],
                        "requestBody": course_body("CourseForCreationDto"),
                        "responses": {
                            "201": course_response.clone(),
                            "400": problem("Malformed payload"),
                            "404": problem("Author not found"),
                            "422": problem("Validation failed")
                        }
                    }
                },
                "/{course_id}": {
                    "parameters": [author_id, course_id],
                    "get": {
                        "summary": "Get one of the author's courses",
                        "tags": ["Courses"],
                        "responses": {
                            "200": course_response.clone(),
                            "404": problem("Author or course not found")
                        }
                    },
                    "put": {
                        "summary": "Replace the course, creating it when it does not exist",
                        "tags": ["Courses"],
                        "requestBody": course_body("CourseForUpdateDto"),
                        "responses": {
                            "201": course_response,
                            "204": { "description": "Updated" },
                            "404": problem("Author not found"),
                            "409": problem("Course id is owned by another author"),
                            "422": problem("Validation failed")
                        }
                    },
                    "patch": {
                        "summary": "Apply a JSON patch document to the course",
                        "tags": ["Courses"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json-patch+json": {
                                    "schema": { "$ref": "#/components/schemas/PatchDocument" }
                                },
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/PatchDocument" }
                                }
                            }
                        },
                        "responses": {
                            "204": { "description": "Updated" },
                            "404": problem("Author or course not found"),
                            "422": problem("Patch or validation failed")
                        }
                    },
                    "delete": {
                        "summary": "Delete the course",
                        "tags": ["Courses"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": problem("Author or course not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "CourseDto": schema_of::<CourseDto>(),
                    "CourseForCreationDto": schema_of::<CourseForCreationDto>(),
                    "CourseForUpdateDto": schema_of::<CourseForUpdateDto>(),
                    "PatchDocument": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "op": {
                                    "type": "string",
                                    "enum": ["add", "remove", "replace", "move", "copy", "test"]
                                },
                                "path": { "type": "string" },
                                "from": { "type": "string" },
                                "value": {}
                            },
                            "required": ["op", "path"]
                        }
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "courses module stopped");
        Ok(())
    }
}

pub fn create_module(store: SharedStore) -> Arc<dyn Module> {
    Arc::new(CoursesModule::new(store))
}
