//! Entity store for the course library: entities, the repository seam, and
//! an in-memory unit-of-work implementation.

pub mod entities;
pub mod error;
pub mod memory;
pub mod repository;
pub mod seed;

use std::sync::Arc;

use async_trait::async_trait;
use courselib_kernel::{InitCtx, Module};

pub use entities::{Author, AuthorsResourceParameters, Course};
pub use error::StoreError;
pub use memory::InMemoryStore;
pub use repository::{CourseLibraryRepository, CourseLibraryStore};

/// Core module owning the entity store lifecycle.
pub struct DatabaseModule {
    store: Arc<dyn CourseLibraryStore>,
}

impl DatabaseModule {
    pub fn new(store: Arc<dyn CourseLibraryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.database.seed {
            let written = seed::load(self.store.as_ref()).await?;
            tracing::info!(module = self.name(), written, "sample data seeded");
        }
        tracing::info!(module = self.name(), "entity store initialized");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "entity store stopped");
        Ok(())
    }
}

/// Create the core store module around a shared store handle
pub fn create_module(store: Arc<dyn CourseLibraryStore>) -> Arc<dyn Module> {
    Arc::new(DatabaseModule::new(store))
}
