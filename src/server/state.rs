use std::sync::Arc;

use anyhow::Result;

use super::config::Config;
use crate::catalog::Catalog;
use crate::favorites::FavoriteStore;
use crate::map::SdkLoader;

pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub favorites: FavoriteStore,
    pub maps: SdkLoader,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let catalog = Catalog::load(config.catalog_path.as_deref()).await?;
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: Config, catalog: Catalog) -> Arc<Self> {
        let maps = SdkLoader::new(config.map_settings());
        Arc::new(Self {
            config,
            catalog,
            favorites: FavoriteStore::new(),
            maps,
        })
    }
}
