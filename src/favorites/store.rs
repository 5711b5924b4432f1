use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::Viewer;

/// Saved locations per viewer, with the time each was saved
#[derive(Default)]
pub struct FavoriteStore {
    saved: RwLock<HashMap<String, HashMap<String, DateTime<Utc>>>>,
}

impl FavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_saved(&self, viewer: &Viewer, location_id: &str) -> bool {
        self.saved
            .read()
            .await
            .get(&viewer.id)
            .is_some_and(|saved| saved.contains_key(location_id))
    }

    /// Returns `false` when the location was already saved.
    pub async fn save(&self, viewer: &Viewer, location_id: &str) -> bool {
        let mut saved = self.saved.write().await;
        let inserted = saved
            .entry(viewer.id.clone())
            .or_default()
            .insert(location_id.to_string(), Utc::now())
            .is_none();
        debug!(viewer = %viewer.id, location_id, inserted, "save");
        inserted
    }

    /// Returns `false` when the location was not saved.
    pub async fn unsave(&self, viewer: &Viewer, location_id: &str) -> bool {
        let mut saved = self.saved.write().await;
        let removed = saved
            .get_mut(&viewer.id)
            .is_some_and(|saved| saved.remove(location_id).is_some());
        debug!(viewer = %viewer.id, location_id, removed, "unsave");
        removed
    }

    /// Saved location ids, most recently saved first
    pub async fn saved_ids(&self, viewer: &Viewer) -> Vec<String> {
        let saved = self.saved.read().await;
        let Some(saved) = saved.get(&viewer.id) else {
            return Vec::new();
        };

        let mut entries: Vec<(&String, &DateTime<Utc>)> = saved.iter().collect();
        entries.sort_by(|(a_id, a_at), (b_id, b_at)| b_at.cmp(a_at).then_with(|| a_id.cmp(b_id)));
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }
}
