use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::{FavoriteApi, FavoriteError, Notification, Notifier, QueryCache, QueryKey};
use crate::models::Viewer;

/// The one owner of a card's favorite flag.
///
/// Every control on the card reads the flag through [`FavoriteControl`]
/// handles; [`FavoriteController::toggle`] is the only way to mutate it.
pub struct FavoriteController {
    api: Arc<dyn FavoriteApi>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    viewer: Option<Viewer>,
    location_id: String,
    favorite: watch::Sender<bool>,
}

impl FavoriteController {
    pub fn new(
        api: Arc<dyn FavoriteApi>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
        viewer: Option<Viewer>,
        location_id: impl Into<String>,
    ) -> Self {
        let (favorite, _) = watch::channel(false);
        Self {
            api,
            cache,
            notifier,
            viewer,
            location_id: location_id.into(),
            favorite,
        }
    }

    /// Create the controller and seed it from the remote "is saved" query.
    pub async fn load(
        api: Arc<dyn FavoriteApi>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
        viewer: Option<Viewer>,
        location_id: impl Into<String>,
    ) -> Result<Self, FavoriteError> {
        let mut controller = Self::new(api, cache, notifier, viewer, location_id);
        controller.refresh().await?;
        Ok(controller)
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn is_favorite(&self) -> bool {
        *self.favorite.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.favorite.subscribe()
    }

    pub fn heart(&self) -> FavoriteControl {
        FavoriteControl::new(ControlKind::Heart, self.subscribe())
    }

    pub fn save_button(&self) -> FavoriteControl {
        FavoriteControl::new(ControlKind::SaveButton, self.subscribe())
    }

    /// Re-run the "is saved" query and adopt its answer.
    pub async fn refresh(&mut self) -> Result<bool, FavoriteError> {
        let saved = match &self.viewer {
            Some(viewer) => self.api.is_saved(viewer, &self.location_id).await?,
            None => false,
        };
        self.cache.mark_fresh(QueryKey::IsSaved(self.location_id.clone()));
        self.sync_remote(saved);
        Ok(saved)
    }

    /// Adopt a fresh result of the remote "is saved" query.
    pub fn sync_remote(&mut self, saved: bool) {
        self.favorite.send_replace(saved);
    }

    /// Flip the flag optimistically, then confirm it remotely.
    ///
    /// Without a viewer nothing is sent and the flag stays as it is. A failed
    /// call restores the previous value and notifies the viewer once; a
    /// confirmed one notifies success.
    pub async fn toggle(&mut self) -> Result<bool, FavoriteError> {
        let Some(viewer) = self.viewer.clone() else {
            self.notifier.notify(Notification::error(
                "Sign in required",
                "Please sign in to save locations.",
            ));
            return Err(FavoriteError::Unauthorized);
        };

        let previous = self.is_favorite();
        let target = !previous;
        self.favorite.send_replace(target);

        let result = if target {
            self.api.save(&viewer, &self.location_id).await
        } else {
            self.api.unsave(&viewer, &self.location_id).await
        };

        match result {
            Ok(()) => {
                self.favorite.send_replace(target);
                self.cache.invalidate(QueryKey::IsSaved(self.location_id.clone()));
                self.cache.invalidate(QueryKey::SavedList);
                self.cache.invalidate(QueryKey::SavedIds);
                debug!(location_id = %self.location_id, saved = target, "Favorite updated");
                self.notifier.notify(if target {
                    Notification::success("Saved", "Location added to your favorites.")
                } else {
                    Notification::success("Removed", "Location removed from your favorites.")
                });
                Ok(target)
            }
            Err(error) => {
                self.favorite.send_replace(previous);
                warn!(location_id = %self.location_id, "Favorite update failed: {error}");
                self.notifier.notify(Notification::error(
                    "Could not update favorites",
                    error.user_message(),
                ));
                Err(error)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Heart,
    SaveButton,
}

/// Read-only view of the flag for one control on the card
#[derive(Clone)]
pub struct FavoriteControl {
    kind: ControlKind,
    favorite: watch::Receiver<bool>,
}

impl FavoriteControl {
    fn new(kind: ControlKind, favorite: watch::Receiver<bool>) -> Self {
        Self { kind, favorite }
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        *self.favorite.borrow()
    }

    pub fn label(&self) -> &'static str {
        match (self.kind, self.is_active()) {
            (ControlKind::Heart, true) => "Remove from favorites",
            (ControlKind::Heart, false) => "Add to favorites",
            (ControlKind::SaveButton, true) => "Saved",
            (ControlKind::SaveButton, false) => "Save",
        }
    }
}
