//! Dashboard controller: owns the sync phase, the local collection and the
//! notice queue, and drives mutations through the REST client.
//!
//! Toggle updates the local record as soon as the REST call succeeds.
//! Create, update and delete leave the collection alone and refetch the
//! snapshot after the server confirms.

use crate::api::DishClient;
use crate::error::ClientError;
use crate::notice::NoticeQueue;
use crate::sync::{DishCollection, SyncPhase};
use dishboard_protocol::{CreateDish, Dish, DishEvent, DishPatch};
use log::{debug, info, warn};

pub struct Dashboard {
    client: DishClient,
    phase: SyncPhase,
    collection: DishCollection,
    notices: NoticeQueue,
}

impl Dashboard {
    pub fn new(client: DishClient, notice_limit: usize) -> Self {
        Self {
            client,
            phase: SyncPhase::Loading,
            collection: DishCollection::default(),
            notices: NoticeQueue::new(notice_limit),
        }
    }

    pub fn client(&self) -> &DishClient {
        &self.client
    }

    pub fn phase(&self) -> &SyncPhase {
        &self.phase
    }

    pub fn dishes(&self) -> &[Dish] {
        self.collection.dishes()
    }

    pub fn notices(&mut self) -> &mut NoticeQueue {
        &mut self.notices
    }

    /// Enter `Loading` and fetch the snapshot.
    pub async fn mount(&mut self) -> &SyncPhase {
        self.phase = SyncPhase::Loading;
        match self.client.list().await {
            Ok(snapshot) => {
                info!("snapshot loaded (count={})", snapshot.count);
                self.collection = DishCollection::from_snapshot(snapshot.data);
                self.phase = SyncPhase::Ready;
            }
            Err(err) => {
                warn!("snapshot fetch failed (error={})", err);
                self.phase = SyncPhase::Failed {
                    message: err.notice_text(),
                };
            }
        }
        &self.phase
    }

    /// Re-enter `Loading` from the failed phase. No-op otherwise.
    pub async fn retry(&mut self) -> &SyncPhase {
        if matches!(self.phase, SyncPhase::Failed { .. }) {
            return self.mount().await;
        }
        &self.phase
    }

    /// Apply a broadcast event. Events are dropped unless `Ready`.
    pub fn handle_event(&mut self, event: &DishEvent) -> bool {
        if self.phase != SyncPhase::Ready {
            debug!(
                "dropping event outside ready phase (event={}, dish_id={})",
                event.name(),
                event.dish_id()
            );
            return false;
        }
        self.collection.apply(event)
    }

    pub async fn toggle(&mut self, dish_id: &str) -> Result<Dish, ClientError> {
        match self.client.toggle(dish_id).await {
            Ok(response) => {
                self.collection
                    .set_published(&response.data.dish_id, response.data.is_published);
                self.notices.success(response.message);
                Ok(response.data)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn create(&mut self, body: &CreateDish) -> Result<Dish, ClientError> {
        match self.client.create(body).await {
            Ok(response) => {
                self.notices.success(response.message);
                self.refetch().await;
                Ok(response.data)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn update(&mut self, dish_id: &str, patch: &DishPatch) -> Result<Dish, ClientError> {
        match self.client.update(dish_id, patch).await {
            Ok(response) => {
                self.notices.success(response.message);
                self.refetch().await;
                Ok(response.data)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn delete(&mut self, dish_id: &str) -> Result<(), ClientError> {
        match self.client.delete(dish_id).await {
            Ok(response) => {
                self.notices.success(response.message);
                self.refetch().await;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Replace the collection with a fresh snapshot, keeping the current one
    /// if the fetch fails.
    async fn refetch(&mut self) {
        match self.client.list().await {
            Ok(snapshot) => {
                self.collection = DishCollection::from_snapshot(snapshot.data);
                if self.phase != SyncPhase::Ready {
                    self.phase = SyncPhase::Ready;
                }
            }
            Err(err) => {
                warn!("refetch failed (error={})", err);
                self.notices.error(err.notice_text());
            }
        }
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        warn!("mutation failed (error={})", err);
        self.notices.error(err.notice_text());
        err
    }
}
