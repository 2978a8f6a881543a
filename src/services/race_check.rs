use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::Mutex;

use crate::{
    configuration::Settings,
    dal::state_store::{FileStateStore, StateStore},
    domain::{
        cache_record::{decide, CacheRecord, Decision},
        notification::NotificationMessage,
        race_page::HoldingMarker,
    },
};

use super::{LineClient, NotifyError, RacePageFetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    FetchFailed,
    Suppressed,
    Notified,
    NotifyFailed,
}

pub struct RaceChecker {
    fetcher: RacePageFetcher,
    marker: HoldingMarker,
    line_client: LineClient,
    target_user_id: String,
    venue_name: String,
    utc_offset: FixedOffset,
    store: Box<dyn StateStore>,
    // One run at a time within this process
    run_lock: Mutex<()>,
}

impl RaceChecker {
    pub fn new(
        fetcher: RacePageFetcher,
        marker: HoldingMarker,
        line_client: LineClient,
        target_user_id: String,
        venue_name: String,
        utc_offset: FixedOffset,
        store: Box<dyn StateStore>,
    ) -> Self {
        RaceChecker {
            fetcher,
            marker,
            line_client,
            target_user_id,
            venue_name,
            utc_offset,
            store,
            run_lock: Mutex::new(()),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher = RacePageFetcher::new(&settings.fetcher, &settings.venue)?;
        let marker = HoldingMarker::parse(&settings.venue.marker_selector)?;
        let utc_offset = settings.venue.utc_offset().ok_or_else(|| {
            anyhow::anyhow!(
                "UTC offset out of range: {} hours",
                settings.venue.utc_offset_hours
            )
        })?;

        Ok(RaceChecker::new(
            fetcher,
            marker,
            LineClient::new(&settings.line)?,
            settings.line.target_user_id.clone(),
            settings.venue.name.clone(),
            utc_offset,
            Box::new(FileStateStore::new(settings.cache.path.clone())),
        ))
    }

    pub async fn check_and_notify(&self) -> CheckOutcome {
        self.check_and_notify_at(Utc::now()).await
    }

    pub async fn check_and_notify_at(&self, now: DateTime<Utc>) -> CheckOutcome {
        let _running = self.run_lock.lock().await;

        let local_now = now.with_timezone(&self.utc_offset);

        let page_source = match self.fetcher.fetch(local_now.date_naive()).await {
            Ok(page_source) => page_source,
            Err(e) => {
                log::error!("Scraping failed, skipping notification. Error: {}", e);
                return CheckOutcome::FetchFailed;
            }
        };

        let held = self.marker.is_held_today(&page_source);
        let timestamp = now.timestamp();

        match decide(self.store.load().as_ref(), held, timestamp) {
            Decision::Suppress => {
                log::info!("Race held: {}, unchanged within 30 min, not resending", held);
                return CheckOutcome::Suppressed;
            }
            Decision::Notify => {}
        }

        // Recorded before the push so a failed push is not retried within the window
        if let Err(e) = self.store.save(&CacheRecord::new(held, timestamp)) {
            log::error!("Failed to write race state cache. Error: {:?}", e);
        }

        let message = NotificationMessage::for_day(&local_now, &self.venue_name, held);

        match self
            .line_client
            .push_text(&self.target_user_id, &message.body_text)
            .await
        {
            Ok(()) => {
                log::info!("LINE push OK: {}", message.body_text);
                CheckOutcome::Notified
            }
            Err(NotifyError::Rejected { status, message: detail }) => {
                log::error!("LINE push failed {}: {}", status.as_u16(), detail);
                CheckOutcome::NotifyFailed
            }
            Err(e) => {
                log::error!("LINE push failed: {}", e);
                CheckOutcome::NotifyFailed
            }
        }
    }
}
