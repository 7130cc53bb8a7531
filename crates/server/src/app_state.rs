use std::sync::Arc;

use server_api::{EventService, StoredEventService};
use shared::protocol::{PageQuery, Paging};
use storage::Storage;

use crate::{config::Settings, shell::SiteMeta};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) events: Arc<dyn EventService>,
    pub(crate) storage: Storage,
    pub(crate) default_page_size: u32,
    pub(crate) max_page_size: u32,
    pub(crate) site: SiteMeta,
}

impl AppState {
    pub(crate) fn new(storage: Storage, settings: &Settings) -> Self {
        Self {
            events: Arc::new(StoredEventService::new(storage.clone())),
            storage,
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
            site: SiteMeta {
                title: settings.site_title.clone(),
                description: settings.site_description.clone(),
                ..SiteMeta::default()
            },
        }
    }

    pub(crate) fn paging(&self, query: PageQuery) -> Paging {
        Paging::normalize(query, self.default_page_size, self.max_page_size)
    }
}
