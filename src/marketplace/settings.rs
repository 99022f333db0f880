//! Global commission settings, persisted as a single document in the store.
//! Reads go through a small in-process cache.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::baas::{collections, DocStore, Query};
use crate::error::{AppError, AppResult};

pub const DEFAULT_COMMISSION_RATE: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionSettings {
    #[serde(rename = "$id", default)]
    pub id: String,
    pub rate: f64,
}

/// Cached commission rate; shared across handlers via application state.
#[derive(Clone, Default)]
pub struct CommissionCache(Arc<RwLock<Option<f64>>>);

impl CommissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self) -> Option<f64> {
        *self.0.read()
    }

    fn set(&self, rate: f64) {
        *self.0.write() = Some(rate);
    }
}

async fn load_settings(store: &DocStore) -> AppResult<Option<CommissionSettings>> {
    let page: crate::baas::DocumentList<CommissionSettings> = store
        .list(collections::COMMISSION_SETTINGS, &[Query::Limit(1)])
        .await?;
    Ok(page.documents.into_iter().next())
}

/// Current commission rate in percent. Seeds the default record on first
/// read; a store failure falls back to the default rather than blocking
/// order creation.
pub async fn commission_rate(store: &DocStore, cache: &CommissionCache) -> f64 {
    if let Some(rate) = cache.get() {
        return rate;
    }
    match load_settings(store).await {
        Ok(Some(settings)) => {
            cache.set(settings.rate);
            settings.rate
        }
        Ok(None) => {
            let seeded: Result<CommissionSettings, _> = store
                .create(
                    collections::COMMISSION_SETTINGS,
                    &json!({ "rate": DEFAULT_COMMISSION_RATE }),
                )
                .await;
            if let Err(e) = seeded {
                warn!("failed to seed commission settings: {e}");
            }
            cache.set(DEFAULT_COMMISSION_RATE);
            DEFAULT_COMMISSION_RATE
        }
        Err(e) => {
            warn!("commission settings read failed, using default: {e}");
            DEFAULT_COMMISSION_RATE
        }
    }
}

pub async fn set_commission_rate(
    store: &DocStore,
    cache: &CommissionCache,
    rate: f64,
) -> AppResult<f64> {
    if !(0.0..=100.0).contains(&rate) {
        return Err(AppError::user(
            "bad_commission_rate",
            "commission rate must be between 0 and 100",
        ));
    }
    let updated = match load_settings(store).await? {
        Some(settings) => {
            let row: CommissionSettings = store
                .update(
                    collections::COMMISSION_SETTINGS,
                    &settings.id,
                    &json!({ "rate": rate }),
                )
                .await?;
            row.rate
        }
        None => {
            let row: CommissionSettings = store
                .create(collections::COMMISSION_SETTINGS, &json!({ "rate": rate }))
                .await?;
            row.rate
        }
    };
    cache.set(updated);
    info!(rate = updated, "commission rate updated");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_round_trips() {
        let cache = CommissionCache::new();
        assert_eq!(cache.get(), None);
        cache.set(12.5);
        assert_eq!(cache.get(), Some(12.5));
    }
}
