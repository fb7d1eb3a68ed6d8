//! Item registry

use std::sync::Arc;

use futures::future::try_join_all;
use ranko_common::db::{Item, NewItem};
use ranko_common::Store;
use serde::Serialize;
use tracing::info;

use crate::error::{surface, DomainError, DomainResult, Entity};
use crate::gate::Gate;
use crate::locale::Messages;
use crate::scores::ScoreLedger;
use crate::validation::{check_geolocation, check_link, optional_text, require_text};

/// An item decorated with its current average score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: Item,
    pub average_score: f64,
}

#[derive(Clone)]
pub struct ItemRegistry {
    store: Arc<dyn Store>,
    gate: Gate,
    ledger: ScoreLedger,
    messages: Messages,
}

impl ItemRegistry {
    pub fn new(store: Arc<dyn Store>, ledger: ScoreLedger, messages: Messages) -> Self {
        Self {
            gate: Gate::new(Arc::clone(&store)),
            store,
            ledger,
            messages,
        }
    }

    /// Add an item to a ranking; photo references are stored in the given order
    pub async fn create_item(
        &self,
        ranking_id: &str,
        creator_id: &str,
        data: NewItem,
    ) -> DomainResult<Item> {
        surface("create_item", &self.messages, async {
            let data = sanitize(data)?;

            tokio::try_join!(
                self.gate.require_user(creator_id),
                self.gate.require_membership(ranking_id, creator_id),
            )?;
            self.gate.require_ranking(ranking_id).await?;

            let item = self.store.create_item(ranking_id, creator_id, &data).await?;
            info!(
                "Item {} ({}) created in ranking {} by {}",
                item.id, item.name, ranking_id, creator_id
            );
            Ok(item)
        })
        .await
    }

    /// Items of a ranking with their averages, for members only
    pub async fn list_items(&self, ranking_id: &str, user_id: &str) -> DomainResult<Vec<ScoredItem>> {
        surface("list_items", &self.messages, async {
            self.gate.require_member_ranking(ranking_id, user_id).await?;

            let items = self.store.list_items(ranking_id).await?;
            let averages =
                try_join_all(items.iter().map(|item| self.ledger.average_of(&item.id))).await?;

            Ok(items
                .into_iter()
                .zip(averages)
                .map(|(item, average_score)| ScoredItem {
                    item,
                    average_score,
                })
                .collect())
        })
        .await
    }

    /// Delete an item; membership is checked against the item's own ranking
    pub async fn delete_item(&self, item_id: &str, user_id: &str) -> DomainResult<()> {
        surface("delete_item", &self.messages, async {
            let item = self.gate.require_item(item_id).await?;
            self.gate.require_membership(&item.ranking_id, user_id).await?;

            if !self.store.delete_item(&item.id).await? {
                return Err(DomainError::NotFound(Entity::Item));
            }
            info!("Item {} deleted from ranking {} by {}", item.id, item.ranking_id, user_id);
            Ok(())
        })
        .await
    }
}

fn sanitize(data: NewItem) -> DomainResult<NewItem> {
    let name = require_text("name", &data.name)?;
    let link = optional_text(data.link.as_deref());
    if let Some(link) = &link {
        check_link(link)?;
    }
    if let Some(geo) = &data.geolocation {
        check_geolocation(geo)?;
    }
    let photos = data
        .photos
        .iter()
        .filter_map(|p| optional_text(Some(p.as_str())))
        .collect();

    Ok(NewItem {
        name,
        description: optional_text(data.description.as_deref()),
        link,
        geolocation: data.geolocation,
        photos,
    })
}
