//! Rankings and their scoring criteria

use std::sync::Arc;

use ranko_common::db::{Criteria, NewRanking, Ranking, RankingPatch};
use ranko_common::Store;
use tracing::info;

use crate::error::{surface, DomainError, DomainResult};
use crate::gate::Gate;
use crate::locale::Messages;
use crate::validation::{optional_text, require_text};

#[derive(Clone)]
pub struct RankingDirectory {
    store: Arc<dyn Store>,
    gate: Gate,
    messages: Messages,
}

impl RankingDirectory {
    pub fn new(store: Arc<dyn Store>, messages: Messages) -> Self {
        Self {
            gate: Gate::new(Arc::clone(&store)),
            store,
            messages,
        }
    }

    /// Create a ranking; the owner becomes its first member
    pub async fn create_ranking(&self, owner_id: &str, data: NewRanking) -> DomainResult<Ranking> {
        surface("create_ranking", &self.messages, async {
            let data = NewRanking {
                name: require_text("name", &data.name)?,
                description: data.description.trim().to_string(),
                banner: optional_text(data.banner.as_deref()),
                geolocation_enabled: data.geolocation_enabled,
            };
            self.gate.require_user(owner_id).await?;

            Ok(self.store.create_ranking(owner_id, &data).await?)
        })
        .await
    }

    pub async fn get_ranking(&self, ranking_id: &str, user_id: &str) -> DomainResult<Ranking> {
        surface("get_ranking", &self.messages, async {
            self.gate.require_member_ranking(ranking_id, user_id).await
        })
        .await
    }

    pub async fn update_ranking(
        &self,
        ranking_id: &str,
        user_id: &str,
        patch: RankingPatch,
    ) -> DomainResult<Ranking> {
        surface("update_ranking", &self.messages, async {
            let patch = RankingPatch {
                name: patch
                    .name
                    .as_deref()
                    .map(|name| require_text("name", name))
                    .transpose()?,
                description: patch.description.map(|d| d.trim().to_string()),
                banner: optional_text(patch.banner.as_deref()),
                geolocation_enabled: patch.geolocation_enabled,
            };
            self.gate.require_member_ranking(ranking_id, user_id).await?;

            let ranking = self.store.update_ranking(ranking_id, &patch).await?;
            info!("Ranking {} updated by {}", ranking_id, user_id);
            Ok(ranking)
        })
        .await
    }

    /// Soft delete; only the owner may do this
    pub async fn delete_ranking(&self, ranking_id: &str, user_id: &str) -> DomainResult<()> {
        surface("delete_ranking", &self.messages, async {
            let ranking = self.gate.require_member_ranking(ranking_id, user_id).await?;
            if ranking.owner_id != user_id {
                return Err(DomainError::NotAuthorized);
            }

            self.store.soft_delete_ranking(ranking_id).await?;
            info!("Ranking {} deleted by owner {}", ranking_id, user_id);
            Ok(())
        })
        .await
    }

    pub async fn list_rankings_for_user(&self, user_id: &str) -> DomainResult<Vec<Ranking>> {
        surface("list_rankings_for_user", &self.messages, async {
            self.gate.require_user(user_id).await?;
            Ok(self.store.list_rankings_for_user(user_id).await?)
        })
        .await
    }

    pub async fn create_criteria(
        &self,
        ranking_id: &str,
        user_id: &str,
        name: &str,
    ) -> DomainResult<Criteria> {
        surface("create_criteria", &self.messages, async {
            let name = require_text("criteria name", name)?;
            self.gate.require_member_ranking(ranking_id, user_id).await?;

            match self.store.create_criteria(ranking_id, &name).await {
                Ok(criteria) => Ok(criteria),
                Err(e) if e.is_conflict() => Err(DomainError::validation(format!(
                    "criteria \"{name}\" already exists in this ranking"
                ))),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    pub async fn list_criteria(&self, ranking_id: &str, user_id: &str) -> DomainResult<Vec<Criteria>> {
        surface("list_criteria", &self.messages, async {
            self.gate.require_member_ranking(ranking_id, user_id).await?;
            Ok(self.store.list_criteria(ranking_id).await?)
        })
        .await
    }
}
