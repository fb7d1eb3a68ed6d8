//! Score ledger
//!
//! One score per (item, user, criteria). The store's upsert is atomic on that
//! key, so two racing first votes still leave a single row.

use std::sync::Arc;

use ranko_common::config::ScoreConfig;
use ranko_common::db::{Score, ScoreDetail, UpsertOutcome};
use ranko_common::Store;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{surface, DomainError, DomainResult};
use crate::gate::Gate;
use crate::notify::{Notification, Notifier};
use crate::validation::check_score;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub score: Score,
    pub outcome: UpsertOutcome,
}

/// One (criteria, score) pair of a batch submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreInput {
    pub criteria_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PairOutcome {
    Created { score: Score },
    Updated { score: Score },
    Failed {
        criteria_id: String,
        kind: &'static str,
        error: String,
    },
}

/// Batch result; `results` follows input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub results: Vec<PairOutcome>,
}

/// A written score plus the names its notification mentions
struct Applied {
    result: ScoreResult,
    ranking_id: String,
    notice: (String, String, String),
}

#[derive(Clone)]
pub struct ScoreLedger {
    store: Arc<dyn Store>,
    gate: Gate,
    notifier: Notifier,
    bounds: ScoreConfig,
}

impl ScoreLedger {
    pub fn new(store: Arc<dyn Store>, notifier: Notifier, bounds: ScoreConfig) -> Self {
        Self {
            gate: Gate::new(Arc::clone(&store)),
            store,
            notifier,
            bounds,
        }
    }

    /// Record `user_id`'s score for an item on one criteria, replacing any earlier one
    pub async fn upsert_score(
        &self,
        item_id: &str,
        user_id: &str,
        criteria_id: &str,
        score: f64,
    ) -> DomainResult<ScoreResult> {
        surface("upsert_score", self.notifier.messages(), async {
            let applied = self.apply(item_id, user_id, criteria_id, score).await?;
            self.announce(&applied.ranking_id, user_id, applied.result.outcome, applied.notice)
                .await;
            Ok(applied.result)
        })
        .await
    }

    /// Apply each pair independently; a failing pair never stops the others
    ///
    /// Members get one notification for the whole batch rather than one per pair.
    pub async fn batch_upsert_scores(
        &self,
        item_id: &str,
        user_id: &str,
        pairs: &[ScoreInput],
    ) -> DomainResult<BatchSummary> {
        let mut summary = BatchSummary {
            total: pairs.len(),
            ..Default::default()
        };
        let mut announcement = None;

        for pair in pairs {
            match self.apply(item_id, user_id, &pair.criteria_id, pair.score).await {
                Ok(Applied {
                    result,
                    ranking_id,
                    notice,
                }) => {
                    match result.outcome {
                        UpsertOutcome::Created => {
                            summary.created += 1;
                            summary.results.push(PairOutcome::Created {
                                score: result.score,
                            });
                        }
                        UpsertOutcome::Updated => {
                            summary.updated += 1;
                            summary.results.push(PairOutcome::Updated {
                                score: result.score,
                            });
                        }
                    }
                    announcement = Some((ranking_id, notice));
                }
                Err(e) => {
                    let message = match e {
                        DomainError::Internal(detail) => {
                            error!(
                                "batch_upsert_scores pair {} failed: {}",
                                pair.criteria_id, detail
                            );
                            DomainError::Internal(
                                self.notifier.messages().operation_failed().to_string(),
                            )
                        }
                        other => other,
                    };
                    summary.failed += 1;
                    summary.results.push(PairOutcome::Failed {
                        criteria_id: pair.criteria_id.clone(),
                        kind: message.kind(),
                        error: message.to_string(),
                    });
                }
            }
        }

        if let Some((ranking_id, notice)) = announcement {
            let outcome = if summary.created > 0 {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::Updated
            };
            self.announce(&ranking_id, user_id, outcome, notice).await;
        }

        info!(
            "Batch for item {} by {}: {} created, {} updated, {} failed",
            item_id, user_id, summary.created, summary.updated, summary.failed
        );
        Ok(summary)
    }

    /// Scores of one item, visible to members of its ranking
    pub async fn list_scores(
        &self,
        item_id: &str,
        requester_id: &str,
    ) -> DomainResult<Vec<ScoreDetail>> {
        surface("list_scores", self.notifier.messages(), async {
            let item = self.gate.require_item(item_id).await?;
            self.gate
                .require_membership(&item.ranking_id, requester_id)
                .await?;
            Ok(self.store.list_scores(item_id).await?)
        })
        .await
    }

    /// Mean of every score on the item; `0` when it has none
    pub async fn average_score(&self, item_id: &str) -> DomainResult<f64> {
        surface("average_score", self.notifier.messages(), async {
            self.gate.require_item(item_id).await?;
            self.average_of(item_id).await
        })
        .await
    }

    /// Average without the existence check, for callers that already hold the item
    pub(crate) async fn average_of(&self, item_id: &str) -> DomainResult<f64> {
        Ok(self.store.average_score(item_id).await?.unwrap_or(0.0))
    }

    /// Validate and write one score without notifying anyone
    async fn apply(
        &self,
        item_id: &str,
        user_id: &str,
        criteria_id: &str,
        score: f64,
    ) -> DomainResult<Applied> {
        let score = check_score(score, &self.bounds)?;

        let (item, criteria) = tokio::try_join!(
            self.gate.require_item(item_id),
            self.gate.require_criteria(criteria_id),
        )?;
        if criteria.ranking_id != item.ranking_id {
            return Err(DomainError::validation(
                "criteria does not belong to the item's ranking",
            ));
        }

        let (ranking, scorer, _) = tokio::try_join!(
            self.gate.require_ranking(&item.ranking_id),
            self.gate.require_user(user_id),
            self.gate.require_membership(&item.ranking_id, user_id),
        )?;

        let (row, outcome) = self
            .store
            .upsert_score(item_id, user_id, criteria_id, score)
            .await?;

        Ok(Applied {
            result: ScoreResult { score: row, outcome },
            ranking_id: item.ranking_id,
            notice: (ranking.name, item.name, scorer.name),
        })
    }

    async fn announce(
        &self,
        ranking_id: &str,
        user_id: &str,
        outcome: UpsertOutcome,
        (ranking, item, scorer): (String, String, String),
    ) {
        let notification = match outcome {
            UpsertOutcome::Created => Notification::ItemScored {
                ranking,
                item,
                scorer,
            },
            UpsertOutcome::Updated => Notification::ScoreUpdated {
                ranking,
                item,
                scorer,
            },
        };
        self.notifier
            .notify_members(ranking_id, user_id, notification)
            .await;
    }
}
