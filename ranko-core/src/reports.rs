//! Abuse report intake

use std::sync::Arc;

use ranko_common::db::{AbuseReport, NewReport, ReportTarget};
use ranko_common::Store;

use crate::error::{surface, DomainError, DomainResult};
use crate::gate::Gate;
use crate::locale::Messages;
use crate::validation::require_text;

#[derive(Clone)]
pub struct ReportIntake {
    store: Arc<dyn Store>,
    gate: Gate,
    messages: Messages,
}

impl ReportIntake {
    pub fn new(store: Arc<dyn Store>, messages: Messages) -> Self {
        Self {
            gate: Gate::new(Arc::clone(&store)),
            store,
            messages,
        }
    }

    pub async fn report_ranking(
        &self,
        ranking_id: &str,
        reporter_id: &str,
        description: &str,
    ) -> DomainResult<AbuseReport> {
        surface("report_ranking", &self.messages, async {
            let description = require_text("description", description)?;

            tokio::try_join!(
                self.gate.require_user(reporter_id),
                self.gate.require_ranking(ranking_id),
            )?;

            let report = self
                .store
                .create_report(&NewReport {
                    target_type: ReportTarget::Ranking,
                    ranking_id: ranking_id.to_string(),
                    item_id: None,
                    reporter_id: reporter_id.to_string(),
                    description,
                })
                .await?;
            Ok(report)
        })
        .await
    }

    /// Report an item; nothing is written unless the ranking and item both exist
    pub async fn report_item(
        &self,
        ranking_id: &str,
        item_id: &str,
        reporter_id: &str,
        description: &str,
    ) -> DomainResult<AbuseReport> {
        surface("report_item", &self.messages, async {
            let description = require_text("description", description)?;

            let (_, _, item) = tokio::try_join!(
                self.gate.require_user(reporter_id),
                self.gate.require_ranking(ranking_id),
                self.gate.require_item(item_id),
            )?;
            if item.ranking_id != ranking_id {
                return Err(DomainError::validation("item does not belong to the ranking"));
            }

            let report = self
                .store
                .create_report(&NewReport {
                    target_type: ReportTarget::Item,
                    ranking_id: ranking_id.to_string(),
                    item_id: Some(item.id),
                    reporter_id: reporter_id.to_string(),
                    description,
                })
                .await?;
            Ok(report)
        })
        .await
    }
}
