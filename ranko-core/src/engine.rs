//! Engine assembly
//!
//! Wires every component to one store and one push sender. Callers (the CLI,
//! or an HTTP layer) hold an `Engine` and call into its components.

use std::sync::Arc;

use ranko_common::config::{DispatchMode, NotificationConfig, ScoreConfig, TomlConfig};
use ranko_common::Store;
use tracing::warn;

use crate::accounts::Accounts;
use crate::invites::InviteManager;
use crate::items::ItemRegistry;
use crate::locale::{Locale, Messages};
use crate::notify::{HttpPushSender, LogPushSender, Notifier, PushSender};
use crate::rankings::RankingDirectory;
use crate::reports::ReportIntake;
use crate::scores::ScoreLedger;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub locale: Locale,
    pub dispatch: DispatchMode,
    pub scores: ScoreConfig,
}

impl EngineConfig {
    /// Engine settings from the TOML config; an unknown locale falls back to English
    pub fn from_toml(config: &TomlConfig) -> Self {
        let locale = config.notifications.locale.parse().unwrap_or_else(|e| {
            warn!("{}; falling back to en", e);
            Locale::En
        });

        Self {
            locale,
            dispatch: config.notifications.dispatch,
            scores: config.scores,
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    pub accounts: Accounts,
    pub rankings: RankingDirectory,
    pub invites: InviteManager,
    pub scores: ScoreLedger,
    pub items: ItemRegistry,
    pub reports: ReportIntake,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>, sender: Arc<dyn PushSender>, config: EngineConfig) -> Self {
        let messages = Messages::new(config.locale);
        let notifier = Notifier::new(Arc::clone(&store), sender, messages, config.dispatch);
        let scores = ScoreLedger::new(Arc::clone(&store), notifier.clone(), config.scores);

        Self {
            accounts: Accounts::new(Arc::clone(&store), messages),
            rankings: RankingDirectory::new(Arc::clone(&store), messages),
            invites: InviteManager::new(Arc::clone(&store), notifier),
            items: ItemRegistry::new(Arc::clone(&store), scores.clone(), messages),
            reports: ReportIntake::new(store, messages),
            scores,
        }
    }

    /// HTTP sender when a gateway is configured, otherwise log-only delivery
    pub fn push_sender(config: &NotificationConfig) -> Arc<dyn PushSender> {
        match &config.endpoint {
            Some(endpoint) => Arc::new(HttpPushSender::new(
                endpoint.clone(),
                config.access_token.clone(),
            )),
            None => Arc::new(LogPushSender),
        }
    }
}
