//! User-facing copy for notifications and generic failures

use std::str::FromStr;

use crate::notify::Notification;
use crate::notify::PushMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    PtBr,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "pt" | "pt-br" | "pt_br" => Ok(Locale::PtBr),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Message catalog for one locale
#[derive(Debug, Clone, Copy, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Shown in place of any internal failure
    pub fn operation_failed(&self) -> &'static str {
        match self.locale {
            Locale::En => "We could not complete this operation. Please try again later.",
            Locale::PtBr => {
                "Não foi possível concluir esta operação. Tente novamente mais tarde."
            }
        }
    }

    pub fn render(&self, notification: &Notification) -> PushMessage {
        let (title, body) = match (self.locale, notification) {
            (Locale::En, Notification::InviteReceived { ranking, inviter }) => (
                "New invite".to_string(),
                format!("{inviter} invited you to join the ranking \"{ranking}\""),
            ),
            (Locale::PtBr, Notification::InviteReceived { ranking, inviter }) => (
                "Novo convite".to_string(),
                format!("{inviter} convidou você para o ranking \"{ranking}\""),
            ),
            (Locale::En, Notification::MemberJoined { ranking, member }) => (
                "New member".to_string(),
                format!("{member} joined the ranking \"{ranking}\""),
            ),
            (Locale::PtBr, Notification::MemberJoined { ranking, member }) => (
                "Novo membro".to_string(),
                format!("{member} entrou no ranking \"{ranking}\""),
            ),
            (Locale::En, Notification::InviteDeclined { ranking, invitee }) => (
                "Invite declined".to_string(),
                format!("{invitee} declined the invite to \"{ranking}\""),
            ),
            (Locale::PtBr, Notification::InviteDeclined { ranking, invitee }) => (
                "Convite recusado".to_string(),
                format!("{invitee} recusou o convite para \"{ranking}\""),
            ),
            (Locale::En, Notification::ItemScored { ranking, item, scorer }) => (
                format!("New vote in \"{ranking}\""),
                format!("{scorer} voted on \"{item}\""),
            ),
            (Locale::PtBr, Notification::ItemScored { ranking, item, scorer }) => (
                format!("Novo voto em \"{ranking}\""),
                format!("{scorer} votou em \"{item}\""),
            ),
            (Locale::En, Notification::ScoreUpdated { ranking, item, scorer }) => (
                format!("Score updated in \"{ranking}\""),
                format!("{scorer} updated their score for \"{item}\""),
            ),
            (Locale::PtBr, Notification::ScoreUpdated { ranking, item, scorer }) => (
                format!("Nota atualizada em \"{ranking}\""),
                format!("{scorer} atualizou a nota de \"{item}\""),
            ),
        };

        PushMessage { title, body }
    }
}
