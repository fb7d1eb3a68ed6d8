//! Push senders for tests

use std::sync::Mutex;

use async_trait::async_trait;
use ranko_core::notify::{PushError, PushMessage, PushSender};

/// Records every message instead of delivering it
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, PushMessage)>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn destinations(&self) -> Vec<String> {
        self.sent().into_iter().map(|(to, _)| to).collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, msg)| msg.title).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl PushSender for RecordingSender {
    async fn send(&self, destination: &str, message: &PushMessage) -> Result<(), PushError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), message.clone()));
        Ok(())
    }
}

/// Fails every delivery, like an unreachable gateway
#[derive(Default)]
pub struct FailingSender;

#[async_trait]
impl PushSender for FailingSender {
    async fn send(&self, _destination: &str, _message: &PushMessage) -> Result<(), PushError> {
        Err(PushError::Other("gateway unavailable".to_string()))
    }
}
