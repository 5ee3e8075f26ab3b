// Contact form log: append-only writes into the `contactMessages` collection.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::ContactMessage;
use crate::store::{DocumentStore, CONTACT_MESSAGES};

pub struct ContactStore {
    store: Arc<DocumentStore>,
}

impl ContactStore {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        ContactStore { store }
    }

    /// Append a message. New messages always start with status "unread";
    /// there is no read path in this application.
    pub async fn submit(&self, name: &str, email: &str, message: &str) -> AppResult<String> {
        if name.trim().is_empty() || email.trim().is_empty() || message.trim().is_empty() {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        let record = ContactMessage {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            message: message.trim().to_string(),
            status: "unread".to_string(),
            created_at: Some(Utc::now()),
        };

        let id = self
            .store
            .insert(CONTACT_MESSAGES, &serde_json::to_value(&record)?)
            .await?;
        info!("Stored contact message {}", id);
        Ok(id)
    }
}
