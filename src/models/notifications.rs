// src/models/notifications.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::base::{BaseFields, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(flatten)]
    pub base: BaseFields,

    pub user_id: Uuid,
    #[schema(example = "Candidatura aceita")]
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

impl Notification {
    pub fn new(user_id: Uuid, kind: NotificationType, title: &str, message: &str) -> Self {
        Self {
            base: BaseFields::new(),
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            kind,
            read: false,
            action_url: None,
        }
    }
}

impl Entity for Notification {
    const COLLECTION: &'static str = "notifications";
    const LABEL: &'static str = "Notificação";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}
