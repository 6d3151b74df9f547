//! Wire messages between pages and the worker.

use serde::{Deserialize, Serialize};

/// Control messages sent by a page to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Trigger an immediate replay sweep.
    #[serde(rename = "PROCESS_QUEUE")]
    ProcessQueue,
    /// Delete all named cache partitions.
    #[serde(rename = "CLEAR_CACHE")]
    ClearCache,
}

/// Notifications broadcast by the worker to open pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientNotification {
    /// A form submission was queued for later replay.
    #[serde(rename = "FORM_QUEUED")]
    FormQueued {
        /// Queue record id.
        id: String,
        /// Human-readable status text.
        message: String,
    },
    /// A queued submission was replayed successfully.
    #[serde(rename = "FORM_SUBMITTED")]
    FormSubmitted {
        /// Queue record id.
        id: String,
        /// Human-readable status text.
        message: String,
    },
}

impl ClientNotification {
    /// The queue record id this notification refers to.
    pub fn id(&self) -> &str {
        match self {
            ClientNotification::FormQueued { id, .. } => id,
            ClientNotification::FormSubmitted { id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_message_wire_shape() {
        let msg: ControlMessage = serde_json::from_str(r#"{"type":"PROCESS_QUEUE"}"#).unwrap();
        assert_eq!(msg, ControlMessage::ProcessQueue);

        let msg: ControlMessage = serde_json::from_str(r#"{"type":"CLEAR_CACHE"}"#).unwrap();
        assert_eq!(msg, ControlMessage::ClearCache);

        assert!(serde_json::from_str::<ControlMessage>(r#"{"type":"UNKNOWN"}"#).is_err());
    }

    #[test]
    fn test_notification_wire_shape() {
        let n = ClientNotification::FormSubmitted {
            id: "form_1_abc".to_string(),
            message: "Offline form submitted successfully!".to_string(),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "FORM_SUBMITTED");
        assert_eq!(json["id"], "form_1_abc");
        assert!(json["message"].as_str().is_some());

        let queued = serde_json::to_value(ClientNotification::FormQueued {
            id: "form_2_def".to_string(),
            message: "queued".to_string(),
        })
        .unwrap();
        assert_eq!(queued["type"], "FORM_QUEUED");
    }
}
