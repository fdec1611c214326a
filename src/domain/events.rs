//! Wire events for the state-synchronization channel.
//!
//! Every change pushed to viewers travels as a `{"type": ..., "data": ...}`
//! envelope. The envelope is a closed tagged union so dispatch on both ends
//! is exhaustively checked instead of a stringly-typed switch.

use crate::domain::entities::{
    BandData, LogEntry, Order, Position, ProgramState, QuoteData, ServiceStatus, Setting,
};
use serde::{Deserialize, Serialize};

/// Payload of an `orderDeleted` event: only the id survives deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedOrder {
    pub id: i64,
}

/// Server→viewer event envelope.
///
/// Snapshot variants (`*sUpdated` carrying a Vec) replace a whole mirror
/// collection; single-entity variants upsert, append or remove by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    BandDataUpdated(BandData),
    PositionsUpdated(Vec<Position>),
    OrdersUpdated(Vec<Order>),
    OrderAdded(Order),
    OrderUpdated(Order),
    OrderDeleted(DeletedOrder),
    ServiceStatusUpdated(Vec<ServiceStatus>),
    LogAdded(LogEntry),
    LogsUpdated(Vec<LogEntry>),
    ProgramStateUpdated(ProgramState),
    QuoteUpdated(QuoteData),
    SettingUpdated(Setting),
}

impl ServerEvent {
    /// The wire `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::BandDataUpdated(_) => "bandDataUpdated",
            ServerEvent::PositionsUpdated(_) => "positionsUpdated",
            ServerEvent::OrdersUpdated(_) => "ordersUpdated",
            ServerEvent::OrderAdded(_) => "orderAdded",
            ServerEvent::OrderUpdated(_) => "orderUpdated",
            ServerEvent::OrderDeleted(_) => "orderDeleted",
            ServerEvent::ServiceStatusUpdated(_) => "serviceStatusUpdated",
            ServerEvent::LogAdded(_) => "logAdded",
            ServerEvent::LogsUpdated(_) => "logsUpdated",
            ServerEvent::ProgramStateUpdated(_) => "programStateUpdated",
            ServerEvent::QuoteUpdated(_) => "quoteUpdated",
            ServerEvent::SettingUpdated(_) => "settingUpdated",
        }
    }
}

/// Viewer→server frames. A single legacy message survives; everything else
/// goes through the REST surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    ToggleProgramState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{LogLevel, ProgramState};
    use chrono::Utc;

    #[test]
    fn test_envelope_tag_and_content_keys() {
        let event = ServerEvent::ProgramStateUpdated(ProgramState {
            id: 1,
            running: true,
            updated_at: Utc::now(),
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "programStateUpdated");
        assert_eq!(value["data"]["running"], true);
    }

    #[test]
    fn test_all_kinds_match_wire_tags() {
        let entry = LogEntry {
            id: 1,
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "m".to_string(),
        };
        let cases = vec![
            (ServerEvent::LogAdded(entry.clone()), "logAdded"),
            (ServerEvent::LogsUpdated(vec![entry]), "logsUpdated"),
            (ServerEvent::OrderDeleted(DeletedOrder { id: 3 }), "orderDeleted"),
        ];
        for (event, tag) in cases {
            assert_eq!(event.kind(), tag);
            assert_eq!(serde_json::to_value(&event).unwrap()["type"], tag);
        }
    }

    #[test]
    fn test_unknown_type_does_not_deserialize() {
        let raw = r#"{"type":"accountAdded","data":{"id":1}}"#;
        assert!(serde_json::from_str::<ServerEvent>(raw).is_err());
    }

    #[test]
    fn test_client_toggle_message() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"type":"toggleProgramState"}"#).unwrap();
        assert_eq!(message, ClientMessage::ToggleProgramState);
    }
}
