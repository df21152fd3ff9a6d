//! Protocol module - JSON message types for the UI adapter
//!
//! Implements the line-delimited JSON protocol spoken between the round
//! engine and UI clients. All messages have: type, seq (sequence number),
//! ts (timestamp in ms).

use serde::{Deserialize, Serialize};

use arrayvec::ArrayVec;
use litter_panda_types::{Category, ClassifyEvent, HAND_CAPACITY};

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

impl Default for HelloType {
    fn default() -> Self {
        Self::Hello
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "command")]
    Command,
}

impl Default for CommandType {
    fn default() -> Self {
        Self::Command
    }
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(rename = "stream_observations")]
    pub stream_observations: bool,
}

/// Operation carried by a command message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpName {
    Classify,
    Restart,
    Save,
}

impl<'de> Deserialize<'de> for OpName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("classify") {
            Ok(Self::Classify)
        } else if s.eq_ignore_ascii_case("restart") {
            Ok(Self::Restart)
        } else if s.eq_ignore_ascii_case("save") {
            Ok(Self::Save)
        } else {
            Err(serde::de::Error::custom("unknown op"))
        }
    }
}

impl Serialize for OpName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            OpName::Classify => serializer.serialize_str("classify"),
            OpName::Restart => serializer.serialize_str("restart"),
            OpName::Save => serializer.serialize_str("save"),
        }
    }
}

/// Lowercase wire form of [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryName {
    General,
    Recycle,
    Green,
}

impl From<Category> for CategoryName {
    fn from(value: Category) -> Self {
        match value {
            Category::General => CategoryName::General,
            Category::Recycle => CategoryName::Recycle,
            Category::Green => CategoryName::Green,
        }
    }
}

impl From<CategoryName> for Category {
    fn from(value: CategoryName) -> Self {
        match value {
            CategoryName::General => Category::General,
            CategoryName::Recycle => Category::Recycle,
            CategoryName::Green => Category::Green,
        }
    }
}

impl<'de> Deserialize<'de> for CategoryName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        Category::from_str(s)
            .map(CategoryName::from)
            .ok_or_else(|| serde::de::Error::custom("invalid category"))
    }
}

impl Serialize for CategoryName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(Category::from(*self).as_str())
    }
}

/// Command message (controller only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub op: OpName,
    /// Catalog id of the dragged card (classify only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<u16>,
    /// Target bin the card was dropped on (classify only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<CategoryName>,
    /// Player name override for save; falls back to the host identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordSavedType {
    #[serde(rename = "record_saved")]
    RecordSaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "unknown_item")]
    UnknownItem,
    #[serde(rename = "round_finished")]
    RoundFinished,
    #[serde(rename = "record_failed")]
    RecordFailed,
    #[serde(rename = "backpressure")]
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub game_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSavedMessage {
    #[serde(rename = "type")]
    pub msg_type: RecordSavedType,
    pub seq: u64,
    pub ts: u64,
    pub player: String,
    pub point: u32,
}

/// One card of the active hand as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCard {
    pub id: u16,
    pub title: String,
    /// Resolved (or passthrough) asset location for the card image.
    pub image: String,
    pub category: CategoryName,
}

/// Bounded hand list; rejects payloads above the hand capacity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandList(pub ArrayVec<HandCard, HAND_CAPACITY>);

impl<'de> Deserialize<'de> for HandList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = HandList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of hand cards")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<HandCard, HAND_CAPACITY>::new();
                while let Some(card) = seq.next_element::<HandCard>()? {
                    out.try_push(card)
                        .map_err(|_| serde::de::Error::custom("too many hand cards"))?;
                }
                Ok(HandList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for HandList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for card in &self.0 {
            seq.serialize_element(card)?;
        }
        seq.end()
    }
}

/// Last classification, as streamed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
    pub item: u16,
    pub bin: CategoryName,
    pub correct: bool,
    pub delta: u32,
}

impl From<ClassifyEvent> for LastEvent {
    fn from(value: ClassifyEvent) -> Self {
        Self {
            item: value.item.0,
            bin: value.bin.into(),
            correct: value.correct,
            delta: value.delta,
        }
    }
}

/// Full round state snapshot streamed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub finished: bool,
    pub round_id: u32,
    pub seed: u32,
    pub score: u32,
    pub pool_remaining: u16,
    pub discarded: u16,
    pub catalog_size: u16,
    pub hand: HandList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event: Option<LastEvent>,
}

// ============== Helpers ==============

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn create_hello(seq: u64, name: &str, version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: name.to_string(),
            version: version.to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        requested: RequestedCapabilities {
            stream_observations: true,
        },
    }
}

pub fn create_classify(seq: u64, item: u16, bin: Category) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        op: OpName::Classify,
        item: Some(item),
        bin: Some(bin.into()),
        player: None,
    }
}

pub fn create_restart(seq: u64) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        op: OpName::Restart,
        item: None,
        bin: None,
        player: None,
    }
}

pub fn create_save(seq: u64, player: Option<&str>) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        op: OpName::Save,
        item: None,
        bin: None,
        player: player.map(str::to_string),
    }
}

pub fn create_welcome(seq: u64, protocol_version: &str) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        game_id: GAME_ID.to_string(),
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

pub fn create_record_saved(seq: u64, player: &str, point: u32) -> RecordSavedMessage {
    RecordSavedMessage {
        msg_type: RecordSavedType::RecordSaved,
        seq,
        ts: current_timestamp_ms(),
        player: player.to_string(),
        point,
    }
}

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "litter-panda";

/// A decoded client line.
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(serde_json::Value),
}

pub fn parse_message(line: &str) -> Result<ParsedMessage, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    match value.get("type").and_then(|v| v.as_str()) {
        Some("hello") => Ok(ParsedMessage::Hello(serde_json::from_str(line)?)),
        Some("command") => Ok(ParsedMessage::Command(serde_json::from_str(line)?)),
        _ => Ok(ParsedMessage::Unknown(value)),
    }
}
