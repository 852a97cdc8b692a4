use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{CharacterId, SessionId, UserId};

pub const DEFAULT_ACTION_TYPE: &str = "general";
pub const DEFAULT_DIFFICULTY: i32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    #[serde(rename = "class")]
    pub character_class: String,
    pub ancestry: String,
    #[serde(rename = "userId")]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSessionRequest {
    pub character_id: CharacterId,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollDiceRequest {
    pub character_id: CharacterId,
    pub user_id: Option<UserId>,
    pub action_type: String,
    pub difficulty: i32,
}

impl RollDiceRequest {
    pub fn general(character_id: CharacterId, user_id: Option<UserId>, difficulty: i32) -> Self {
        Self {
            character_id,
            user_id,
            action_type: DEFAULT_ACTION_TYPE.to_string(),
            difficulty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub name: String,
    #[serde(rename = "class")]
    pub character_class: String,
    pub ancestry: String,
    #[serde(default)]
    pub hope: i32,
    #[serde(default)]
    pub fear: i32,
    #[serde(default)]
    pub agility: i32,
    #[serde(default)]
    pub strength: i32,
    #[serde(default)]
    pub finesse: i32,
    #[serde(default)]
    pub instinct: i32,
    #[serde(default)]
    pub presence: i32,
    #[serde(default)]
    pub knowledge: i32,
    #[serde(default)]
    pub armor_score: i32,
    #[serde(default)]
    pub hit_points: i32,
    #[serde(default)]
    pub current_hit_points: i32,
    #[serde(default)]
    pub stress: i32,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<serde_json::Value>,
    #[serde(default)]
    pub spells: Vec<serde_json::Value>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Character {
    /// Multi-line sheet shown when the player asks to see their character.
    pub fn summary(&self) -> String {
        format!(
            "Name: {}\nClass: {}\nAncestry: {}\nHope: {}\nFear: {}",
            self.name, self.character_class, self.ancestry, self.hope, self.fear
        )
    }
}

fn default_true() -> bool {
    true
}

/// The server emits naive UTC timestamps; accept those alongside RFC 3339.
/// An unparseable value is dropped rather than failing the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSessionRecord {
    pub id: SessionId,
    pub user_id: Option<UserId>,
    pub character_id: CharacterId,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_scene: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<Character>,
}

/// Reply to both session start and dice rolls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<Character>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state: Option<GameSessionRecord>,
}

/// Error body produced by the game server for non-2xx replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_uses_server_field_names() {
        let request = CreateCharacterRequest {
            name: "Aria".into(),
            character_class: "ranger".into(),
            ancestry: "elf".into(),
            user_id: Some(UserId(42)),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["class"], "ranger");
        assert_eq!(value["userId"], 42);
        assert!(value.get("character_class").is_none());
    }

    #[test]
    fn unknown_user_serializes_as_null() {
        let request = GameSessionRequest {
            character_id: CharacterId(3),
            user_id: None,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["characterId"], 3);
        assert!(value["userId"].is_null());
    }

    #[test]
    fn character_record_tolerates_missing_attributes() {
        let character: Character = serde_json::from_str(
            r#"{"id":1,"name":"Aria","class":"ranger","ancestry":"elf","hope":5,"fear":3}"#,
        )
        .expect("decode");
        assert_eq!(character.id, CharacterId(1));
        assert_eq!(character.strength, 0);
        assert!(character.is_active);
        assert!(character.summary().contains("Class: ranger"));
    }

    #[test]
    fn turn_response_decodes_server_payload() {
        let raw = r#"{
            "success": true,
            "message": "dice rolled",
            "narrative": "Fortune favours you.",
            "character": {"id": 2, "user_id": 9, "name": "Bo", "class": "warrior",
                          "ancestry": "human", "hope": 6, "fear": 3,
                          "created_at": "2024-01-01T00:00:00Z"}
        }"#;
        let response: TurnResponse = serde_json::from_str(raw).expect("decode");
        assert!(response.success);
        assert_eq!(response.narrative.as_deref(), Some("Fortune favours you."));
        let character = response.character.expect("character");
        assert_eq!(character.hope, 6);
        assert!(character.created_at.is_some());
        assert!(response.game_state.is_none());
    }

    #[test]
    fn naive_server_timestamps_are_read_as_utc() {
        let character: Character = serde_json::from_str(
            r#"{"id":1,"name":"Aria","class":"ranger","ancestry":"elf",
                "created_at":"2024-03-05T10:20:30.123456"}"#,
        )
        .expect("decode");
        let created_at = character.created_at.expect("timestamp");
        assert_eq!(created_at.to_rfc3339(), "2024-03-05T10:20:30.123456+00:00");

        let character: Character = serde_json::from_str(
            r#"{"id":1,"name":"Aria","class":"ranger","ancestry":"elf","created_at":null}"#,
        )
        .expect("decode");
        assert!(character.created_at.is_none());
    }
}
