use crate::error::SessionError;
use crate::message::{ClientMessage, Envelope, WireTrain};
use mex_core::ID;
use mex_domino::TileId;
use mex_match::Seat;
use serde::Deserialize;

/// Parses one inbound `{ type, data }` envelope into a [`ClientMessage`],
/// inbound message table. Unknown `type`s and payloads
/// that fail to match their expected shape are reported back to the sender,
/// never panics — a malformed client can only ever hurt itself.
pub fn decode(raw: &str) -> Result<ClientMessage, SessionError> {
    let envelope: Envelope =
        serde_json::from_str(raw).map_err(|err| SessionError::MalformedPayload(err.to_string()))?;

    let field = |name: &'static str| SessionError::MalformedPayload(format!("missing or invalid field '{name}'"));

    match envelope.kind.as_str() {
        "join_game" => {
            #[derive(Deserialize)]
            struct Data {
                player_name: String,
            }
            let data: Data = serde_json::from_value(envelope.data).map_err(|_| field("player_name"))?;
            Ok(ClientMessage::JoinGame { player_name: data.player_name })
        }
        "spectate_game" => {
            #[derive(Deserialize)]
            struct Data {
                spectator_name: String,
            }
            let data: Data = serde_json::from_value(envelope.data).map_err(|_| field("spectator_name"))?;
            Ok(ClientMessage::SpectateGame { spectator_name: data.spectator_name })
        }
        "start_game" => {
            #[derive(Deserialize, Default)]
            struct Data {
                #[serde(default)]
                force_start: bool,
            }
            let data: Data = serde_json::from_value(envelope.data).unwrap_or_default();
            Ok(ClientMessage::StartGame { force: data.force_start })
        }
        "make_move" => {
            #[derive(Deserialize)]
            struct Data {
                player_id: ID<Seat>,
                tile_id: TileId,
                #[serde(flatten)]
                destination: WireTrain,
            }
            let data: Data = serde_json::from_value(envelope.data).map_err(|err| SessionError::MalformedPayload(err.to_string()))?;
            Ok(ClientMessage::MakeMove {
                player_id: data.player_id,
                tile_id: data.tile_id,
                destination: data.destination.into(),
            })
        }
        "draw_domino" => {
            #[derive(Deserialize)]
            struct Data {
                player_id: ID<Seat>,
            }
            let data: Data = serde_json::from_value(envelope.data).map_err(|_| field("player_id"))?;
            Ok(ClientMessage::DrawDomino { player_id: data.player_id })
        }
        "get_valid_moves" => {
            #[derive(Deserialize)]
            struct Data {
                player_id: ID<Seat>,
                #[serde(default)]
                tile_id: Option<TileId>,
            }
            let data: Data = serde_json::from_value(envelope.data).map_err(|_| field("player_id"))?;
            Ok(ClientMessage::GetValidMoves { player_id: data.player_id, tile: data.tile_id })
        }
        "get_all_valid_moves" => {
            #[derive(Deserialize)]
            struct Data {
                player_id: ID<Seat>,
            }
            let data: Data = serde_json::from_value(envelope.data).map_err(|_| field("player_id"))?;
            Ok(ClientMessage::GetAllValidMoves { player_id: data.player_id })
        }
        "chat_message" => Ok(ClientMessage::ChatMessage { payload: envelope.data }),
        other => Err(SessionError::UnknownMessage(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_join_game() {
        let msg = decode(r#"{"type":"join_game","data":{"player_name":"alice"}}"#).unwrap();
        matches!(msg, ClientMessage::JoinGame { player_name } if player_name == "alice");
    }

    #[test]
    fn decodes_make_move_with_personal_destination() {
        let id = ID::<Seat>::default();
        let json = format!(
            r#"{{"type":"make_move","data":{{"player_id":"{id}","tile_id":3,"train_type":"personal","train_owner":1}}}}"#
        );
        let msg = decode(&json).unwrap();
        match msg {
            ClientMessage::MakeMove { tile_id, destination, .. } => {
                assert_eq!(tile_id, TileId(3));
                assert_eq!(destination, mex_domino::TrainKind::Personal(1));
            }
            _ => panic!("expected MakeMove"),
        }
    }

    #[test]
    fn decodes_make_move_with_mexican_destination() {
        let id = ID::<Seat>::default();
        let json = format!(
            r#"{{"type":"make_move","data":{{"player_id":"{id}","tile_id":3,"train_type":"mexican"}}}}"#
        );
        let msg = decode(&json).unwrap();
        match msg {
            ClientMessage::MakeMove { destination, .. } => assert_eq!(destination, mex_domino::TrainKind::Mexican),
            _ => panic!("expected MakeMove"),
        }
    }

    #[test]
    fn unknown_type_is_reported_not_fatal() {
        let err = decode(r#"{"type":"teleport","data":{}}"#).unwrap_err();
        assert_eq!(err.kind(), "unknown_message");
    }

    #[test]
    fn malformed_json_is_reported_not_fatal() {
        let err = decode("not json").unwrap_err();
        assert_eq!(err.kind(), "malformed_payload");
    }
}
