//! Headless round runtime.
//!
//! Wires the adapter server, the round state machine, and record submission
//! together: a UI client connects over TCP, plays the round by streaming
//! resolved drag events, and saves the final record when done. Records land
//! in an append-only JSON-lines file.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context;

use litter_panda::adapter::{
    build_observation, create_ack, create_error, create_record_saved, Adapter, ClientCommand,
    ErrorCode, InboundPayload, LastEvent, OutboundMessage, PassthroughAssets, ServerMessage,
};
use litter_panda::core::RoundState;
use litter_panda::record::{Identity, PlayerRecord, RecordFinalizer, RecordStore, SubmitOutcome};
use litter_panda::types::ClassifyError;

/// Player identity from the environment (`PANDA_PLAYER`).
struct EnvIdentity;

impl Identity for EnvIdentity {
    fn player_name(&self) -> Option<String> {
        std::env::var("PANDA_PLAYER").ok().filter(|s| !s.is_empty())
    }
}

/// Identity named explicitly by the UI's save command.
struct NamedIdentity(String);

impl Identity for NamedIdentity {
    fn player_name(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Append-only JSON-lines record store.
struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RecordStore for JsonlStore {
    fn store_record(&self, record: &PlayerRecord) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        serde_json::to_writer(&mut file, record)?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

fn seed_from_env() -> u32 {
    std::env::var("PANDA_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
        })
}

fn main() -> anyhow::Result<()> {
    let Some(mut adapter) = Adapter::start_from_env() else {
        eprintln!("[panda] adapter disabled via PANDA_UI_DISABLED; nothing to serve");
        return Ok(());
    };

    let records_path =
        std::env::var("PANDA_RECORDS_PATH").unwrap_or_else(|_| "records.jsonl".to_string());
    let store = JsonlStore::new(PathBuf::from(records_path));
    let assets = PassthroughAssets;

    let mut round = RoundState::new(seed_from_env());
    round.start();
    let mut finalizer = RecordFinalizer::new();
    let mut obs_seq: u64 = 1;

    println!(
        "[panda] round started: {} cards, seed {}",
        round.catalog_size(),
        round.seed()
    );

    while let Some(inbound) = adapter.recv() {
        match inbound.payload {
            InboundPayload::SnapshotRequest => {
                let last_event = round.take_last_event().map(LastEvent::from);
                let obs = build_observation(obs_seq, &round.snapshot(), last_event, &assets);
                obs_seq += 1;
                adapter.send(OutboundMessage::ToClient {
                    client_id: inbound.client_id,
                    msg: ServerMessage::Observation(obs),
                });
            }
            InboundPayload::Command(cmd) => {
                match cmd {
                    ClientCommand::Classify { item, bin } => match round.classify(item, bin) {
                        Ok(outcome) => {
                            adapter.send(OutboundMessage::ToClient {
                                client_id: inbound.client_id,
                                msg: ServerMessage::Ack(create_ack(inbound.seq)),
                            });
                            if !outcome.correct {
                                println!("[panda] incorrect: item {} -> {}", item, bin.as_str());
                            }
                            if outcome.finished {
                                println!("[panda] round finished with {} points", outcome.score);
                            }
                        }
                        Err(err) => {
                            let code = match err {
                                ClassifyError::UnknownItem(_) => ErrorCode::UnknownItem,
                                ClassifyError::RoundFinished => ErrorCode::RoundFinished,
                            };
                            adapter.send(OutboundMessage::ToClient {
                                client_id: inbound.client_id,
                                msg: ServerMessage::Error(create_error(
                                    inbound.seq,
                                    code,
                                    &err.to_string(),
                                )),
                            });
                        }
                    },
                    ClientCommand::Restart => {
                        round.restart();
                        finalizer.reset();
                        adapter.send(OutboundMessage::ToClient {
                            client_id: inbound.client_id,
                            msg: ServerMessage::Ack(create_ack(inbound.seq)),
                        });
                        println!("[panda] round {} started", round.round_id());
                    }
                    ClientCommand::Save { player } => {
                        if !round.finished() {
                            adapter.send(OutboundMessage::ToClient {
                                client_id: inbound.client_id,
                                msg: ServerMessage::Error(create_error(
                                    inbound.seq,
                                    ErrorCode::InvalidCommand,
                                    "round still in progress",
                                )),
                            });
                        } else {
                            let outcome = match player {
                                Some(name) => {
                                    finalizer.submit(&NamedIdentity(name), &store, round.score())
                                }
                                None => finalizer.submit(&EnvIdentity, &store, round.score()),
                            };
                            match outcome {
                                SubmitOutcome::Saved(record) => {
                                    println!(
                                        "[panda] record saved: {} {}",
                                        record.player, record.point
                                    );
                                    adapter.send(OutboundMessage::Broadcast {
                                        msg: ServerMessage::RecordSaved(create_record_saved(
                                            inbound.seq,
                                            &record.player,
                                            record.point,
                                        )),
                                    });
                                }
                                SubmitOutcome::AlreadySaved => {
                                    adapter.send(OutboundMessage::ToClient {
                                        client_id: inbound.client_id,
                                        msg: ServerMessage::Error(create_error(
                                            inbound.seq,
                                            ErrorCode::RecordFailed,
                                            "record already saved",
                                        )),
                                    });
                                }
                                SubmitOutcome::Disabled => {
                                    adapter.send(OutboundMessage::ToClient {
                                        client_id: inbound.client_id,
                                        msg: ServerMessage::Error(create_error(
                                            inbound.seq,
                                            ErrorCode::RecordFailed,
                                            "no player signed in",
                                        )),
                                    });
                                }
                                SubmitOutcome::Failed { reason, .. } => {
                                    eprintln!("[panda] record submission failed: {}", reason);
                                    adapter.send(OutboundMessage::ToClient {
                                        client_id: inbound.client_id,
                                        msg: ServerMessage::Error(create_error(
                                            inbound.seq,
                                            ErrorCode::RecordFailed,
                                            &reason,
                                        )),
                                    });
                                }
                            }
                        }
                    }
                }

                // Follow every command with a fresh observation so all
                // streaming clients stay in sync.
                let last_event = round.take_last_event().map(LastEvent::from);
                let obs = build_observation(obs_seq, &round.snapshot(), last_event, &assets);
                obs_seq += 1;
                adapter.send(OutboundMessage::Broadcast {
                    msg: ServerMessage::Observation(obs),
                });
            }
        }
    }

    Ok(())
}
