//! WebSocket Server
//!
//! One task owns the entire simulation. Connection tasks never touch
//! the world; they decode frames into commands, push them over a
//! channel, and relay outbound frames from their per-client sender.
//! Event fan-out happens where the events are drained, so every client
//! sees state changes in the same order.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::bot::BotRunner;
use crate::core::rng::{derive_seed, Lcg};
use crate::game::combat::CombatError;
use crate::game::events::EventRoute;
use crate::game::movement::MoveOutcome;
use crate::game::state::EntityId;
use crate::game::{combat, items, movement, GameConfig, Scheduler, World};
use crate::network::protocol::{self, ClientMessage, ServerMessage};
use crate::world::generator;

/// Simulation step interval.
const TICK_MS: u64 = 50;
/// Display names longer than this are truncated.
const MAX_NAME_LEN: usize = 24;

/// Server startup failures.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Could not bind the listen address
    #[error("bind failed: {0}")]
    Bind(#[from] std::io::Error),
}

enum Command {
    Connect {
        conn_id: u64,
        sender: mpsc::UnboundedSender<Message>,
    },
    Disconnect {
        conn_id: u64,
    },
    Incoming {
        conn_id: u64,
        message: ClientMessage,
    },
}

struct ClientHandle {
    sender: mpsc::UnboundedSender<Message>,
    entity: Option<EntityId>,
}

/// A bound arena server, ready to run.
pub struct Server {
    listener: TcpListener,
    config: GameConfig,
}

impl Server {
    /// Bind the listen address.
    pub async fn bind(addr: &str, config: GameConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "listening");
        Ok(Self { listener, config })
    }

    /// The bound address, useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections and run the simulation until the process is
    /// interrupted.
    pub async fn run(self) -> Result<(), ServerError> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let config = self.config.clone();
        let game = tokio::spawn(game_loop(config, command_rx));

        let mut next_conn_id: u64 = 0;
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted?;
                    let conn_id = next_conn_id;
                    next_conn_id += 1;
                    debug!(%peer, conn_id, "connection accepted");
                    tokio::spawn(connection_task(stream, conn_id, command_tx.clone()));
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    break;
                }
            }
        }
        drop(command_tx);
        let _ = game.await;
        Ok(())
    }
}

/// Per-connection task: socket reader plus a writer pump.
async fn connection_task(
    stream: TcpStream,
    conn_id: u64,
    commands: mpsc::UnboundedSender<Command>,
) {
    let socket = match tokio_tungstenite::accept_async(stream).await {
        Ok(socket) => socket,
        Err(error) => {
            warn!(conn_id, %error, "websocket handshake failed");
            return;
        }
    };
    let (mut sink, mut source) = socket.split();
    let (sender, mut outbound) = mpsc::unbounded_channel::<Message>();

    if commands
        .send(Command::Connect { conn_id, sender })
        .is_err()
    {
        return;
    }

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = source.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(_) => break,
        };
        match frame {
            Message::Text(text) => match protocol::decode_json(&text) {
                Ok(message) => {
                    if commands
                        .send(Command::Incoming { conn_id, message })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(error) => {
                    debug!(conn_id, %error, "undecodable frame");
                }
            },
            Message::Close(_) => break,
            // Pings are answered by tungstenite itself
            _ => {}
        }
    }

    let _ = commands.send(Command::Disconnect { conn_id });
    writer.abort();
}

/// The single owner of the world. Runs until the command channel closes.
async fn game_loop(config: GameConfig, mut commands: mpsc::UnboundedReceiver<Command>) {
    let mut rng = Lcg::from_seed_str(&config.world.seed);
    let walls = generator::generate_walls(config.world.width, config.world.height, &mut rng);
    info!(walls = walls.len(), seed = %config.world.seed, "arena generated");

    let mut world = World::new(walls, rng);
    let mut scheduler = Scheduler::new();
    let mut bots = BotRunner::new(&world, &config, derive_seed(&config.world.seed) ^ 0x5EED);
    let mut spawner = items::ItemSpawner::new(0);
    let mut clients: BTreeMap<u64, ClientHandle> = BTreeMap::new();

    let started = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_MS));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_tick = 0u64;

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                let now = started.elapsed().as_millis() as u64;
                handle_command(
                    &mut world, &config, &mut scheduler, &mut clients, command, now,
                );
                dispatch_events(&mut world, &clients);
            }
            _ = ticker.tick() => {
                let now = started.elapsed().as_millis() as u64;
                let dt = now.saturating_sub(last_tick).max(1);
                last_tick = now;

                for (entity, kind) in scheduler.drain_due(now) {
                    combat::fire_task(&mut world, &config, &mut scheduler, entity, kind, now);
                }
                bots.tick(&mut world, &config, &mut scheduler, dt, now);
                combat::burn_tick(&mut world, &config, &mut scheduler, now);
                combat::expire_spells(&mut world, &config, now);
                movement::regen_mana(&mut world, &config, dt);
                movement::prune_buffs(&mut world, now);
                spawner.tick(&mut world, &config, now);

                dispatch_events(&mut world, &clients);
            }
        }
    }
}

fn handle_command(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    clients: &mut BTreeMap<u64, ClientHandle>,
    command: Command,
    now: u64,
) {
    match command {
        Command::Connect { conn_id, sender } => {
            clients.insert(
                conn_id,
                ClientHandle {
                    sender,
                    entity: None,
                },
            );
        }
        Command::Disconnect { conn_id } => {
            if let Some(handle) = clients.remove(&conn_id) {
                if let Some(entity) = handle.entity {
                    info!(entity = %entity.short(), "client disconnected");
                    crate::game::leave_combatant(world, scheduler, &entity);
                }
            }
        }
        Command::Incoming { conn_id, message } => {
            handle_message(world, config, scheduler, clients, conn_id, message, now);
        }
    }
}

fn handle_message(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    clients: &mut BTreeMap<u64, ClientHandle>,
    conn_id: u64,
    message: ClientMessage,
    now: u64,
) {
    let Some(handle) = clients.get_mut(&conn_id) else {
        return;
    };

    match message {
        ClientMessage::Join { name, color } => {
            if handle.entity.is_some() {
                send(handle, &ServerMessage::Error {
                    message: "already joined".to_string(),
                });
                return;
            }
            let mut name = name.trim().to_string();
            name.truncate(MAX_NAME_LEN);
            if name.is_empty() {
                name = "anonymous".to_string();
            }
            let id = crate::game::join_combatant(
                world, config, scheduler, name, color, false, now,
            );
            handle.entity = Some(id);
            info!(entity = %id.short(), "client joined");
            send(handle, &ServerMessage::Welcome {
                id,
                width: config.world.width,
                height: config.world.height,
                walls: world.walls.clone(),
                combatants: world.combatant_snapshot(),
                items: world.item_snapshot(),
                config: config.clone(),
            });
        }
        ClientMessage::Move {
            position,
            velocity,
            facing,
        } => {
            let Some(id) = handle.entity else { return };
            if let MoveOutcome::Rejected(authoritative) =
                movement::apply_move(world, config, &id, position, velocity, facing, now)
            {
                send(handle, &ServerMessage::PositionCorrection {
                    position: authoritative,
                });
            }
        }
        ClientMessage::Aim { angle } => {
            let Some(id) = handle.entity else { return };
            movement::apply_aim(world, &id, angle);
        }
        ClientMessage::Cast { target } => {
            let Some(id) = handle.entity else { return };
            if let Err(error) = combat::cast_spell(world, config, &id, target, now) {
                send(handle, &ServerMessage::Error {
                    message: error.to_string(),
                });
            }
        }
        ClientMessage::Hit {
            spell_id,
            victim,
            position,
        } => {
            let Some(_) = handle.entity else { return };
            match combat::resolve_hit(world, config, scheduler, spell_id, &victim, position, now)
            {
                // Lost races and protected targets are routine, not
                // worth an error frame
                Ok(()) | Err(CombatError::UnknownSpell) | Err(CombatError::Protected) => {}
                Err(error) => {
                    debug!(spell_id, %error, "hit report rejected");
                }
            }
        }
        ClientMessage::WallHit { spell_id, position } => {
            let _ = combat::resolve_wall_impact(world, spell_id, position);
        }
        ClientMessage::Burst => {
            let Some(id) = handle.entity else { return };
            if let Err(error) = combat::trigger_burst(world, config, scheduler, &id, now) {
                send(handle, &ServerMessage::Error {
                    message: error.to_string(),
                });
            }
        }
        ClientMessage::Ping { nonce } => {
            send(handle, &ServerMessage::Pong { nonce });
        }
        ClientMessage::Leave => {
            if let Some(id) = handle.entity.take() {
                crate::game::leave_combatant(world, scheduler, &id);
            }
        }
    }
}

/// Drain the world's pending events and fan each one out per its route.
fn dispatch_events(world: &mut World, clients: &BTreeMap<u64, ClientHandle>) {
    for event in world.take_events() {
        let route = event.route();
        let message = ServerMessage::Event { event };
        let Ok(frame) = protocol::encode_json(&message) else {
            continue;
        };
        for handle in clients.values() {
            let deliver = match (&route, handle.entity) {
                (EventRoute::Broadcast, _) => true,
                (EventRoute::ToOne(target), Some(entity)) => *target == entity,
                (EventRoute::ToOthers(actor), Some(entity)) => *actor != entity,
                // Spectating connections get everything public
                (EventRoute::ToOne(_), None) => false,
                (EventRoute::ToOthers(_), None) => true,
            };
            if deliver {
                let _ = handle.sender.send(Message::Text(frame.clone()));
            }
        }
    }
}

fn send(handle: &ClientHandle, message: &ServerMessage) {
    if let Ok(frame) = protocol::encode_json(message) {
        let _ = handle.sender.send(Message::Text(frame));
    }
}
