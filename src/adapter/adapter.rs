//! Adapter integration module
//!
//! Wraps a local simulation around an authoritative remote engine. The
//! client never mutates its own state speculatively: locally produced
//! events go out over the transport, and only events the authority
//! confirms (echoed back as "game event" messages) are applied, at the
//! tick the authority scheduled them for. "clock" messages pull the
//! local simulation forward to the authority time.

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc::UnboundedSender;

use crate::core::GameState;
use crate::engine::GameEngine;
use crate::types::Event;

use super::protocol::{ClientMessage, ConnectedMessage, ServerMessage};

/// Client-side mirror of the server's game engine.
pub struct NetworkGameEngine {
    engine: GameEngine,
    player: usize,
    frame_rate: u32,
    transport: Option<UnboundedSender<ClientMessage>>,
}

impl NetworkGameEngine {
    /// Reconstructs the game from the handshake snapshot.
    pub fn connect(message: &ConnectedMessage) -> Result<Self> {
        let engine = GameEngine::unserialize(&message.game)
            .context("authority snapshot rejected")?;
        log::info!(
            "connected as player {} at tick {} ({} fps)",
            message.player,
            engine.time(),
            message.frame_rate
        );
        Ok(Self {
            engine,
            player: message.player,
            frame_rate: message.frame_rate,
            transport: None,
        })
    }

    pub fn player(&self) -> usize {
        self.player
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn time(&self) -> u64 {
        self.engine.time()
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    /// Whether the local player may place a payload right now. Read
    /// only: asking never advances the simulation.
    pub fn can_play(&self) -> bool {
        self.engine.can_play(self.player)
    }

    /// Attaches the outgoing half of the transport.
    pub fn install_transport(&mut self, sender: UnboundedSender<ClientMessage>) {
        self.transport = Some(sender);
    }

    /// Proposes a local event to the authority. The event is not
    /// applied here; it takes effect when the authority confirms it.
    pub fn send_event(&self, mut event: Event) -> Result<()> {
        event.player = Some(self.player);
        let sender = self
            .transport
            .as_ref()
            .ok_or_else(|| anyhow!("no transport installed"))?;
        sender
            .send(ClientMessage::GameEvent { event })
            .map_err(|_| anyhow!("transport closed"))
    }

    /// Handles one message from the authority, returning the snapshots
    /// produced by any clock-driven steps.
    pub fn receive(&mut self, message: ServerMessage) -> Result<Vec<GameState>> {
        match message {
            ServerMessage::GameEvent { event } => {
                self.engine
                    .add_event(event)
                    .context("confirmed event rejected")?;
                Ok(Vec::new())
            }
            ServerMessage::Clock { time } => Ok(self.step_to(time)),
        }
    }

    /// Steps the simulation until the local clock reaches `time`.
    pub fn step_to(&mut self, time: u64) -> Vec<GameState> {
        let lag = time.saturating_sub(self.engine.time());
        if lag > u64::from(self.frame_rate) {
            log::warn!("{} ticks behind the authority clock", lag);
        }
        let mut snapshots = Vec::with_capacity(lag as usize);
        while self.engine.time() < time {
            snapshots.push(self.engine.step());
        }
        snapshots
    }
}
