//! Lock-free command queue from input producers to the ticker
//!
//! Input threads and UI handlers submit commands without touching the
//! field lock; the ticker drains everything pending at the start of each
//! frame, so commands take effect on a tick boundary.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::game::player::PlayerId;
use crate::util::vec2::Vec2;

/// Inbound command for one player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldCommand {
    /// Desired velocity, any magnitude (shaped and clamped on apply)
    SetVelocity { player: PlayerId, velocity: Vec2 },
    /// Queue a split for the next tick
    Split { player: PlayerId },
}

impl FieldCommand {
    pub fn player(&self) -> PlayerId {
        match self {
            FieldCommand::SetVelocity { player, .. } | FieldCommand::Split { player } => *player,
        }
    }
}

/// Bounded command channel owned by the session
pub struct CommandBuffer {
    sender: Sender<FieldCommand>,
    receiver: Receiver<FieldCommand>,
    capacity: usize,
}

impl CommandBuffer {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Create a new producer handle
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            sender: self.sender.clone(),
        }
    }

    /// Take every pending command in submission order
    pub fn drain(&self) -> Vec<FieldCommand> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(crate::game::constants::session::COMMAND_BUFFER_CAPACITY)
    }
}

/// Clonable producer handle for input threads
#[derive(Clone)]
pub struct CommandSender {
    sender: Sender<FieldCommand>,
}

impl CommandSender {
    /// Submit without blocking; fails when the buffer is full
    pub fn try_send(&self, command: FieldCommand) -> Result<(), CommandBufferError> {
        self.sender.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => CommandBufferError::Full,
            TrySendError::Disconnected(_) => CommandBufferError::Disconnected,
        })
    }

    pub fn set_velocity(&self, player: PlayerId, velocity: Vec2) -> Result<(), CommandBufferError> {
        self.try_send(FieldCommand::SetVelocity { player, velocity })
    }

    pub fn split(&self, player: PlayerId) -> Result<(), CommandBufferError> {
        self.try_send(FieldCommand::Split { player })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandBufferError {
    /// Buffer is full (backpressure)
    #[error("command buffer full")]
    Full,
    /// The session was dropped
    #[error("command buffer disconnected")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_submit_and_drain_in_order() {
        let buffer = CommandBuffer::new(10);
        let sender = buffer.sender();
        let player = Uuid::new_v4();

        sender.set_velocity(player, Vec2::new(1.0, 0.0)).unwrap();
        sender.split(player).unwrap();
        assert_eq!(buffer.pending_count(), 2);

        let commands = buffer.drain();
        assert_eq!(
            commands,
            vec![
                FieldCommand::SetVelocity { player, velocity: Vec2::new(1.0, 0.0) },
                FieldCommand::Split { player },
            ]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_backpressure() {
        let buffer = CommandBuffer::new(1);
        let sender = buffer.sender();
        let player = Uuid::new_v4();

        assert!(sender.split(player).is_ok());
        assert_eq!(sender.split(player), Err(CommandBufferError::Full));

        buffer.drain();
        assert!(sender.split(player).is_ok());
    }

    #[test]
    fn test_disconnected_after_drop() {
        let buffer = CommandBuffer::new(4);
        let sender = buffer.sender();
        drop(buffer);
        assert_eq!(sender.split(Uuid::new_v4()), Err(CommandBufferError::Disconnected));
    }

    #[test]
    fn test_command_player() {
        let player = Uuid::new_v4();
        assert_eq!(FieldCommand::Split { player }.player(), player);
        assert_eq!(
            FieldCommand::SetVelocity { player, velocity: Vec2::ZERO }.player(),
            player
        );
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(CommandBuffer::default().capacity(), 1024);
    }
}
