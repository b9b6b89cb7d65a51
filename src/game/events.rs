//! Outbound notifications and their fan-out to subscribers
//!
//! Every subscriber owns one end of an unbounded crossbeam channel. Events
//! are only published when the underlying state change actually happened.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::cell::Cell;
use crate::game::player::{Player, PlayerId};

/// Snapshot of a player at the moment an event fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub max_score: u32,
    pub is_computer: bool,
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            score: player.score,
            max_score: player.max_score,
            is_computer: player.is_computer,
        }
    }
}

/// Changes raised by the game field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldEvent {
    PlayerCreated(PlayerInfo),
    PlayerReborn(PlayerInfo),
    /// Carries the final max score for the records table
    PlayerDead(PlayerInfo),
    FoodCreated(Cell),
    /// `eater` is `None` when food was removed by a reset
    FoodEaten { food: Cell, eater: Option<PlayerId> },
}

/// Session lifecycle and frame notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Started,
    Paused,
    Resumed,
    Finished,
    /// Fired once per ticker frame, however many ticks ran
    RenderPermitted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Session(SessionEvent),
    Field(FieldEvent),
}

impl From<FieldEvent> for GameEvent {
    fn from(event: FieldEvent) -> Self {
        GameEvent::Field(event)
    }
}

impl From<SessionEvent> for GameEvent {
    fn from(event: SessionEvent) -> Self {
        GameEvent::Session(event)
    }
}

/// Subscriber list
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<GameEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber; dropping the receiver unsubscribes
    pub fn subscribe(&self) -> Receiver<GameEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Deliver to every live subscriber, pruning disconnected ones
    pub fn publish(&self, event: impl Into<GameEvent>) {
        let event = event.into();
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        if subscribers.len() < before {
            debug!("Dropped {} disconnected subscriber(s)", before - subscribers.len());
        }
    }

    pub fn publish_all<I>(&self, events: I)
    where
        I: IntoIterator,
        I::Item: Into<GameEvent>,
    {
        for event in events {
            self.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(SessionEvent::Started);

        assert_eq!(a.try_recv().unwrap(), GameEvent::Session(SessionEvent::Started));
        assert_eq!(b.try_recv().unwrap(), GameEvent::Session(SessionEvent::Started));
    }

    #[test]
    fn test_disconnected_subscribers_are_pruned() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(SessionEvent::Paused);

        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }

    #[test]
    fn test_publish_all_preserves_order() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let food = Cell::new(3);
        bus.publish_all(vec![
            FieldEvent::FoodCreated(food.clone()),
            FieldEvent::FoodEaten { food, eater: None },
        ]);

        assert!(matches!(rx.try_recv().unwrap(), GameEvent::Field(FieldEvent::FoodCreated(_))));
        assert!(matches!(
            rx.try_recv().unwrap(),
            GameEvent::Field(FieldEvent::FoodEaten { eater: None, .. })
        ));
    }

    #[test]
    fn test_player_info_snapshot() {
        let mut player = Player::computer("Computer1");
        player.score = 12;
        player.max_score = 40;
        let info = PlayerInfo::from(&player);
        assert_eq!(info.id, player.id);
        assert_eq!(info.max_score, 40);
        assert!(info.is_computer);
    }
}
