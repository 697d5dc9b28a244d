//! # STARFALL Event System
//!
//! Notifications from the simulation to whoever listens (HUD, audio,
//! telemetry). The simulation only produces events; it never reads them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐                         ┌──────────────┐
//! │   EnemyAi    │──┐                   ┌─>│   HUD / UI   │
//! └──────────────┘  │   ┌───────────┐   │  └──────────────┘
//!                   ├──>│  Bounded  │───┤
//! ┌──────────────┐  │   │  Channel  │   │  ┌──────────────┐
//! │  Difficulty  │──┘   └───────────┘   └─>│    Audio     │
//! └──────────────┘                         └──────────────┘
//! ```
//!
//! Uses crossbeam channels; a full channel drops the event rather than
//! stalling the frame. A run of drops is logged once when it starts and
//! once when the channel accepts events again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use starfall_shared::{EntityRef, Vec3};

use crate::gameplay::EnemyArchetype;

/// Why an entity left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestroyCause {
    /// Detonated on the player.
    Kamikaze,
    /// Killed by projectile damage.
    Projectile,
    /// Removed without dying (scene reset).
    Despawned,
}

/// Events published by the combat simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum CombatEvent {
    // =========================================================================
    // Entity Events
    // =========================================================================
    /// An enemy entered the simulation.
    EntitySpawned {
        /// The new enemy.
        entity: EntityRef,
        /// Its archetype.
        archetype: EnemyArchetype,
        /// Spawn position.
        position: Vec3,
    },

    /// An entity took damage.
    EntityDamaged {
        /// Entity that was hit (the player for kamikaze damage).
        entity: EntityRef,
        /// Total damage dealt.
        amount: f32,
        /// Part of `amount` absorbed by shields.
        shield_absorbed: f32,
        /// Health (or hull) left afterwards.
        remaining: f32,
    },

    /// An entity was removed.
    EntityDestroyed {
        /// The removed entity.
        entity: EntityRef,
        /// Where it was.
        position: Vec3,
        /// Why.
        cause: DestroyCause,
    },

    // =========================================================================
    // Difficulty Events
    // =========================================================================
    /// Threshold mode advanced to a new level.
    WaveStarted {
        /// Level index into the threshold table.
        level: usize,
        /// Enemy cap at this level.
        max_enemies: usize,
    },

    /// Endless mode was switched on.
    EndlessModeEntered {
        /// Minutes survived at the switch.
        minutes: f32,
    },
}

/// Event bus for simulation notifications.
///
/// Pre-allocates a bounded channel so a slow consumer can never grow
/// memory in the frame loop.
pub struct EventBus {
    /// Sender end - held by event producers.
    sender: Sender<CombatEvent>,
    /// Receiver end - held by event consumers.
    receiver: Receiver<CombatEvent>,
    /// Events dropped since the channel was last able to accept one.
    dropped: Arc<AtomicU64>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.receiver.len())
            .field("dropped", &self.dropped.load(Ordering::Relaxed))
            .finish()
    }
}

/// Handle for sending events.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: Sender<CombatEvent>,
    /// Shared by every sender of the bus.
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: CombatEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => {
                let missed = self.dropped.swap(0, Ordering::Relaxed);
                if missed > 0 {
                    tracing::warn!("event channel drained, {} events were dropped", missed);
                }
                true
            }
            Err(TrySendError::Full(event)) => {
                if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                    tracing::warn!("event channel full, dropping events until it drains");
                } else {
                    tracing::trace!("event channel full, dropping {:?}", event);
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Events dropped since the channel last accepted one.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle for receiving events.
#[derive(Clone, Debug)]
pub struct EventReceiver {
    receiver: Receiver<CombatEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<CombatEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_channel_drops() {
        let bus = EventBus::new(1);
        let tx = bus.sender();
        let rx = bus.receiver();

        assert!(tx.send(CombatEvent::WaveStarted {
            level: 1,
            max_enemies: 10
        }));
        assert!(!tx.send(CombatEvent::EndlessModeEntered { minutes: 1.0 }));

        assert_eq!(rx.pending_count(), 1);
        let events = rx.drain();
        assert_eq!(
            events,
            vec![CombatEvent::WaveStarted {
                level: 1,
                max_enemies: 10
            }]
        );
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_undrained_bus_counts_drops_across_senders() {
        let bus = EventBus::new(2);
        let a = bus.sender();
        let b = a.clone();
        let rx = bus.receiver();

        let wave = |level| CombatEvent::WaveStarted {
            level,
            max_enemies: 1,
        };
        assert!(a.send(wave(1)));
        assert!(b.send(wave(2)));
        for level in 3..103 {
            assert!(!a.send(wave(level)));
            assert!(!b.send(wave(level)));
        }
        assert_eq!(a.dropped(), 200);
        assert_eq!(b.dropped(), 200);

        // First accepted event after a drain closes the run.
        assert_eq!(rx.drain().len(), 2);
        assert!(b.send(wave(0)));
        assert_eq!(a.dropped(), 0);
    }
}
