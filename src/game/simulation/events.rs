/// Gameplay notifications for audio and effects.

use bevy::prelude::*;

/// Discrete trigger raised by the simulation. Carries no payload.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    /// An enemy landed a melee hit.
    Attack,
    Dash,
    /// The player's dash struck an enemy.
    Hit,
    PlayerHurt,
    ChestCollected,
    TimeUp,
}
