//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (faction, health)
//! - movement: команды перемещения и ориентации (MovementCommand, FacingCommand)
//! - player: player control marker (Player)
//!
//! Компоненты AI контроллера (AiState, AiConfig, SlotAssignment) живут
//! рядом со своими системами в crate::ai.

pub mod actor;
pub mod movement;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use player::*;
