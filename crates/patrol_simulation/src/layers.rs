//! Collision Layers Constants
//!
//! Физические слои — centralised constants для всего проекта.
//!
//! ## Архитектура:
//! - **Layer (индекс 0..32):** на каком слое находится объект (`PhysicsLayer`)
//! - **Mask (битовая маска):** какие слои видит detection zone / поиск укрытий (`LayerMask`)
//!
//! ## Слои:
//! - Layer 8: Police
//! - Layer 9: Robbers
//! - Layer 10: Cover (укрытия)
//! - Layer 11: Vehicles
//! - Layer 12: Wildlife

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group};
use serde::{Deserialize, Serialize};

// ============================================================================
// Layer индексы
// ============================================================================

pub const LAYER_POLICE: u8 = 8;
pub const LAYER_ROBBER: u8 = 9;
pub const LAYER_COVER: u8 = 10;
pub const LAYER_VEHICLE: u8 = 11;
pub const LAYER_WILDLIFE: u8 = 12;

/// Битовая маска слоёв
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn from_layer(layer: u8) -> Self {
        Self(layer_bit(layer))
    }

    pub fn with_layer(self, layer: u8) -> Self {
        Self(self.0 | layer_bit(layer))
    }

    pub fn contains(&self, layer: u8) -> bool {
        self.0 & layer_bit(layer) != 0
    }
}

/// Бит слоя; слои за пределами 0..32 не попадают ни в одну маску
pub fn layer_bit(layer: u8) -> u32 {
    1u32.checked_shl(layer as u32).unwrap_or(0)
}

/// Rapier collision groups для объекта на слое `layer`, видимого маской `filter`
pub fn collision_groups(layer: u8, filter: LayerMask) -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(layer_bit(layer)),
        Group::from_bits_truncate(filter.0),
    )
}

/// Название слоя для debug логов
pub fn get_layer_name(layer: u8) -> &'static str {
    match layer {
        LAYER_POLICE => "Police",
        LAYER_ROBBER => "Robbers",
        LAYER_COVER => "Cover",
        LAYER_VEHICLE => "Vehicles",
        LAYER_WILDLIFE => "Wildlife",
        _ => "Unknown",
    }
}
