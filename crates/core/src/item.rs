//! Item types that matter to dynamic lighting.
//!
//! Only the light-relevant part of an item is modelled here: which items glow
//! when held, dropped, or framed, and how brightly.

use serde::{Deserialize, Serialize};

/// Item type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Regular torch.
    Torch,
    /// Redstone torch.
    RedstoneTorch,
    /// Soul torch.
    SoulTorch,
    /// Glowstone block or dust block item.
    Glowstone,
    /// Lantern.
    Lantern,
    /// Sea lantern.
    SeaLantern,
    /// Jack o'lantern.
    JackOLantern,
    /// Bucket of lava.
    LavaBucket,
    /// Blaze rod.
    BlazeRod,
    /// Any other item, identified by registry id. Never emits light.
    Other(u16),
}

impl ItemType {
    /// Block-light level (0-15) this item emits when carried by an entity.
    pub fn light_emission(self) -> u8 {
        match self {
            ItemType::Glowstone
            | ItemType::SeaLantern
            | ItemType::JackOLantern
            | ItemType::LavaBucket
            | ItemType::Lantern => 15,
            ItemType::Torch => 14,
            ItemType::BlazeRod => 10,
            ItemType::SoulTorch => 10,
            ItemType::RedstoneTorch => 7,
            ItemType::Other(_) => 0,
        }
    }

    /// Whether the item emits any light at all.
    pub fn is_luminous(self) -> bool {
        self.light_emission() > 0
    }
}

/// Brightest emission among an optional set of held items.
pub fn brightest<I>(items: I) -> u8
where
    I: IntoIterator<Item = Option<ItemType>>,
{
    items
        .into_iter()
        .flatten()
        .map(ItemType::light_emission)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torch_emits_fourteen() {
        assert_eq!(ItemType::Torch.light_emission(), 14);
        assert!(ItemType::Torch.is_luminous());
    }

    #[test]
    fn other_items_are_dark() {
        assert_eq!(ItemType::Other(3).light_emission(), 0);
        assert!(!ItemType::Other(3).is_luminous());
    }

    #[test]
    fn brightest_picks_max_and_ignores_empty_hands() {
        assert_eq!(brightest([None, None]), 0);
        assert_eq!(
            brightest([Some(ItemType::RedstoneTorch), Some(ItemType::Torch)]),
            14
        );
        assert_eq!(brightest([None, Some(ItemType::Other(1))]), 0);
    }
}
