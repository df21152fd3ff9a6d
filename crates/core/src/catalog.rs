//! Item catalog - the fixed universe of classifiable garbage cards
//!
//! A static compiled-in table; the pool and hand refer to entries by
//! [`ItemId`]. Entry order defines the id values, so lookup is a plain index.

use litter_panda_types::{Category, ItemId};

/// A classifiable garbage card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub title: &'static str,
    /// Opaque asset reference; resolved by the host, never inspected here.
    pub image: &'static str,
    pub category: Category,
}

/// The full card catalog.
pub const CATALOG: [Item; 12] = [
    Item {
        id: ItemId(0),
        title: "Styrofoam Cup",
        image: "items/styrofoam_cup.png",
        category: Category::General,
    },
    Item {
        id: ItemId(1),
        title: "Chip Bag",
        image: "items/chip_bag.png",
        category: Category::General,
    },
    Item {
        id: ItemId(2),
        title: "Broken Mug",
        image: "items/broken_mug.png",
        category: Category::General,
    },
    Item {
        id: ItemId(3),
        title: "Plastic Straw",
        image: "items/plastic_straw.png",
        category: Category::General,
    },
    Item {
        id: ItemId(4),
        title: "Newspaper",
        image: "items/newspaper.png",
        category: Category::Recycle,
    },
    Item {
        id: ItemId(5),
        title: "Tin Can",
        image: "items/tin_can.png",
        category: Category::Recycle,
    },
    Item {
        id: ItemId(6),
        title: "Glass Bottle",
        image: "items/glass_bottle.png",
        category: Category::Recycle,
    },
    Item {
        id: ItemId(7),
        title: "Cardboard Box",
        image: "items/cardboard_box.png",
        category: Category::Recycle,
    },
    Item {
        id: ItemId(8),
        title: "Banana Peel",
        image: "items/banana_peel.png",
        category: Category::Green,
    },
    Item {
        id: ItemId(9),
        title: "Apple Core",
        image: "items/apple_core.png",
        category: Category::Green,
    },
    Item {
        id: ItemId(10),
        title: "Tea Bag",
        image: "items/tea_bag.png",
        category: Category::Green,
    },
    Item {
        id: ItemId(11),
        title: "Egg Shell",
        image: "items/egg_shell.png",
        category: Category::Green,
    },
];

/// Look up an item by id.
pub fn item(id: ItemId) -> Option<&'static Item> {
    CATALOG.get(id.index())
}

/// Ids of every catalog entry, in table order.
pub fn all_ids() -> impl Iterator<Item = ItemId> {
    CATALOG.iter().map(|entry| entry.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_table_order() {
        for (index, entry) in CATALOG.iter().enumerate() {
            assert_eq!(entry.id.index(), index);
            assert_eq!(item(entry.id), Some(entry));
        }
    }

    #[test]
    fn test_unknown_id_lookup() {
        assert_eq!(item(ItemId(CATALOG.len() as u16)), None);
    }

    #[test]
    fn test_every_category_represented() {
        for cat in Category::ALL {
            let count = CATALOG.iter().filter(|e| e.category == cat).count();
            assert!(count >= 4, "too few {:?} items: {}", cat, count);
        }
    }

    #[test]
    fn test_titles_and_images_unique() {
        for a in CATALOG.iter() {
            for b in CATALOG.iter() {
                if a.id != b.id {
                    assert_ne!(a.title, b.title);
                    assert_ne!(a.image, b.image);
                }
            }
        }
    }
}
