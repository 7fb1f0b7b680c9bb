pub mod item;

pub use item::{FabricPatch, FabricSpecs, InventoryItem, ItemPatch, NewItem};
