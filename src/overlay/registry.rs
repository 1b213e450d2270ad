use std::collections::BTreeMap;

use crate::constants::{MINIMIZED_BASE_MARGIN, MINIMIZED_SPACING, MINIMIZED_WIDTH};

/// Minimized overlays per category, in minimize order. An overlay's slot is
/// always its index in its category's sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinimizedRegistry {
    categories: BTreeMap<String, Vec<String>>,
}

impl MinimizedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to `category` and returns its slot. An id already present
    /// anywhere is moved to the end of `category`.
    pub fn push(&mut self, category: &str, id: &str) -> usize {
        self.remove(id);
        let members = self.categories.entry(category.to_string()).or_default();
        members.push(id.to_string());
        members.len() - 1
    }

    /// Removes `id`, returning its category and former slot. Later members
    /// shift down by one.
    pub fn remove(&mut self, id: &str) -> Option<(String, usize)> {
        let (category, index) = self
            .categories
            .iter()
            .find_map(|(category, members)| {
                members
                    .iter()
                    .position(|member| member == id)
                    .map(|index| (category.clone(), index))
            })?;
        if let Some(members) = self.categories.get_mut(&category) {
            members.remove(index);
            if members.is_empty() {
                self.categories.remove(&category);
            }
        }
        Some((category, index))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.categories
            .values()
            .find_map(|members| members.iter().position(|member| member == id))
    }

    pub fn members(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map_or(&[], |members| members.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Left edge of the minimized widget at `index`: laid out from the base margin
/// and never extending past `viewport_width - width - base margin`.
pub fn slot_left(index: usize, viewport_width: u16) -> u16 {
    let step = u32::from(MINIMIZED_WIDTH) + u32::from(MINIMIZED_SPACING);
    let natural = u32::from(MINIMIZED_BASE_MARGIN).saturating_add((index as u32).saturating_mul(step));
    let limit = viewport_width
        .saturating_sub(MINIMIZED_WIDTH)
        .saturating_sub(MINIMIZED_BASE_MARGIN);
    natural.min(u32::from(limit)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_insertion_order_per_category() {
        let mut reg = MinimizedRegistry::new();
        assert_eq!(reg.push("logs", "a"), 0);
        assert_eq!(reg.push("logs", "b"), 1);
        assert_eq!(reg.push("sites", "c"), 0);
        assert_eq!(reg.position("b"), Some(1));
        assert_eq!(reg.members("logs"), ["a", "b"]);
    }

    #[test]
    fn removal_compacts_later_slots() {
        let mut reg = MinimizedRegistry::new();
        for id in ["a", "b", "c", "d"] {
            reg.push("logs", id);
        }
        assert_eq!(reg.remove("b"), Some(("logs".to_string(), 1)));
        assert_eq!(reg.position("a"), Some(0));
        assert_eq!(reg.position("c"), Some(1));
        assert_eq!(reg.position("d"), Some(2));
        assert_eq!(reg.remove("b"), None);
    }

    #[test]
    fn emptied_category_disappears() {
        let mut reg = MinimizedRegistry::new();
        reg.push("logs", "a");
        reg.remove("a");
        assert!(reg.is_empty());
        assert!(reg.members("logs").is_empty());
    }

    #[test]
    fn slot_left_matches_formula_and_clamps() {
        let base = MINIMIZED_BASE_MARGIN;
        let step = MINIMIZED_WIDTH + MINIMIZED_SPACING;
        let width = 200;
        for i in 0..4u16 {
            let expected = (base + i * step).min(width - MINIMIZED_WIDTH - base);
            assert_eq!(slot_left(i as usize, width), expected);
        }
        assert_eq!(slot_left(50, 80), 80 - MINIMIZED_WIDTH - base);
        assert_eq!(slot_left(3, 10), 0);
    }
}
