use crate::error::{GameError, Result};
use crate::model::inventory::{self, InventoryItem};
use crate::model::story::StoryOption;

/// Required item names not held unused, in declaration order.
pub fn missing_items(option: &StoryOption, inventory: &[InventoryItem]) -> Vec<String> {
    option
        .requirements()
        .filter(|name| !inventory::has_unused(inventory, name))
        .map(str::to_string)
        .collect()
}

/// Checks names one at a time; a name listed twice is met by one unused copy.
pub fn check_requirements(option: &StoryOption, inventory: &[InventoryItem]) -> Result<()> {
    match option
        .requirements()
        .find(|name| !inventory::has_unused(inventory, name))
    {
        Some(name) => Err(GameError::MissingRequiredItem(name.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gated(single: Option<&str>, many: &[&str]) -> StoryOption {
        StoryOption {
            text: "Go".into(),
            required_item: single.map(str::to_string),
            required_items: many.iter().map(|s| s.to_string()).collect(),
            ..StoryOption::default()
        }
    }

    #[test]
    fn used_item_does_not_satisfy_a_requirement() {
        let mut key = InventoryItem::new(1, "key", "");
        key.used = true;
        let option = gated(Some("key"), &[]);
        assert!(matches!(
            check_requirements(&option, &[key]),
            Err(GameError::MissingRequiredItem(name)) if name == "key"
        ));
    }

    #[test]
    fn all_missing_names_are_listed() {
        let inventory = vec![InventoryItem::new(1, "lamp", "")];
        let option = gated(Some("key"), &["lamp", "rope"]);
        assert_eq!(missing_items(&option, &inventory), vec!["key", "rope"]);
    }

    #[test]
    fn repeated_name_is_met_by_one_copy() {
        let inventory = vec![InventoryItem::new(1, "key", "")];
        let option = gated(None, &["key", "key"]);
        assert!(check_requirements(&option, &inventory).is_ok());
        assert!(missing_items(&option, &inventory).is_empty());
    }

    #[test]
    fn ungated_option_always_passes() {
        assert!(check_requirements(&gated(None, &[]), &[]).is_ok());
    }
}
