use crate::Attributes;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
	FoldersOnly,
	#[default]
	FoldersAndFiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenItemPolicy {
	Include,
	#[default]
	Exclude,
}

/// Decides which enumerated or notified items are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShellItemFilter {
	pub item_type: ItemType,
	pub hidden_item_policy: HiddenItemPolicy,
}

impl ShellItemFilter {
	#[must_use]
	pub const fn new(item_type: ItemType, hidden_item_policy: HiddenItemPolicy) -> Self {
		Self {
			item_type,
			hidden_item_policy,
		}
	}

	#[must_use]
	pub const fn should_include(&self, attributes: Attributes) -> bool {
		if matches!(self.item_type, ItemType::FoldersOnly) && !attributes.contains(Attributes::FOLDER)
		{
			return false;
		}

		!(matches!(self.hidden_item_policy, HiddenItemPolicy::Exclude)
			&& attributes.contains(Attributes::HIDDEN))
	}
}
