use crate::{
	Attributes, HiddenItemPolicy, ItemType, NamespaceError, PidlAbsolute, PidlChild,
};

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayNameKind {
	/// Name of the item relative to its parent folder.
	InFolder,
	/// Name that round trips through [`ShellNamespace::parse_display_name`].
	ForParsing,
}

/// Read-only view of a shell namespace.
///
/// Implementations are shared between the enumeration context and the original context,
/// hence `Send + Sync`.
pub trait ShellNamespace: Send + Sync {
	fn attributes(&self, pidl: &PidlAbsolute) -> Result<Attributes, NamespaceError>;

	fn display_name(
		&self,
		pidl: &PidlAbsolute,
		kind: DisplayNameKind,
	) -> Result<String, NamespaceError>;

	fn parse_display_name(&self, name: &str) -> Result<PidlAbsolute, NamespaceError>;

	/// Target of a link item, `Ok(None)` when the item is not a link.
	fn link_target(&self, pidl: &PidlAbsolute) -> Result<Option<PidlAbsolute>, NamespaceError>;

	/// Parent shown to the user when going up from `pidl`.
	fn virtual_parent(&self, pidl: &PidlAbsolute) -> Result<PidlAbsolute, NamespaceError> {
		pidl.parent()
			.ok_or_else(|| NamespaceError::NoParent(pidl.clone()))
	}

	fn is_namespace_root(&self, pidl: &PidlAbsolute) -> bool {
		pidl.is_root()
	}

	/// Checks attributes, preferring the metadata cached in the pidl itself and only
	/// asking the namespace when the pidl is a simple one.
	fn has_attributes(&self, pidl: &PidlAbsolute, attributes: Attributes) -> bool {
		if let Some(metadata) = pidl.last_item().and_then(PidlChild::metadata) {
			return metadata.attributes.contains(attributes);
		}

		self.attributes(pidl)
			.is_ok_and(|found| found.contains(attributes))
	}
}

/// Lists the children of a container.
///
/// Called on the enumeration context. Long running implementations should poll `stop`
/// and bail out with [`NamespaceError::Stopped`].
pub trait ShellEnumerator: Send + Sync {
	fn enumerate_directory(
		&self,
		pidl: &PidlAbsolute,
		item_type: ItemType,
		hidden_item_policy: HiddenItemPolicy,
		stop: &CancellationToken,
	) -> Result<Vec<PidlChild>, NamespaceError>;
}

/// Turns a simple pidl (as delivered by change notifications) into a full one.
///
/// Resolution failures are not errors: the given pidl is returned unchanged.
pub trait PidlUpdater: Send + Sync {
	fn get_updated_pidl(&self, simple: &PidlAbsolute) -> PidlAbsolute;
}
