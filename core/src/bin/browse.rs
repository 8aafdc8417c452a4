use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use sn_core::{
	logging, navigation::EnumerationOutcome, ConnectPosition, EngineConfig, NavigateParams,
	NavigationManager, ShellContext, ShellEntry, ShellEntryCollection, SlotGroup,
};
use sn_executor::{ChannelExecutor, Executor, TokioExecutor};
use sn_fs_watcher::ShellChangeManager;
use sn_shell::PidlAbsolute;
use tokio::runtime::Handle;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sn-browse", about = "Lists a directory, optionally watching it for changes")]
struct Args {
	/// Directory to list
	path: PathBuf,

	/// Engine configuration file, created with defaults when missing
	#[arg(long, env = "SN_CONFIG")]
	config: Option<PathBuf>,

	/// Include hidden items
	#[arg(long)]
	show_hidden: bool,

	/// Keep running and print changes to the directory's children
	#[arg(long)]
	watch: bool,
}

fn describe(entry: &ShellEntry) -> String {
	entry
		.pidl()
		.map_or_else(|| format!("<entry {}>", entry.id()), |pidl| pidl.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	let mut config = match &args.config {
		Some(path) => EngineConfig::load_from(path)?,
		None => EngineConfig::default(),
	};
	config.show_hidden_items |= args.show_hidden;
	logging::init(&config.logging());

	let path = args
		.path
		.canonicalize()
		.map_err(|e| format!("Invalid path {}: {e}", args.path.display()))?;
	let pidl = PidlAbsolute::from_path(&path);

	// Everything but enumeration runs on this thread
	let original = Arc::new(ChannelExecutor::new());
	let original_executor: Arc<dyn Executor> = original.clone();
	let change_manager = ShellChangeManager::new(Arc::clone(&original_executor));
	let context = ShellContext::file_system(
		Arc::clone(&original_executor),
		&Handle::current(),
		config.watcher_backend,
		&change_manager,
	);

	let manager = NavigationManager::new(
		context.clone(),
		Arc::new(TokioExecutor::current()),
		original_executor,
		config.navigation_settings(),
	);

	let _completed = manager.add_navigation_completed_observer(
		{
			let original = Arc::clone(&original);
			let watch = args.watch;
			move |request| {
				if let Some(EnumerationOutcome::Failed(e)) = request.outcome() {
					eprintln!("Failed to list {}: {e}", request.params().pidl);
				}

				for item in request.items() {
					println!("{}", item.name());
				}

				if !watch {
					original.close();
				}
			}
		},
		ConnectPosition::AtBack,
		SlotGroup::Default,
	);

	let collection = ShellEntryCollection::new(context, config.tree_filter());
	let _changes = if args.watch {
		let root = collection.add_top_level_entry(&pidl);
		root.load_children();

		let signals = collection.signals();
		vec![
			signals
				.entry_added
				.connect_default(|entry| println!("+ {}", describe(entry))),
			signals
				.entry_removed
				.connect_default(|removed| println!("- {}", removed.pidl)),
			signals
				.entry_renamed
				.connect_default(|entry| println!("> {}", describe(entry))),
			signals
				.entry_updated
				.connect_default(|entry| println!("~ {}", describe(entry))),
		]
	} else {
		Vec::new()
	};

	manager.start_navigation(NavigateParams::normal(pidl));

	tokio::select! {
		() = original.run() => {}
		result = tokio::signal::ctrl_c() => {
			result?;
			info!("Interrupted;");
		}
	}

	Ok(())
}
