//! CLI Tooling
//!
//! Command-line interface over the on-disk backend. Each invocation attaches
//! to the partitions persisted under the storage root.

use crate::config::PartfsConfig;
use crate::error::{ApiError, StorageError};
use crate::node::{Directory, ReadRange, RegularFile};
use crate::partition::{DiskPartitionManager, Partition};
use crate::storage::Storage;
use crate::types::{DirEntry, NodeKind, PartitionId};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::NOTHING, Cell, CellAlignment, Table};
use serde_json::json;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Partfs CLI - partitioned hierarchical storage
#[derive(Parser)]
#[command(name = "partfs")]
#[command(about = "Partitioned hierarchical storage with an on-disk backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Storage root directory (overrides configuration)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a partition (a random id is generated when omitted)
    Create {
        uuid: Option<String>,
    },
    /// Destroy a partition and everything stored in it
    Destroy {
        uuid: String,
    },
    /// List a directory
    Ls {
        uuid: String,
        /// Absolute directory path
        #[arg(default_value = "/")]
        path: String,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ListFormat,
    },
    /// Print (part of) a regular file
    Cat {
        uuid: String,
        /// Absolute file path
        path: String,
        /// Start offset in bytes
        #[arg(long)]
        offset: Option<u64>,
        /// Number of bytes to read (default: rest of file)
        #[arg(long)]
        size: Option<u64>,
    },
    /// Store a new regular file
    Store {
        uuid: String,
        /// Absolute path of the target directory
        dir: String,
        /// File name
        file: String,
        /// File contents
        data: String,
    },
    /// Create a directory
    Mkdir {
        uuid: String,
        /// Absolute path of the parent directory
        at: String,
        /// Directory name
        name: String,
    },
    /// Remove every partition under the storage root
    Clear,
}

/// Listing output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Text,
    Json,
}

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Message for the user, printed with a trailing newline
    Text(String),
    /// File contents, written unchanged
    Bytes(Vec<u8>),
}

impl CommandOutput {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CommandOutput::Text(text) => text.as_bytes(),
            CommandOutput::Bytes(bytes) => bytes,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            CommandOutput::Text(text) => writeln!(out, "{}", text),
            CommandOutput::Bytes(bytes) => out.write_all(bytes),
        }?;
        out.flush()
    }
}

/// CLI execution context
pub struct CliContext {
    storage: Storage<DiskPartitionManager>,
}

impl CliContext {
    /// Context over the partitions stored under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            storage: Storage::new(DiskPartitionManager::new(root)),
        }
    }

    /// Context from loaded configuration; seeds the bootstrap partition if configured.
    pub fn from_config(config: &PartfsConfig) -> Result<Self, ApiError> {
        let context = Self::new(config.storage.resolve_root()?);
        if let Some(bootstrap) = &config.storage.bootstrap {
            context.storage.bootstrap(bootstrap)?;
        }
        Ok(context)
    }

    pub fn root(&self) -> &Path {
        self.storage.manager().root()
    }

    pub fn storage(&self) -> &Storage<DiskPartitionManager> {
        &self.storage
    }

    /// Execute a command and return its output.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Create { uuid } => {
                let uuid = match uuid {
                    Some(uuid) => uuid.clone(),
                    None => PartitionId::generate().to_string(),
                };
                let partition = self.storage.create_partition(&uuid)?;
                info!(partition = %partition.id(), "Partition created from CLI");
                Ok(CommandOutput::Text(partition.id().to_string()))
            }
            Commands::Destroy { uuid } => {
                self.storage.lookup_partition(uuid)?;
                self.storage.destroy_partition(uuid)?;
                Ok(CommandOutput::Text(format!("Partition '{}' destroyed", uuid)))
            }
            Commands::Ls { uuid, path, format } => {
                self.handle_ls(uuid, path, *format).map(CommandOutput::Text)
            }
            Commands::Cat {
                uuid,
                path,
                offset,
                size,
            } => {
                let partition = self.storage.lookup_partition(uuid)?;
                let file = partition.open_regular_file(path)?;
                let range = ReadRange::resolve(*offset, *size, file.size()?)?;
                Ok(CommandOutput::Bytes(range.read(&file)?))
            }
            Commands::Store {
                uuid,
                dir,
                file,
                data,
            } => {
                if data.is_empty() {
                    return Err(StorageError::InvalidInput(format!(
                        "Cannot store empty file {}",
                        file
                    ))
                    .into());
                }
                let partition = self.storage.lookup_partition(uuid)?;
                let stored = partition
                    .open_dir(dir)?
                    .store_regular_file(file, data.as_bytes().to_vec())?;
                Ok(CommandOutput::Text(format!(
                    "File '{}' stored in {} with size {} bytes",
                    file,
                    dir,
                    stored.size()?
                )))
            }
            Commands::Mkdir { uuid, at, name } => {
                let partition = self.storage.lookup_partition(uuid)?;
                partition.open_dir(at)?.create_directory(name)?;
                Ok(CommandOutput::Text(format!(
                    "Directory '{}' created in {}",
                    name, at
                )))
            }
            Commands::Clear => {
                self.storage.clear()?;
                Ok(CommandOutput::Text(format!("Cleared {}", self.root().display())))
            }
        }
    }

    fn handle_ls(&self, uuid: &str, path: &str, format: ListFormat) -> Result<String, ApiError> {
        let partition = self.storage.lookup_partition(uuid)?;
        let dir = partition.open_dir(path)?;
        let entries = dir.dir_entries()?;

        match format {
            ListFormat::Json => {
                let name = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let listing = json!({
                    "name": name,
                    "size": dir.size()?,
                    "type": NodeKind::Directory,
                    "entries": entries,
                });
                Ok(serde_json::to_string_pretty(&listing)?)
            }
            ListFormat::Text => Ok(format_listing(&entries)),
        }
    }
}

/// `d`/`-` marker, right-aligned size, name; one entry per line.
fn format_listing(entries: &[DirEntry]) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    for entry in entries {
        let marker = match entry.kind {
            NodeKind::Directory => "d",
            NodeKind::Regular => "-",
        };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(entry.size).set_alignment(CellAlignment::Right),
            Cell::new(&entry.name),
        ]);
    }
    table.to_string()
}
