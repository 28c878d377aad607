use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tmap",
    about = "Ordered key-value maps stored inside objects",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ./tmap.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Store directory, overriding the config file
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create (or reset) a map with an optional header
    Create(CreateArgs),
    /// Set a key
    Set(SetArgs),
    /// Remove a key
    Rm(KeyArgs),
    /// Replace a map's header
    SetHeader(SetHeaderArgs),
    /// Read one key
    Get(GetArgs),
    /// Print a map's header and entries
    Dump(ObjectArgs),
    /// Apply several operations as one atomic update
    Batch(BatchArgs),
    /// List stored objects
    Objects,
}

#[derive(Args)]
pub struct ObjectArgs {
    /// Target object (defaults to `default_object` from the config)
    #[arg(short, long)]
    pub object: Option<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub target: ObjectArgs,
    #[arg(long, default_value = "")]
    pub header: String,
}

#[derive(Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub target: ObjectArgs,
    pub key: String,
    pub value: String,
    /// Store the value bytes as-is instead of string-encoding them
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct KeyArgs {
    #[command(flatten)]
    pub target: ObjectArgs,
    pub key: String,
}

#[derive(Args)]
pub struct SetHeaderArgs {
    #[command(flatten)]
    pub target: ObjectArgs,
    pub header: String,
}

#[derive(Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: ObjectArgs,
    pub key: String,
    /// Fail on missing objects and corrupt data instead of printing nothing
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub target: ObjectArgs,
    /// Operations in order: `create:HEADER`, `header:HEADER`,
    /// `set:KEY=VALUE`, `rm:KEY`
    #[arg(required = true)]
    pub ops: Vec<String>,
}
