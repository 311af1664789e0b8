//! GraphFed CLI
//!
//! Command-line client for a single graph source

use clap::{Parser, Subcommand};
use graphfed_core::ExError;

mod commands;

use commands::SourceArgs;

#[derive(Debug, Parser)]
#[command(name = "graphfed")]
#[command(about = "GraphFed - path-addressed node graph over pluggable stores", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a child node
    Create(commands::node::CreateArgs),
    /// List the children of a node in order
    Ls(commands::read::LsArgs),
    /// Show the properties of a node
    Props(commands::read::PropsArgs),
    /// Set or remove properties
    Set(commands::node::SetArgs),
    /// Rename a node in place
    Rename(commands::node::RenameArgs),
    /// Copy a branch under a new parent
    Cp(commands::node::CopyArgs),
    /// Move a branch under a new parent
    Mv(commands::node::MoveArgs),
    /// Delete a branch
    Rm(commands::node::RemoveArgs),
    /// Read a block of children
    Block(commands::read::BlockArgs),
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.source.log);

    let result = commands::Session::open(&cli.source).and_then(|mut session| {
        let outcome = match cli.command {
            Commands::Create(args) => commands::node::create(&mut session, args),
            Commands::Ls(args) => commands::read::ls(&mut session, args),
            Commands::Props(args) => commands::read::props(&mut session, args),
            Commands::Set(args) => commands::node::set(&mut session, args),
            Commands::Rename(args) => commands::node::rename(&mut session, args),
            Commands::Cp(args) => commands::node::copy(&mut session, args),
            Commands::Mv(args) => commands::node::move_branch(&mut session, args),
            Commands::Rm(args) => commands::node::remove(&mut session, args),
            Commands::Block(args) => commands::read::block(&mut session, args),
        };
        session.close();
        outcome
    });

    if let Err(e) = result {
        eprintln!("Error: {}", ExError::from(e));
        std::process::exit(1);
    }
}
