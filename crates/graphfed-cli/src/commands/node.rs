//! Structural and content changes

use clap::{Args, ValueEnum};
use graphfed_core::requests::{
    CopyBranchRequest, CreateNodeRequest, DeleteBranchRequest, MoveBranchRequest,
    NodeConflictBehavior, RenameNodeRequest, UpdatePropertiesRequest,
};
use graphfed_core::{GraphError, Location, Property, Result};

use super::values::parse_properties;
use super::{display_path, parse_location, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnConflict {
    /// Add a same-name sibling
    Append,
    /// Clear and reuse the existing child
    Replace,
    /// Keep the existing child as it is
    Keep,
}

impl From<OnConflict> for NodeConflictBehavior {
    fn from(value: OnConflict) -> Self {
        match value {
            OnConflict::Append => NodeConflictBehavior::Append,
            OnConflict::Replace => NodeConflictBehavior::Replace,
            OnConflict::Keep => NodeConflictBehavior::DoNotReplace,
        }
    }
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Parent path or node id
    pub parent: String,

    pub name: String,

    /// Initial property, NAME[:TYPE]=VALUE (repeatable)
    #[arg(long = "prop", value_name = "ASSIGNMENT")]
    pub props: Vec<String>,

    #[arg(long, value_enum, default_value_t = OnConflict::Append)]
    pub on_conflict: OnConflict,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    pub location: String,

    /// NAME[:TYPE]=VALUE assignments
    pub assignments: Vec<String>,

    /// Property to remove (repeatable)
    #[arg(long, value_name = "NAME")]
    pub remove: Vec<String>,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    pub location: String,
    pub new_name: String,
}

#[derive(Debug, Args)]
pub struct CopyArgs {
    pub from: String,
    /// New parent
    pub into: String,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub from: String,
    /// New parent
    pub into: String,

    /// Sibling under the new parent to place the node before
    #[arg(long)]
    pub before: Option<String>,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    pub location: String,
}

pub fn create(session: &mut Session, args: CreateArgs) -> Result<()> {
    let request = CreateNodeRequest::new(parse_location(&args.parent)?, args.name)
        .with_properties(parse_properties(&args.props)?)
        .with_conflict_behavior(args.on_conflict.into());
    let request = session.run(request)?;
    print_location(request.actual_location());
    Ok(())
}

pub fn set(session: &mut Session, args: SetArgs) -> Result<()> {
    let mut properties = parse_properties(&args.assignments)?;
    properties.extend(args.remove.into_iter().map(Property::empty));
    if properties.is_empty() {
        return Err(GraphError::invalid_argument(
            "properties",
            "nothing to set or remove",
        ));
    }

    let request = UpdatePropertiesRequest::new(parse_location(&args.location)?, properties);
    let request = session.run(request)?;
    print_location(request.actual_location());
    Ok(())
}

pub fn rename(session: &mut Session, args: RenameArgs) -> Result<()> {
    let request = RenameNodeRequest::new(parse_location(&args.location)?, args.new_name);
    let request = session.run(request)?;
    println!(
        "{} -> {}",
        display_path(request.actual_old_location()),
        display_path(request.actual_new_location())
    );
    Ok(())
}

pub fn copy(session: &mut Session, args: CopyArgs) -> Result<()> {
    let request = CopyBranchRequest::new(parse_location(&args.from)?, parse_location(&args.into)?);
    let request = session.run(request)?;
    print_location(request.actual_location_of_copy());
    Ok(())
}

pub fn move_branch(session: &mut Session, args: MoveArgs) -> Result<()> {
    let mut request =
        MoveBranchRequest::new(parse_location(&args.from)?, parse_location(&args.into)?);
    if let Some(before) = &args.before {
        request = request.before(parse_location(before)?);
    }
    let request = session.run(request)?;
    println!(
        "{} -> {}",
        display_path(request.actual_old_location()),
        display_path(request.actual_new_location())
    );
    Ok(())
}

pub fn remove(session: &mut Session, args: RemoveArgs) -> Result<()> {
    let request = session.run(DeleteBranchRequest::new(parse_location(&args.location)?))?;
    println!("deleted {}", display_path(request.actual_location()));
    Ok(())
}

fn print_location(location: Option<&Location>) {
    match location.and_then(|l| l.id()) {
        Some(id) => println!("{}\t{}", display_path(location), id),
        None => println!("{}", display_path(location)),
    }
}
