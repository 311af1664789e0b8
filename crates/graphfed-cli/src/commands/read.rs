//! Read commands

use clap::Args;
use graphfed_core::requests::{
    ReadAllChildrenRequest, ReadAllPropertiesRequest, ReadBlockOfChildrenRequest,
    ReadNextBlockOfChildrenRequest,
};
use graphfed_core::{CachePolicy, GraphError, Location, Result};
use serde_json::json;

use super::values::render_property;
use super::{display_path, parse_location, Session};

#[derive(Debug, Args)]
pub struct LsArgs {
    #[arg(default_value = "/")]
    pub location: String,

    /// Print each child's node id next to its path
    #[arg(long)]
    pub ids: bool,
}

#[derive(Debug, Args)]
pub struct PropsArgs {
    #[arg(default_value = "/")]
    pub location: String,

    /// Print properties and the resolved cache policy as JSON
    #[arg(long)]
    pub json: bool,

    /// Cache policy override for this read, in milliseconds
    #[arg(long, value_name = "MS")]
    pub cache_ms: Option<u64>,
}

#[derive(Debug, Args)]
pub struct BlockArgs {
    /// Parent, or with --after the sibling to continue from
    pub location: String,

    /// Zero-based list position of the first child
    #[arg(long, conflicts_with = "after")]
    pub start: Option<usize>,

    /// Read the siblings following LOCATION instead of its children
    #[arg(long)]
    pub after: bool,

    #[arg(long)]
    pub count: usize,

    #[arg(long)]
    pub ids: bool,
}

pub fn ls(session: &mut Session, args: LsArgs) -> Result<()> {
    let request = session.run(ReadAllChildrenRequest::new(parse_location(&args.location)?))?;
    print_children(request.children(), args.ids);
    Ok(())
}

pub fn props(session: &mut Session, args: PropsArgs) -> Result<()> {
    let mut request = ReadAllPropertiesRequest::new(parse_location(&args.location)?);
    if let Some(ms) = args.cache_ms {
        request = request.with_cache_policy(CachePolicy::from_millis(ms));
    }
    let request = session.run(request)?;

    if args.json {
        let properties: serde_json::Map<String, serde_json::Value> = request
            .properties()
            .iter()
            .map(|p| serde_json::to_value(&p.values).map(|values| (p.name.clone(), values)))
            .collect::<std::result::Result<_, serde_json::Error>>()
            .map_err(GraphError::from)?;
        let document = json!({
            "location": display_path(request.actual_location()),
            "properties": properties,
            "cache_ms": request.cache.resolved().map(|policy| policy.ttl_ms()),
        });
        println!("{}", document);
        return Ok(());
    }

    for property in request.properties() {
        println!("{}", render_property(property));
    }
    Ok(())
}

pub fn block(session: &mut Session, args: BlockArgs) -> Result<()> {
    let location = parse_location(&args.location)?;
    let children = if args.after {
        let request = ReadNextBlockOfChildrenRequest::new(location, args.count)?;
        session.run(request)?.children().to_vec()
    } else {
        let start = args.start.unwrap_or(0);
        let request = ReadBlockOfChildrenRequest::new(location, start, args.count)?;
        session.run(request)?.children().to_vec()
    };
    print_children(&children, args.ids);
    Ok(())
}

fn print_children(children: &[Location], ids: bool) {
    for child in children {
        match (ids, child.id()) {
            (true, Some(id)) => println!("{}\t{}", display_path(Some(child)), id),
            _ => println!("{}", display_path(Some(child))),
        }
    }
}
