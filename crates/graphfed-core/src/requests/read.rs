use super::{require_same, CacheDirective};
use crate::errors::{GraphError, Result};
use crate::model::{CachePolicy, Location, Property};

/// Read the properties and ordered children of one node
#[derive(Debug, Clone, PartialEq)]
pub struct ReadNodeRequest {
    pub at: Location,
    pub cache: CacheDirective,
    actual_location: Option<Location>,
    properties: Vec<Property>,
    children: Vec<Location>,
}

impl ReadNodeRequest {
    pub fn new(at: Location) -> Self {
        Self {
            at,
            cache: CacheDirective::default(),
            actual_location: None,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache = CacheDirective::requesting(Some(policy));
        self
    }

    pub fn actual_location(&self) -> Option<&Location> {
        self.actual_location.as_ref()
    }

    pub fn set_actual_location(&mut self, actual: Location) -> Result<()> {
        require_same("at", &self.at, &actual)?;
        self.actual_location = Some(actual);
        Ok(())
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn children(&self) -> &[Location] {
        &self.children
    }

    pub(crate) fn set_results(&mut self, properties: Vec<Property>, children: Vec<Location>) {
        self.properties = properties;
        self.children = children;
    }
}

/// Read the children of a node, in list order
#[derive(Debug, Clone, PartialEq)]
pub struct ReadAllChildrenRequest {
    pub of: Location,
    pub cache: CacheDirective,
    actual_location: Option<Location>,
    children: Vec<Location>,
}

impl ReadAllChildrenRequest {
    pub fn new(of: Location) -> Self {
        Self {
            of,
            cache: CacheDirective::default(),
            actual_location: None,
            children: Vec::new(),
        }
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache = CacheDirective::requesting(Some(policy));
        self
    }

    pub fn actual_location(&self) -> Option<&Location> {
        self.actual_location.as_ref()
    }

    pub fn set_actual_location(&mut self, actual: Location) -> Result<()> {
        require_same("of", &self.of, &actual)?;
        self.actual_location = Some(actual);
        Ok(())
    }

    pub fn children(&self) -> &[Location] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<Location>) {
        self.children = children;
    }
}

/// Read the properties of a node, the reserved child list excluded
#[derive(Debug, Clone, PartialEq)]
pub struct ReadAllPropertiesRequest {
    pub of: Location,
    pub cache: CacheDirective,
    actual_location: Option<Location>,
    properties: Vec<Property>,
}

impl ReadAllPropertiesRequest {
    pub fn new(of: Location) -> Self {
        Self {
            of,
            cache: CacheDirective::default(),
            actual_location: None,
            properties: Vec::new(),
        }
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache = CacheDirective::requesting(Some(policy));
        self
    }

    pub fn actual_location(&self) -> Option<&Location> {
        self.actual_location.as_ref()
    }

    pub fn set_actual_location(&mut self, actual: Location) -> Result<()> {
        require_same("of", &self.of, &actual)?;
        self.actual_location = Some(actual);
        Ok(())
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Values of one property, if present
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub(crate) fn set_properties(&mut self, properties: Vec<Property>) {
        self.properties = properties;
    }
}

/// Read up to `count` children starting at a zero-based list position
#[derive(Debug, Clone, PartialEq)]
pub struct ReadBlockOfChildrenRequest {
    pub of: Location,
    pub starting_index: usize,
    pub count: usize,
    pub cache: CacheDirective,
    actual_location: Option<Location>,
    children: Vec<Location>,
}

impl ReadBlockOfChildrenRequest {
    /// # Errors
    /// `ArgumentValidation` if `count` is zero
    pub fn new(of: Location, starting_index: usize, count: usize) -> Result<Self> {
        validate_count(count)?;
        Ok(Self {
            of,
            starting_index,
            count,
            cache: CacheDirective::default(),
            actual_location: None,
            children: Vec::new(),
        })
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache = CacheDirective::requesting(Some(policy));
        self
    }

    pub fn actual_location(&self) -> Option<&Location> {
        self.actual_location.as_ref()
    }

    pub fn set_actual_location(&mut self, actual: Location) -> Result<()> {
        require_same("of", &self.of, &actual)?;
        self.actual_location = Some(actual);
        Ok(())
    }

    pub fn children(&self) -> &[Location] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<Location>) {
        self.children = children;
    }
}

/// Read up to `count` siblings strictly following `starting_after`
#[derive(Debug, Clone, PartialEq)]
pub struct ReadNextBlockOfChildrenRequest {
    pub starting_after: Location,
    pub count: usize,
    pub cache: CacheDirective,
    actual_location_of_starting_after: Option<Location>,
    children: Vec<Location>,
}

impl ReadNextBlockOfChildrenRequest {
    /// # Errors
    /// `ArgumentValidation` if `count` is zero
    pub fn new(starting_after: Location, count: usize) -> Result<Self> {
        validate_count(count)?;
        Ok(Self {
            starting_after,
            count,
            cache: CacheDirective::default(),
            actual_location_of_starting_after: None,
            children: Vec::new(),
        })
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache = CacheDirective::requesting(Some(policy));
        self
    }

    pub fn actual_location_of_starting_after(&self) -> Option<&Location> {
        self.actual_location_of_starting_after.as_ref()
    }

    /// Record where the anchor sibling actually is
    ///
    /// # Errors
    /// `IdentityMismatch` if `actual` is not the same location as the anchor.
    pub fn set_actual_location_of_starting_after(&mut self, actual: Location) -> Result<()> {
        require_same("starting_after", &self.starting_after, &actual)?;
        self.actual_location_of_starting_after = Some(actual);
        Ok(())
    }

    pub fn children(&self) -> &[Location] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<Location>) {
        self.children = children;
    }
}

fn validate_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(GraphError::invalid_argument("count", "must be positive"));
    }
    Ok(())
}
