use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{PlanError, Result};

lazy_static! {
    static ref OBJECT_ID_RE: Regex = Regex::new("^[0-9a-fA-F]{24}$").unwrap();
}

/// Opaque 24-character hex identifier. Anything else is a validation
/// failure, never a not-found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(value: &str) -> Result<Self> {
        if OBJECT_ID_RE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(PlanError::InvalidObjectId(value.to_string()))
        }
    }

    /// Mint a fresh identifier from UUIDv4 hex.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..24].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for EntityId {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// The closed set of entity kinds that can carry comment and vote threads.
/// Resolution is an exhaustive match everywhere; an unknown collection name
/// only exists at the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Accommodation,
    Activity,
    Comment,
    Destination,
    Planner,
    Transport,
    User,
    Vote,
}

impl EntityType {
    pub const ALL: [EntityType; 8] = [
        Self::Accommodation,
        Self::Activity,
        Self::Comment,
        Self::Destination,
        Self::Planner,
        Self::Transport,
        Self::User,
        Self::Vote,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Accommodation => "Accommodation",
            Self::Activity => "Activity",
            Self::Comment => "Comment",
            Self::Destination => "Destination",
            Self::Planner => "Planner",
            Self::Transport => "Transport",
            Self::User => "User",
            Self::Vote => "Vote",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityType {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "Accommodation" => Ok(Self::Accommodation),
            "Activity" => Ok(Self::Activity),
            "Comment" => Ok(Self::Comment),
            "Destination" => Ok(Self::Destination),
            "Planner" => Ok(Self::Planner),
            "Transport" => Ok(Self::Transport),
            "User" => Ok(Self::User),
            "Vote" => Ok(Self::Vote),
            other => Err(PlanError::InvalidCollectionType(other.to_string())),
        }
    }
}

/// The join key of the polymorphic attachment system: one value identifying
/// an entity across collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub id: EntityId,
    pub collection: EntityType,
}

impl ObjectRef {
    pub fn new(collection: EntityType, id: EntityId) -> Self {
        Self { id, collection }
    }

    /// Parse a `(collection, id)` pair from wire strings. The collection is
    /// checked first so an unknown name fails before the id shape does.
    pub fn parse(collection: &str, id: &str) -> Result<Self> {
        let collection = collection.parse::<EntityType>()?;
        let id = EntityId::parse(id)?;
        Ok(Self { id, collection })
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
