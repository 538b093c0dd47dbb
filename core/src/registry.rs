//! Static balloon type hierarchy shared by every simulation component.

use std::{borrow::Cow, collections::HashMap, fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BalloonColor;

/// Identifier naming a balloon type inside a [`BalloonRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalloonTypeId(Cow<'static, str>);

impl BalloonTypeId {
    /// Weakest classic tier.
    pub const RED: Self = Self::from_static("RED");
    /// Classic tier that splits into one red.
    pub const BLUE: Self = Self::from_static("BLUE");
    /// Classic tier that splits into one blue.
    pub const GREEN: Self = Self::from_static("GREEN");
    /// Classic tier that splits into one green.
    pub const YELLOW: Self = Self::from_static("YELLOW");
    /// Classic tier that splits into one yellow.
    pub const PINK: Self = Self::from_static("PINK");
    /// Classic two-hit tier that splits into two pinks.
    pub const BLACK: Self = Self::from_static("BLACK");
    /// Classic two-hit tier that splits into two pinks.
    pub const WHITE: Self = Self::from_static("WHITE");
    /// Classic armoured tier that splits into two blacks.
    pub const LEAD: Self = Self::from_static("LEAD");

    /// Creates an identifier backed by a static string.
    #[must_use]
    pub const fn from_static(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Creates an identifier from an owned string, typically read from configuration.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    /// Textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BalloonTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable template shared by every balloon instance of a kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalloonType {
    id: BalloonTypeId,
    #[serde(rename = "name")]
    display_name: String,
    #[serde(rename = "health")]
    base_health: NonZeroU32,
    speed_multiplier: f32,
    #[serde(default, rename = "points")]
    point_value: u32,
    color: BalloonColor,
    #[serde(default)]
    children: Vec<BalloonTypeId>,
}

impl BalloonType {
    /// Creates a childless balloon type.
    #[must_use]
    pub fn new(
        id: BalloonTypeId,
        display_name: impl Into<String>,
        base_health: NonZeroU32,
        speed_multiplier: f32,
        point_value: u32,
        color: BalloonColor,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            base_health,
            speed_multiplier,
            point_value,
            color,
            children: Vec::new(),
        }
    }

    /// Replaces the ordered list of types spawned when this type pops.
    #[must_use]
    pub fn with_children(mut self, children: Vec<BalloonTypeId>) -> Self {
        self.children = children;
        self
    }

    /// Identifier of the type.
    #[must_use]
    pub const fn id(&self) -> &BalloonTypeId {
        &self.id
    }

    /// Human readable name used by presentation layers.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Hit points a fresh instance starts with.
    #[must_use]
    pub const fn base_health(&self) -> NonZeroU32 {
        self.base_health
    }

    /// Factor applied to the configured base speed.
    #[must_use]
    pub const fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Score awarded when an instance of this type pops.
    #[must_use]
    pub const fn point_value(&self) -> u32 {
        self.point_value
    }

    /// Body color of the balloon.
    #[must_use]
    pub const fn color(&self) -> BalloonColor {
        self.color
    }

    /// Types spawned, in order, when an instance of this type pops.
    #[must_use]
    pub fn children(&self) -> &[BalloonTypeId] {
        &self.children
    }
}

/// Reasons a registry definition is rejected at load time.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No balloon types were supplied.
    #[error("balloon registry must define at least one type")]
    Empty,
    /// Two entries share the same identifier.
    #[error("balloon type `{0}` is defined more than once")]
    DuplicateType(BalloonTypeId),
    /// The fallback identifier does not name a defined type.
    #[error("fallback balloon type `{0}` is not defined")]
    UnknownFallback(BalloonTypeId),
    /// A type lists a child that is not defined.
    #[error("balloon type `{parent}` lists unknown child `{child}`")]
    UnknownChild {
        /// Type whose child list is invalid.
        parent: BalloonTypeId,
        /// Child identifier that could not be resolved.
        child: BalloonTypeId,
    },
    /// Following child links from a type leads back to it.
    #[error("balloon type `{0}` eventually spawns itself")]
    Cycle(BalloonTypeId),
}

/// Validated, read-only collection of balloon types.
///
/// The child relation is checked for dangling references and cycles once, at
/// construction, so walking the hierarchy afterwards can never loop. Recursive
/// values (one for the balloon itself plus the value of every descendant) are
/// computed at the same time.
#[derive(Clone, Debug)]
pub struct BalloonRegistry {
    types: Vec<BalloonType>,
    index: HashMap<BalloonTypeId, usize>,
    values: Vec<u32>,
    fallback: usize,
}

impl BalloonRegistry {
    /// Validates and builds a registry. `fallback` is substituted for unknown ids.
    pub fn new(types: Vec<BalloonType>, fallback: BalloonTypeId) -> Result<Self, RegistryError> {
        if types.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut index = HashMap::with_capacity(types.len());
        for (position, balloon_type) in types.iter().enumerate() {
            if index.insert(balloon_type.id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateType(balloon_type.id.clone()));
            }
        }

        let Some(&fallback) = index.get(&fallback) else {
            return Err(RegistryError::UnknownFallback(fallback));
        };

        for balloon_type in &types {
            for child in &balloon_type.children {
                if !index.contains_key(child) {
                    return Err(RegistryError::UnknownChild {
                        parent: balloon_type.id.clone(),
                        child: child.clone(),
                    });
                }
            }
        }

        detect_cycles(&types, &index)?;
        Ok(Self::assemble(types, index, fallback))
    }

    /// Built-in eight tier hierarchy, with red as the fallback.
    #[must_use]
    pub fn classic() -> Self {
        let types = classic_types();
        let index = types
            .iter()
            .enumerate()
            .map(|(position, balloon_type)| (balloon_type.id.clone(), position))
            .collect();
        Self::assemble(types, index, 0)
    }

    fn assemble(
        types: Vec<BalloonType>,
        index: HashMap<BalloonTypeId, usize>,
        fallback: usize,
    ) -> Self {
        let mut memo = vec![None; types.len()];
        for position in 0..types.len() {
            let _ = value_of(position, &types, &index, &mut memo);
        }
        let values = memo.into_iter().map(|value| value.unwrap_or(1)).collect();
        Self {
            types,
            index,
            values,
            fallback,
        }
    }

    /// Looks up a type without falling back.
    #[must_use]
    pub fn get(&self, id: &BalloonTypeId) -> Option<&BalloonType> {
        self.index.get(id).map(|&position| &self.types[position])
    }

    /// Looks up a type, substituting the fallback type for unknown ids.
    #[must_use]
    pub fn resolve(&self, id: &BalloonTypeId) -> &BalloonType {
        &self.types[self.position_of(id)]
    }

    /// Type substituted for unknown identifiers.
    #[must_use]
    pub fn fallback(&self) -> &BalloonType {
        &self.types[self.fallback]
    }

    /// Reports whether the identifier names a defined type.
    #[must_use]
    pub fn contains(&self, id: &BalloonTypeId) -> bool {
        self.index.contains_key(id)
    }

    /// Pop-count credit of a type: one plus the recursive value of each child.
    #[must_use]
    pub fn recursive_value(&self, id: &BalloonTypeId) -> u32 {
        self.values[self.position_of(id)]
    }

    /// Iterates the types in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &BalloonType> {
        self.types.iter()
    }

    /// Number of defined types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false for a constructed registry; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn position_of(&self, id: &BalloonTypeId) -> usize {
        self.index.get(id).copied().unwrap_or(self.fallback)
    }
}

fn value_of(
    position: usize,
    types: &[BalloonType],
    index: &HashMap<BalloonTypeId, usize>,
    memo: &mut [Option<u32>],
) -> u32 {
    if let Some(value) = memo[position] {
        return value;
    }

    let mut total: u32 = 1;
    for child in &types[position].children {
        if let Some(&child_position) = index.get(child) {
            total = total.saturating_add(value_of(child_position, types, index, memo));
        }
    }
    memo[position] = Some(total);
    total
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    Active,
    Done,
}

fn detect_cycles(
    types: &[BalloonType],
    index: &HashMap<BalloonTypeId, usize>,
) -> Result<(), RegistryError> {
    fn visit(
        position: usize,
        types: &[BalloonType],
        index: &HashMap<BalloonTypeId, usize>,
        marks: &mut [Visit],
    ) -> Result<(), RegistryError> {
        match marks[position] {
            Visit::Done => return Ok(()),
            Visit::Active => return Err(RegistryError::Cycle(types[position].id.clone())),
            Visit::Unseen => {}
        }

        marks[position] = Visit::Active;
        for child in &types[position].children {
            if let Some(&child_position) = index.get(child) {
                visit(child_position, types, index, marks)?;
            }
        }
        marks[position] = Visit::Done;
        Ok(())
    }

    let mut marks = vec![Visit::Unseen; types.len()];
    for position in 0..types.len() {
        visit(position, types, index, &mut marks)?;
    }
    Ok(())
}

fn classic_types() -> Vec<BalloonType> {
    fn tier(
        id: BalloonTypeId,
        name: &str,
        health: u32,
        speed_multiplier: f32,
        points: u32,
        hex: u32,
        children: &[BalloonTypeId],
    ) -> BalloonType {
        BalloonType::new(
            id,
            name,
            NonZeroU32::new(health).unwrap_or(NonZeroU32::MIN),
            speed_multiplier,
            points,
            BalloonColor::from_hex(hex),
        )
        .with_children(children.to_vec())
    }

    use BalloonTypeId as Id;
    vec![
        tier(Id::RED, "Red", 1, 1.0, 10, 0xff4444, &[]),
        tier(Id::BLUE, "Blue", 1, 1.4, 20, 0x4488ff, &[Id::RED]),
        tier(Id::GREEN, "Green", 1, 1.8, 30, 0x44ff44, &[Id::BLUE]),
        tier(Id::YELLOW, "Yellow", 1, 3.2, 40, 0xffdd44, &[Id::GREEN]),
        tier(Id::PINK, "Pink", 1, 3.6, 50, 0xff88cc, &[Id::YELLOW]),
        tier(Id::BLACK, "Black", 2, 1.8, 100, 0x333333, &[Id::PINK, Id::PINK]),
        tier(Id::WHITE, "White", 2, 2.0, 100, 0xffffff, &[Id::PINK, Id::PINK]),
        tier(Id::LEAD, "Lead", 3, 1.0, 150, 0x666677, &[Id::BLACK, Id::BLACK]),
    ]
}
