//! Savegame schema: ordered top-level sections plus the expansion rules
//!
//! Sections are broken up further and further, recursively, under two rules:
//!
//! 1. A section may be split into subsections as long as their bytes add up
//!    to the parent. This allows more of a subsection to be translated
//!    without renumbering any other region.
//! 2. Every pst line carries enough information (code and width) to restore
//!    the savegame even if the decoding here changes later.

use crate::constants::{STARTING_YEAR_JUMP, STARTING_YEAR_SENTINEL};
use crate::error::CodecError;
use crate::types::{FieldKind, GridKind, RegionId};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;

/// A top-level region of the savegame
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Region name, also the base of every identifier below it
    pub name: String,
    /// Number of instances
    pub count: u32,
    /// Bytes per instance (declared width for strings)
    pub width: usize,
    /// Leaf kind used where no rule applies
    pub kind: FieldKind,
    /// Extra comment line printed after the section header
    pub banner: Option<String>,
}

/// One `(kind, width, count)` entry of a heterogeneous split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subsection {
    /// Leaf kind of the entry
    pub kind: FieldKind,
    /// Bytes per instance
    pub width: usize,
    /// Number of instances
    pub count: u32,
}

impl Subsection {
    /// One instance at the kind's default width
    pub const fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            width: kind.default_width(),
            count: 1,
        }
    }

    /// One instance at an explicit width
    pub const fn sized(kind: FieldKind, width: usize) -> Self {
        Self {
            kind,
            width,
            count: 1,
        }
    }

    /// `count` instances at an explicit width
    pub const fn repeated(kind: FieldKind, width: usize, count: u32) -> Self {
        Self { kind, width, count }
    }

    /// Total bytes covered by this entry
    pub const fn bytes(&self) -> usize {
        self.width * self.count as usize
    }
}

/// Lookup key of an expansion rule.
///
/// `top` is the instance index of the top-level section; `None` is the
/// generic `Base_x_...` form that matches every instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    /// Top-level section name
    pub base: String,
    /// Top-level instance, or `None` for any
    pub top: Option<u32>,
    /// Remaining index path
    pub path: Vec<u32>,
}

impl RuleKey {
    /// Parse `Ship_x_5_4` or `Personal_2`
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let invalid = || CodecError::InvalidRuleKey(text.to_string());
        let mut parts = text.split('_');
        let base = parts.next().filter(|b| !b.is_empty()).ok_or_else(invalid)?;
        let top = match parts.next().ok_or_else(invalid)? {
            "x" => None,
            index => Some(index.parse().map_err(|_| invalid())?),
        };
        let path = parts
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            base: base.to_string(),
            top,
            path,
        })
    }

    /// Exact key of an instance; `None` for a bare section name
    pub fn exact(id: &RegionId) -> Option<Self> {
        let (&top, path) = id.indices.split_first()?;
        Some(Self {
            base: id.base.clone(),
            top: Some(top),
            path: path.to_vec(),
        })
    }

    /// This key with the top-level instance erased
    pub fn generic(&self) -> Self {
        Self {
            base: self.base.clone(),
            top: None,
            path: self.path.clone(),
        }
    }
}

/// Where and how far to look for the starting year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    /// Leaf after which the capture happens
    pub region: RegionId,
    /// Forward distance from the end of that leaf
    pub jump: i64,
}

/// Complete layout description of a savegame
#[derive(Debug, Clone)]
pub struct Schema {
    sections: Vec<Section>,
    uniform: HashMap<RuleKey, FieldKind>,
    split: HashMap<RuleKey, Vec<Subsection>>,
    sentinel: Option<Sentinel>,
}

impl Schema {
    /// Start an empty schema
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Top-level sections in stream order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Starting-year capture point, if the schema has one
    pub fn sentinel(&self) -> Option<&Sentinel> {
        self.sentinel.as_ref()
    }

    /// Uniform split rule for an instance, exact key first
    pub fn uniform_rule(&self, id: &RegionId) -> Option<FieldKind> {
        let key = RuleKey::exact(id)?;
        self.uniform
            .get(&key)
            .or_else(|| self.uniform.get(&key.generic()))
            .copied()
    }

    /// Heterogeneous split rule for an instance, exact key first
    pub fn split_rule(&self, id: &RegionId) -> Option<&[Subsection]> {
        let key = RuleKey::exact(id)?;
        self.split
            .get(&key)
            .or_else(|| self.split.get(&key.generic()))
            .map(Vec::as_slice)
    }

    /// The Pirates! savegame layout
    pub fn savegame() -> Result<Self, CodecError> {
        use FieldKind::*;
        use Subsection as S;

        let feature_map = Grid(GridKind::Feature);
        let sailing_map = Grid(GridKind::Sailing);
        let coast_map = Grid(GridKind::Coast);

        Schema::builder()
            .section("Intro", 6, 4, Int)
            .section("CityName", 128, 8, PaddedText)
            .section("Personal", 57, 4, Int)
            .section("Ship", 128, 1116, Bulk)
            .section("f", 128, 1116, Bulk)
            .section("City", 128, 32, Bulk)
            .section("CityInfo", 128, 148, Bulk)
            .section_with_banner("Log", 1000, 28, Bulk, "Ship's Log")
            .section("j", 1, 4, Hex)
            // e is at least three parts: unknown, peace and war, date and age
            .section("e", 30, 32, Bulk)
            .section("Quest", 64, 32, Bulk)
            .section("LogCount", 1, 4, Int)
            .section("TopoMap", 462, 586, Bulk)
            .section("FeatureMap", 462, 293, feature_map)
            .section("TreasureMap", 4, 328, Bulk)
            .section("SailingMap", 462, 293, sailing_map)
            .section("vv", 256, 12, Bulk)
            .section("vvv", 2, 4, Int)
            .section("Top10", 10, 28, Bulk)
            .section("d", 1, 36, Zero)
            .section("Villain", 28, 36, Bulk)
            .section("t", 1, 120, Bulk)
            .section("CityLoc", 128, 16, Bulk)
            .section("CoastMap", 462, 293, coast_map)
            .section("k", 8, 4, Int)
            .section("LandingParty", 8, 32, Bulk)
            .section("m", 1, 12, Bulk)
            .section("ShipName", 8, 8, PaddedText)
            .section("Skill", 1, 4, Int)
            // Uniform splits
            .uniform("Intro_0", Text)
            .uniform("Intro_3", Hex)
            .uniform("Personal_2", Binary)
            .uniform("Personal_5", Short)
            .uniform("Personal_6", Short)
            .uniform("Personal_9", Short)
            .uniform("Personal_10", Short)
            .uniform("Personal_18", Binary)
            .uniform("Personal_45", Short)
            .uniform("Personal_46", Short)
            .uniform("Personal_47", Char)
            .uniform("Personal_48", Char)
            .uniform("Personal_49", Char)
            .uniform("Personal_50", Char)
            .uniform("Ship_x_2", Short)
            .uniform("Ship_x_3", Short)
            .uniform("Ship_x_5", Short)
            .uniform("Ship_x_5_4", Binary)
            .uniform("Ship_x_6", Short)
            .uniform("City_x", Int)
            .uniform("City_x_2", Binary)
            .uniform("City_x_4", Bulk)
            .uniform("City_x_7", Bulk)
            .uniform("CityInfo_x_0_2", Short)
            .uniform("CityInfo_x_0_3", Short)
            .uniform("CityInfo_x_3", Short)
            .uniform("e_x", Int)
            .uniform("Quest_x", Int)
            .uniform("TreasureMap_x", Int)
            .uniform("vv_x", Int)
            .uniform("Villain_x_4", Binary)
            .uniform("LandingParty_0", MicroFloat)
            .uniform("LandingParty_1", MicroFloat)
            .uniform("LandingParty_x", Hex)
            // Heterogeneous splits
            .split("Personal_51", &[S::of(Char), S::sized(Zero, 3)])
            .split("Personal_52", &[S::of(Binary), S::sized(Bulk, 3)])
            .split("Ship_x", &[S::repeated(Bulk, 16, 10), S::sized(Zero, 956)])
            .split("Ship_x_0", &[S::repeated(Short, 2, 6), S::of(MicroFloat)])
            .split("Ship_x_1", &[S::of(MicroFloat), S::repeated(Hex, 4, 3)])
            .split("Ship_x_2_6", &[S::of(Binary), S::sized(Bulk, 1)])
            // Two adjacent shorts became an Int and an empty zero field so
            // that Ship_x_4_7 kept its number.
            .split(
                "Ship_x_4",
                &[
                    S::repeated(Short, 2, 4),
                    S::of(Int),
                    S::sized(Zero, 0),
                    S::repeated(Short, 2, 2),
                ],
            )
            .split(
                "f_x",
                &[S::sized(Bulk, 2), S::sized(Zero, 98), S::sized(Bulk, 2), S::sized(Zero, 1014)],
            )
            .split("City_x_3", &[S::repeated(Char, 1, 3), S::sized(Bulk, 1)])
            .split(
                "CityInfo_x",
                &[
                    S::sized(Bulk, 36),
                    S::sized(Bulk, 48),
                    S::sized(Bulk, 28),
                    S::sized(Bulk, 32),
                    S::sized(Bulk, 4),
                ],
            )
            .split(
                "CityInfo_x_0",
                &[S::of(Bulk), S::repeated(Int, 4, 4), S::repeated(Bulk, 4, 3), S::of(Int)],
            )
            .split(
                "CityInfo_x_1",
                &[S::of(Int), S::of(Bulk), S::repeated(Int, 4, 5), S::repeated(Short, 2, 10)],
            )
            .split(
                "Log_x",
                &[
                    S::repeated(LowChar, 1, 8),
                    S::repeated(Int, 4, 3),
                    S::repeated(MicroFloat, 4, 2),
                ],
            )
            .split(
                "TreasureMap_x_68",
                &[S::sized(Bulk, 1), S::sized(Binary, 1), S::sized(Bulk, 1), S::sized(Binary, 1)],
            )
            .split(
                "Villain_x",
                &[S::repeated(Short, 2, 10), S::sized(Int, 4), S::repeated(Short, 2, 6)],
            )
            .split("CityLoc_x", &[S::repeated(MilliFloat, 4, 2), S::repeated(Hex, 4, 2)])
            .split("Top10_x", &[S::repeated(Int, 4, 2), S::repeated(Short, 2, 10)])
            .split("Top10_x_1", &[S::of(Binary), S::sized(Zero, 3)])
            .sentinel(STARTING_YEAR_SENTINEL, STARTING_YEAR_JUMP)
            .build()
    }
}

/// Declarative construction of a [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    sections: Vec<Section>,
    uniform: Vec<(String, FieldKind)>,
    split: Vec<(String, Vec<Subsection>)>,
    sentinel: Option<(String, i64)>,
}

impl SchemaBuilder {
    /// Append a top-level section
    pub fn section(mut self, name: &str, count: u32, width: usize, kind: FieldKind) -> Self {
        self.sections.push(Section {
            name: name.to_string(),
            count,
            width,
            kind,
            banner: None,
        });
        self
    }

    /// Append a top-level section that prints a banner comment
    pub fn section_with_banner(
        mut self,
        name: &str,
        count: u32,
        width: usize,
        kind: FieldKind,
        banner: &str,
    ) -> Self {
        self = self.section(name, count, width, kind);
        if let Some(section) = self.sections.last_mut() {
            section.banner = Some(banner.to_string());
        }
        self
    }

    /// Split the keyed region evenly into leaves of `kind`
    pub fn uniform(mut self, key: &str, kind: FieldKind) -> Self {
        self.uniform.push((key.to_string(), kind));
        self
    }

    /// Split the keyed region into the listed entries
    pub fn split(mut self, key: &str, parts: &[Subsection]) -> Self {
        self.split.push((key.to_string(), parts.to_vec()));
        self
    }

    /// Capture the starting year `jump` bytes past the named leaf
    pub fn sentinel(mut self, region: &str, jump: i64) -> Self {
        self.sentinel = Some((region.to_string(), jump));
        self
    }

    /// Parse every rule key and produce the schema
    pub fn build(self) -> Result<Schema, CodecError> {
        let uniform = self
            .uniform
            .into_iter()
            .map(|(key, kind)| -> Result<_, CodecError> { Ok((RuleKey::parse(&key)?, kind)) })
            .collect::<Result<HashMap<_, _>, CodecError>>()?;
        let split = self
            .split
            .into_iter()
            .map(|(key, parts)| -> Result<_, CodecError> { Ok((RuleKey::parse(&key)?, parts)) })
            .collect::<Result<HashMap<_, _>, CodecError>>()?;
        let sentinel = match self.sentinel {
            Some((region, jump)) if jump <= 0 => {
                return Err(CodecError::InvalidSentinel { region, jump })
            }
            Some((region, jump)) => Some(Sentinel {
                region: RegionId::parse(&region).ok_or(CodecError::InvalidRuleKey(region))?,
                jump,
            }),
            None => None,
        };
        Ok(Schema {
            sections: self.sections,
            uniform,
            split,
            sentinel,
        })
    }
}
