use crate::config::BlockLayout;
use crate::error::Result;
use crate::section::Section;
use crate::BlockId;
use serde::Serialize;
use serde_json::Value;

pub const LEVEL_DATA_TYPE: &str = "level_data";

/// The level envelope: ordered sections plus entity and player lists, which
/// this converter always leaves empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelData {
    pub sections: Vec<Section>,
    pub entities: Vec<Value>,
    pub players: Vec<Value>,
}

#[derive(Serialize)]
struct LevelDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    sections: Vec<SectionDocument<'a>>,
    entities: &'a [Value],
    players: &'a [Value],
}

#[derive(Serialize)]
struct SectionDocument<'a> {
    x: i32,
    y: i32,
    z: i32,
    blocks: BlocksDocument<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum BlocksDocument<'a> {
    Flat(&'a [BlockId]),
    Nested(Vec<Vec<Vec<BlockId>>>),
}

impl LevelData {
    pub fn new(sections: Vec<Section>) -> Self {
        LevelData {
            sections,
            entities: Vec::new(),
            players: Vec::new(),
        }
    }

    fn document(&self, layout: BlockLayout) -> LevelDocument<'_> {
        let sections = self
            .sections
            .iter()
            .map(|section| SectionDocument {
                x: section.x,
                y: section.y,
                z: section.z,
                blocks: match layout {
                    BlockLayout::Flat => BlocksDocument::Flat(&section.blocks),
                    BlockLayout::Nested => BlocksDocument::Nested(section.to_nested()),
                },
            })
            .collect();
        LevelDocument {
            kind: LEVEL_DATA_TYPE,
            sections,
            entities: &self.entities,
            players: &self.players,
        }
    }

    pub fn to_value(&self, layout: BlockLayout) -> Result<Value> {
        Ok(serde_json::to_value(self.document(layout))?)
    }

    pub fn to_json(&self, layout: BlockLayout) -> Result<String> {
        Ok(serde_json::to_string(&self.document(layout))?)
    }

    pub fn to_json_pretty(&self, layout: BlockLayout) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.document(layout))?)
    }
}
