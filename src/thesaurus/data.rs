//! Serialized thesaurus format.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LexpandError, Result};
use crate::thesaurus::{EntityId, MeaningId, SegmentId};

/// The five tables a thesaurus is shipped as.
///
/// ```json
/// {
///   "segment_id_to_segment": ["bank of england", "boe", "bank", "depository"],
///   "entity_id_to_tags_segment_id_list": [[["Org"], [0, 1]]],
///   "segment_id_to_entity_id_tags_list": [[[0, ["Canonical"]]]],
///   "segment_id_to_meaning_id_list": {"2": [0]},
///   "meaning_id_to_pos_segment_id_list": [["noun", [2, 3]]]
/// }
/// ```
///
/// `segment_id_to_entity_id_tags_list` may be shorter than the segment list;
/// missing trailing entries mean "no entity references".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThesaurusData {
    /// Segment strings, indexed by segment id.
    pub segment_id_to_segment: Vec<String>,
    /// Per entity: its own tags and the segments it can be expressed as.
    #[serde(default)]
    pub entity_id_to_tags_segment_id_list: Vec<(Vec<String>, Vec<SegmentId>)>,
    /// Per segment: the entities it refers to, with segment-level tags.
    #[serde(default)]
    pub segment_id_to_entity_id_tags_list: Vec<Vec<(EntityId, Vec<String>)>>,
    /// Per segment: the meanings it expresses.
    #[serde(default)]
    pub segment_id_to_meaning_id_list: BTreeMap<SegmentId, Vec<MeaningId>>,
    /// Per meaning: its part-of-speech tag and the segments expressing it.
    #[serde(default)]
    pub meaning_id_to_pos_segment_id_list: Vec<(String, Vec<SegmentId>)>,
}

impl ThesaurusData {
    /// Parse the tables from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| LexpandError::thesaurus(format!("Failed to parse thesaurus JSON: {e}")))
    }

    /// Load the tables from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LexpandError::thesaurus(format!(
                "Failed to read thesaurus file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Append a segment and return its id.
    pub fn add_segment<S: Into<String>>(&mut self, segment: S) -> SegmentId {
        self.segment_id_to_segment.push(segment.into());
        (self.segment_id_to_segment.len() - 1) as SegmentId
    }

    /// Append a meaning expressed by `segment_ids` and link every segment
    /// back to it. Returns the new meaning id.
    pub fn add_meaning<S: Into<String>>(
        &mut self,
        pos: S,
        segment_ids: Vec<SegmentId>,
    ) -> MeaningId {
        let meaning_id = self.meaning_id_to_pos_segment_id_list.len() as MeaningId;
        for &segment_id in &segment_ids {
            self.segment_id_to_meaning_id_list
                .entry(segment_id)
                .or_default()
                .push(meaning_id);
        }
        self.meaning_id_to_pos_segment_id_list
            .push((pos.into(), segment_ids));
        meaning_id
    }

    /// Append an entity with its tags and surface segments. Returns the new
    /// entity id.
    pub fn add_entity(&mut self, tags: Vec<String>, segment_ids: Vec<SegmentId>) -> EntityId {
        self.entity_id_to_tags_segment_id_list
            .push((tags, segment_ids));
        (self.entity_id_to_tags_segment_id_list.len() - 1) as EntityId
    }

    /// Make `segment_id` refer to `entity_id` with the given segment-level tags.
    pub fn link_entity(&mut self, segment_id: SegmentId, entity_id: EntityId, tags: Vec<String>) {
        let index = segment_id as usize;
        if self.segment_id_to_entity_id_tags_list.len() <= index {
            self.segment_id_to_entity_id_tags_list
                .resize_with(index + 1, Vec::new);
        }
        self.segment_id_to_entity_id_tags_list[index].push((entity_id, tags));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "segment_id_to_segment": ["bank of england", "boe", "bank", "depository"],
            "entity_id_to_tags_segment_id_list": [[["Org"], [0, 1]]],
            "segment_id_to_entity_id_tags_list": [[[0, ["Canonical"]]]],
            "segment_id_to_meaning_id_list": {"2": [0]},
            "meaning_id_to_pos_segment_id_list": [["noun", [2, 3]]]
        }"#;
        let data = ThesaurusData::from_json_str(json).unwrap();

        assert_eq!(data.segment_id_to_segment.len(), 4);
        assert_eq!(data.entity_id_to_tags_segment_id_list[0].1, vec![0, 1]);
        assert_eq!(data.segment_id_to_meaning_id_list[&2], vec![0]);
        assert_eq!(data.meaning_id_to_pos_segment_id_list[0].0, "noun");
    }

    #[test]
    fn test_builders() {
        let mut data = ThesaurusData::default();
        let bank = data.add_segment("bank");
        let depository = data.add_segment("depository");
        let meaning = data.add_meaning("noun", vec![bank, depository]);
        let entity = data.add_entity(vec!["Org".to_string()], vec![depository]);
        data.link_entity(depository, entity, vec![]);

        assert_eq!(meaning, 0);
        assert_eq!(data.segment_id_to_meaning_id_list[&bank], vec![0]);
        assert_eq!(data.segment_id_to_entity_id_tags_list.len(), 2);
        assert!(data.segment_id_to_entity_id_tags_list[0].is_empty());
    }

    #[test]
    fn test_missing_tables_default_to_empty() {
        let data = ThesaurusData::from_json_str(r#"{"segment_id_to_segment": ["a"]}"#).unwrap();
        assert!(data.meaning_id_to_pos_segment_id_list.is_empty());
        assert!(ThesaurusData::from_json_str("{}").is_err());
    }
}
