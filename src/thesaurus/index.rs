//! Typed, immutable thesaurus index.

use ahash::AHashMap;
use log::{debug, info};

use crate::error::{LexpandError, Result};
use crate::linguistics::PartOfSpeech;
use crate::thesaurus::data::ThesaurusData;
use crate::thesaurus::{EntityId, MeaningId, SegmentId};

/// A word sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meaning {
    /// `None` when the thesaurus uses a tag outside [`PartOfSpeech`]; such
    /// meanings never match a lookup.
    pub pos: Option<PartOfSpeech>,
    pub segment_ids: Vec<SegmentId>,
}

/// A named concept and the surface forms it can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub tags: Vec<String>,
    pub segment_ids: Vec<SegmentId>,
}

/// A reference from a segment to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub entity_id: EntityId,
    pub tags: Vec<String>,
}

/// Read-only thesaurus tables, built once and shared freely across threads.
#[derive(Debug, Clone)]
pub struct ThesaurusIndex {
    segments: Vec<String>,
    segment_ids: AHashMap<String, SegmentId>,
    meanings: Vec<Meaning>,
    entities: Vec<Entity>,
    /// Dense, one entry per segment.
    segment_meanings: Vec<Vec<MeaningId>>,
    /// Dense, one entry per segment.
    segment_entities: Vec<Vec<EntityRef>>,
    /// Space-free form of entity segments that are not segments themselves.
    collapsed: AHashMap<String, Vec<SegmentId>>,
}

impl ThesaurusIndex {
    /// Build the index, validating every cross-table reference.
    pub fn from_data(data: ThesaurusData) -> Result<Self> {
        let ThesaurusData {
            segment_id_to_segment: segments,
            entity_id_to_tags_segment_id_list,
            segment_id_to_entity_id_tags_list,
            segment_id_to_meaning_id_list,
            meaning_id_to_pos_segment_id_list,
        } = data;

        let segment_count = segments.len();
        let check_segment = |segment_id: SegmentId, context: &str| -> Result<()> {
            if (segment_id as usize) < segment_count {
                Ok(())
            } else {
                Err(LexpandError::thesaurus(format!(
                    "{context} references unknown segment {segment_id}"
                )))
            }
        };

        let mut segment_ids = AHashMap::with_capacity(segment_count);
        for (segment_id, segment) in segments.iter().enumerate() {
            if segment_ids
                .insert(segment.clone(), segment_id as SegmentId)
                .is_some()
            {
                return Err(LexpandError::thesaurus(format!(
                    "Duplicate segment '{segment}'"
                )));
            }
        }

        let mut meanings = Vec::with_capacity(meaning_id_to_pos_segment_id_list.len());
        for (meaning_id, (pos, meaning_segments)) in
            meaning_id_to_pos_segment_id_list.into_iter().enumerate()
        {
            for &segment_id in &meaning_segments {
                check_segment(segment_id, &format!("Meaning {meaning_id}"))?;
            }
            let parsed = pos.parse::<PartOfSpeech>().ok();
            if parsed.is_none() {
                debug!("Meaning {meaning_id} has unsupported part of speech '{pos}'");
            }
            meanings.push(Meaning {
                pos: parsed,
                segment_ids: meaning_segments,
            });
        }

        let mut segment_meanings = vec![Vec::new(); segment_count];
        for (segment_id, meaning_ids) in segment_id_to_meaning_id_list {
            check_segment(segment_id, "Meaning list")?;
            if let Some(&meaning_id) = meaning_ids
                .iter()
                .find(|&&meaning_id| meaning_id as usize >= meanings.len())
            {
                return Err(LexpandError::thesaurus(format!(
                    "Segment {segment_id} references unknown meaning {meaning_id}"
                )));
            }
            segment_meanings[segment_id as usize] = meaning_ids;
        }

        let mut entities = Vec::with_capacity(entity_id_to_tags_segment_id_list.len());
        for (entity_id, (tags, entity_segments)) in
            entity_id_to_tags_segment_id_list.into_iter().enumerate()
        {
            for &segment_id in &entity_segments {
                check_segment(segment_id, &format!("Entity {entity_id}"))?;
            }
            entities.push(Entity {
                tags,
                segment_ids: entity_segments,
            });
        }

        if segment_id_to_entity_id_tags_list.len() > segment_count {
            return Err(LexpandError::thesaurus(format!(
                "Entity references listed for {} segments, but only {} segments exist",
                segment_id_to_entity_id_tags_list.len(),
                segment_count
            )));
        }
        let mut segment_entities = vec![Vec::new(); segment_count];
        for (segment_id, references) in segment_id_to_entity_id_tags_list.into_iter().enumerate() {
            let mut refs = Vec::with_capacity(references.len());
            for (entity_id, tags) in references {
                if entity_id as usize >= entities.len() {
                    return Err(LexpandError::thesaurus(format!(
                        "Segment {segment_id} references unknown entity {entity_id}"
                    )));
                }
                refs.push(EntityRef { entity_id, tags });
            }
            segment_entities[segment_id] = refs;
        }

        let mut collapsed: AHashMap<String, Vec<SegmentId>> = AHashMap::new();
        for (segment_id, refs) in segment_entities.iter().enumerate() {
            let segment = &segments[segment_id];
            if refs.is_empty() || !segment.contains(' ') {
                continue;
            }
            let collapsed_form = segment.replace(' ', "");
            if segment_ids.contains_key(&collapsed_form) {
                continue;
            }
            collapsed
                .entry(collapsed_form)
                .or_default()
                .push(segment_id as SegmentId);
        }

        info!(
            "Loaded thesaurus: {} segments, {} meanings, {} entities",
            segments.len(),
            meanings.len(),
            entities.len()
        );

        Ok(Self {
            segments,
            segment_ids,
            meanings,
            entities,
            segment_meanings,
            segment_entities,
            collapsed,
        })
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment string for an id.
    pub fn segment(&self, segment_id: SegmentId) -> Option<&str> {
        self.segments.get(segment_id as usize).map(String::as_str)
    }

    /// The id of a segment string.
    pub fn segment_id(&self, segment: &str) -> Option<SegmentId> {
        self.segment_ids.get(segment).copied()
    }

    pub fn contains_segment(&self, segment: &str) -> bool {
        self.segment_ids.contains_key(segment)
    }

    /// All segments with their ids, in id order.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &str)> {
        self.segments
            .iter()
            .enumerate()
            .map(|(id, segment)| (id as SegmentId, segment.as_str()))
    }

    pub fn meaning(&self, meaning_id: MeaningId) -> Option<&Meaning> {
        self.meanings.get(meaning_id as usize)
    }

    /// The meanings a segment expresses.
    pub fn meanings_of(&self, segment_id: SegmentId) -> impl Iterator<Item = &Meaning> {
        self.segment_meanings
            .get(segment_id as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|&meaning_id| self.meaning(meaning_id))
    }

    pub fn entity(&self, entity_id: EntityId) -> Option<&Entity> {
        self.entities.get(entity_id as usize)
    }

    /// The entity references of a segment.
    pub fn entity_refs(&self, segment_id: SegmentId) -> &[EntityRef] {
        self.segment_entities
            .get(segment_id as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Entity segments whose space-free form is `collapsed`.
    pub fn collapsed_segment_ids(&self, collapsed: &str) -> &[SegmentId] {
        self.collapsed
            .get(collapsed)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> ThesaurusData {
        let mut data = ThesaurusData::default();
        let boe_full = data.add_segment("bank of england");
        let boe = data.add_segment("boe");
        let bank = data.add_segment("bank");
        let depository = data.add_segment("depository");
        data.add_meaning("noun", vec![bank, depository]);
        data.add_meaning("adj_sat", vec![bank]);
        let entity = data.add_entity(vec!["Org".to_string()], vec![boe_full, boe]);
        data.link_entity(boe_full, entity, vec!["Canonical".to_string()]);
        data
    }

    #[test]
    fn test_lookups() {
        let index = ThesaurusIndex::from_data(sample_data()).unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(index.segment_id("bank"), Some(2));
        assert_eq!(index.segment(1), Some("boe"));
        assert_eq!(index.segment(17), None);

        let poses: Vec<_> = index.meanings_of(2).map(|m| m.pos).collect();
        assert_eq!(poses, vec![Some(PartOfSpeech::Noun), None]);

        let refs = index.entity_refs(0);
        assert_eq!(refs.len(), 1);
        assert_eq!(index.entity(refs[0].entity_id).unwrap().segment_ids, vec![0, 1]);
        assert!(index.entity_refs(3).is_empty());
    }

    #[test]
    fn test_collapsed_segments() {
        let index = ThesaurusIndex::from_data(sample_data()).unwrap();
        assert_eq!(index.collapsed_segment_ids("bankofengland"), &[0]);
        assert!(index.collapsed_segment_ids("bank").is_empty());
    }

    #[test]
    fn test_duplicate_segment_rejected() {
        let mut data = ThesaurusData::default();
        data.add_segment("bank");
        data.add_segment("bank");
        assert!(matches!(
            ThesaurusIndex::from_data(data),
            Err(LexpandError::Thesaurus(_))
        ));
    }

    #[test]
    fn test_dangling_references_rejected() {
        let mut data = ThesaurusData::default();
        data.add_segment("bank");
        data.add_meaning("noun", vec![0, 5]);
        assert!(ThesaurusIndex::from_data(data).is_err());

        let mut data = ThesaurusData::default();
        data.add_segment("bank");
        data.link_entity(0, 3, vec![]);
        assert!(ThesaurusIndex::from_data(data).is_err());
    }
}
