use std::collections::BTreeMap;

use crate::id::{AnchorId, ChromId, GenomeId};

/// A genome participating in the map. Index is assignment order: non-draft
/// genomes first (in command-line order), draft genomes appended last
/// (spec §4.1, §4.7).
#[derive(Debug, Clone)]
pub struct Genome {
    pub(crate) id: GenomeId,
    pub name: String,
    pub is_draft: bool,
    pub(crate) chroms: Vec<ChromId>,
    chrom_by_name: BTreeMap<String, ChromId>,
    anchor_by_name: BTreeMap<String, AnchorId>,
}

impl Genome {
    pub(crate) fn new(id: GenomeId, name: String, is_draft: bool) -> Self {
        Self {
            id,
            name,
            is_draft,
            chroms: Vec::new(),
            chrom_by_name: BTreeMap::new(),
            anchor_by_name: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> GenomeId {
        self.id
    }

    pub fn chroms(&self) -> &[ChromId] {
        &self.chroms
    }

    pub fn chrom_named(&self, name: &str) -> Option<ChromId> {
        self.chrom_by_name.get(name).copied()
    }

    pub fn anchor_named(&self, name: &str) -> Option<AnchorId> {
        self.anchor_by_name.get(name).copied()
    }

    pub(crate) fn register_chrom(&mut self, name: String, id: ChromId) {
        self.chrom_by_name.insert(name, id);
        self.chroms.push(id);
    }

    pub(crate) fn register_anchor(&mut self, name: String, id: AnchorId) {
        self.anchor_by_name.insert(name, id);
    }

    /// Re-order `chroms` by decreasing length. Caller reassigns genome-start
    /// offsets afterwards (called again after draft assembly, spec §4.6).
    pub(crate) fn sort_chroms_by_length(&mut self, lengths: impl Fn(ChromId) -> u64) {
        self.chroms
            .sort_by_key(|&c| std::cmp::Reverse(lengths(c)));
    }
}
