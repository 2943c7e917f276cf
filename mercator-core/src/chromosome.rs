use crate::id::{AnchorId, GenomeId};

/// Records, for one component folded into an `Assembled` chromosome, enough
/// information to emit an AGP `D`-type record and restore the original
/// coordinates (spec §3, §4.6, `assembled.hh`/`assembled.cc`).
#[derive(Debug, Clone)]
pub struct AssembledComponent {
    pub name: String,
    pub length: u64,
    /// Whether this component was flipped relative to its original input
    /// orientation when folded into the assembly.
    pub reversed: bool,
}

#[derive(Debug, Clone)]
pub struct Assembled {
    pub components: Vec<AssembledComponent>,
    pub padding: u64,
}

#[derive(Debug, Clone)]
pub struct Chromosome {
    pub genome: GenomeId,
    pub name: String,
    pub length: u64,
    /// Accumulates whether this chromosome's anchor order/strand has been
    /// reversed an odd number of times relative to the original input.
    pub reversed: bool,
    /// Anchors in chromosome order (position, not insertion order).
    pub anchors: Vec<AnchorId>,
    /// Cumulative offset assigned after genome chromosomes are sorted by
    /// decreasing length (spec §3 "genome-start offset").
    pub genome_start: u64,
    pub assembled: Option<Assembled>,
}

impl Chromosome {
    pub(crate) fn new(genome: GenomeId, name: String, length: u64) -> Self {
        Self {
            genome,
            name,
            length,
            reversed: false,
            anchors: Vec::new(),
            genome_start: 0,
            assembled: None,
        }
    }

    pub fn is_assembled(&self) -> bool {
        self.assembled.is_some()
    }
}
