//! Single arena owning every genome/chromosome/anchor/edge/clique/run for
//! one process invocation, replacing the original's `Genome::genomes` /
//! `Genome::edges` global state (spec §9).

use crate::anchor::{Anchor, Strand};
use crate::chromosome::Chromosome;
use crate::clique::Clique;
use crate::edge::Edge;
use crate::error::CoreError;
use crate::genome::Genome;
use crate::id::{AnchorId, ChromId, CliqueId, EdgeId, GenomeId, RunId};
use crate::mask::MAX_GENOMES;
use crate::run::Run;

pub struct World {
    pub(crate) genomes: Vec<Genome>,
    pub(crate) chroms: Vec<Chromosome>,
    pub(crate) anchors: Vec<Anchor>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) cliques: Vec<Option<Clique>>,
    pub(crate) runs: Vec<Option<Run>>,
}

impl World {
    pub fn new(num_genomes: usize) -> Result<Self, CoreError> {
        if num_genomes < 2 {
            return Err(CoreError::TooFewGenomes { got: num_genomes });
        }
        if num_genomes > MAX_GENOMES {
            return Err(CoreError::TooManyGenomes { got: num_genomes });
        }
        Ok(Self {
            genomes: Vec::new(),
            chroms: Vec::new(),
            anchors: Vec::new(),
            edges: Vec::new(),
            cliques: Vec::new(),
            runs: Vec::new(),
        })
    }

    pub fn num_genomes(&self) -> usize {
        self.genomes.len()
    }

    // ---- genomes ----

    pub fn add_genome(&mut self, name: String, is_draft: bool) -> GenomeId {
        let id = GenomeId::new(self.genomes.len());
        self.genomes.push(Genome::new(id, name, is_draft));
        id
    }

    pub fn genome(&self, id: GenomeId) -> &Genome {
        &self.genomes[id.index()]
    }

    pub fn genome_mut(&mut self, id: GenomeId) -> &mut Genome {
        &mut self.genomes[id.index()]
    }

    pub fn genomes(&self) -> impl Iterator<Item = GenomeId> {
        (0..self.genomes.len()).map(GenomeId::new)
    }

    // ---- chromosomes ----

    pub fn add_chromosome(&mut self, genome: GenomeId, name: String, length: u64) -> ChromId {
        let id = ChromId::new(self.chroms.len());
        self.chroms.push(Chromosome::new(genome, name.clone(), length));
        self.genome_mut(genome).register_chrom(name, id);
        id
    }

    pub fn chrom(&self, id: ChromId) -> &Chromosome {
        &self.chroms[id.index()]
    }

    pub fn chrom_mut(&mut self, id: ChromId) -> &mut Chromosome {
        &mut self.chroms[id.index()]
    }

    // ---- anchors ----

    #[allow(clippy::too_many_arguments)]
    pub fn add_anchor(
        &mut self,
        chrom: ChromId,
        name: String,
        strand: Strand,
        start: u64,
        end: u64,
        is_coding: u64,
    ) -> AnchorId {
        let id = AnchorId::new(self.anchors.len());
        let num_genomes = self.num_genomes();
        self.anchors.push(Anchor::new(
            chrom,
            name.clone(),
            strand,
            start,
            end,
            is_coding,
            num_genomes,
        ));
        self.chrom_mut(chrom).anchors.push(id);
        let genome = self.chrom(chrom).genome;
        self.genome_mut(genome).register_anchor(name, id);
        id
    }

    pub fn anchor(&self, id: AnchorId) -> &Anchor {
        &self.anchors[id.index()]
    }

    pub fn anchor_mut(&mut self, id: AnchorId) -> &mut Anchor {
        &mut self.anchors[id.index()]
    }

    pub fn anchor_genome(&self, id: AnchorId) -> GenomeId {
        self.chrom(self.anchor(id).chrom()).genome
    }

    pub fn anchor_genome_index(&self, id: AnchorId) -> usize {
        self.anchor_genome(id).index()
    }

    /// Sorts each chromosome's anchors by genomic start and rebuilds the
    /// prev/next doubly-linked list over them (spec §3 invariant 5).
    pub fn sort_anchors(&mut self) {
        let chrom_ids: Vec<_> = (0..self.chroms.len()).map(ChromId::new).collect();
        for chrom in chrom_ids {
            let anchors = &mut self.chrom_mut(chrom).anchors;
            anchors.sort_by_key(|&a| self.anchors[a.index()].start);
            let ordered = anchors.clone();
            for w in 0..ordered.len() {
                let prev = if w == 0 { None } else { Some(ordered[w - 1]) };
                let next = ordered.get(w + 1).copied();
                let a = ordered[w];
                self.anchor_mut(a).prev = prev;
                self.anchor_mut(a).next = next;
            }
        }
    }

    /// Sorts each genome's chromosomes by decreasing length and assigns
    /// cumulative genome-start offsets (spec §3). Called once after initial
    /// load and again after draft-genome assembly (spec §4.6).
    pub fn assign_genome_start_offsets(&mut self) {
        let genome_ids: Vec<_> = self.genomes().collect();
        for genome in genome_ids {
            let lengths: Vec<u64> = self
                .genome(genome)
                .chroms()
                .iter()
                .map(|&c| self.chrom(c).length)
                .collect();
            let mut order: Vec<usize> = (0..lengths.len()).collect();
            order.sort_by_key(|&i| std::cmp::Reverse(lengths[i]));
            let old_chroms = self.genome(genome).chroms().to_vec();
            let new_chroms: Vec<ChromId> = order.iter().map(|&i| old_chroms[i]).collect();
            self.genome_mut(genome).chroms = new_chroms.clone();

            let mut offset = 0u64;
            for &c in &new_chroms {
                self.chrom_mut(c).genome_start = offset;
                offset += self.chrom(c).length;
            }
        }
    }

    /// Reverses a chromosome: flips each anchor's strand/coordinates and
    /// reverses the anchor order (spec §4.1).
    pub fn reverse_chromosome(&mut self, chrom: ChromId) {
        let len = self.chrom(chrom).length;
        let anchors = self.chrom(chrom).anchors.clone();
        for &a in &anchors {
            self.anchor_mut(a).reverse_in_chrom(len);
        }
        let reversed: Vec<AnchorId> = anchors.into_iter().rev().collect();
        self.chrom_mut(chrom).anchors = reversed.clone();
        self.chrom_mut(chrom).reversed = !self.chrom(chrom).reversed;
        for w in 0..reversed.len() {
            let prev = if w == 0 { None } else { Some(reversed[w - 1]) };
            let next = reversed.get(w + 1).copied();
            self.anchor_mut(reversed[w]).prev = prev;
            self.anchor_mut(reversed[w]).next = next;
        }
    }

    // ---- edges ----

    pub(crate) fn push_edge(&mut self, e: Edge) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(e);
        id
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    // ---- cliques ----

    pub(crate) fn push_clique(&mut self, c: Clique) -> CliqueId {
        let id = CliqueId::new(self.cliques.len());
        self.cliques.push(Some(c));
        id
    }

    pub fn clique(&self, id: CliqueId) -> &Clique {
        self.cliques[id.index()].as_ref().expect("dangling CliqueId")
    }

    pub fn clique_mut(&mut self, id: CliqueId) -> &mut Clique {
        self.cliques[id.index()].as_mut().expect("dangling CliqueId")
    }

    pub fn clique_alive(&self, id: CliqueId) -> bool {
        self.cliques[id.index()].is_some()
    }

    // ---- runs ----

    pub(crate) fn push_run(&mut self, r: Run) -> RunId {
        let id = RunId::new(self.runs.len());
        self.runs.push(Some(r));
        id
    }

    pub fn run(&self, id: RunId) -> &Run {
        self.runs[id.index()].as_ref().expect("dangling RunId")
    }

    pub fn run_mut(&mut self, id: RunId) -> &mut Run {
        self.runs[id.index()].as_mut().expect("dangling RunId")
    }

    pub fn run_alive(&self, id: RunId) -> bool {
        self.runs[id.index()].is_some()
    }

    pub fn all_runs(&self) -> impl Iterator<Item = RunId> + '_ {
        (0..self.runs.len())
            .map(RunId::new)
            .filter(move |&r| self.run_alive(r))
    }

    // ---- backbone navigation (spec §4.1) ----

    pub fn next_anchor(&self, a: AnchorId, forward: bool) -> Option<AnchorId> {
        if forward {
            self.anchor(a).next
        } else {
            self.anchor(a).prev
        }
    }

    pub fn next_anchor_in_clique(&self, a: AnchorId, forward: bool) -> Option<AnchorId> {
        let mut cur = self.next_anchor(a, forward);
        while let Some(c) = cur {
            if self.anchor(c).is_in_clique() {
                return Some(c);
            }
            cur = self.next_anchor(c, forward);
        }
        None
    }

    pub fn next_anchor_in_run(&self, a: AnchorId, forward: bool) -> Option<AnchorId> {
        let mut cur = self.next_anchor(a, forward);
        while let Some(c) = cur {
            if let Some(clique) = self.anchor(c).clique() {
                if self.clique(clique).run().is_some() {
                    return Some(c);
                }
            }
            cur = self.next_anchor(c, forward);
        }
        None
    }

    pub fn next_clique(&self, a: AnchorId, forward: bool) -> Option<CliqueId> {
        self.next_anchor_in_clique(a, forward)
            .and_then(|next| self.anchor(next).clique())
    }

    pub fn next_run(&self, a: AnchorId, forward: bool) -> Option<RunId> {
        self.next_anchor_in_run(a, forward)
            .and_then(|next| self.anchor(next).clique())
            .and_then(|c| self.clique(c).run())
    }

    /// Cross-checks the arena's internal bookkeeping: every claimed anchor
    /// points back to a live clique, every clique's run (if any) actually
    /// lists that clique, and every active edge's endpoints still carry it
    /// in their per-genome edge vectors. Intended for tests and debug
    /// builds, not the hot path (spec §7.1).
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        for (i, anchor) in self.anchors.iter().enumerate() {
            if let Some(clique) = anchor.clique {
                if !self.clique_alive(clique) {
                    return Err(CoreError::InvariantViolation(format!(
                        "anchor {i} references dangling clique {clique}"
                    )));
                }
                let a_id = AnchorId::new(i);
                let g = self.anchor_genome(a_id);
                if self.clique(clique).anchor(g) != Some(a_id) {
                    return Err(CoreError::InvariantViolation(format!(
                        "anchor {i} claims clique {clique} but clique does not claim it back"
                    )));
                }
            }
        }
        for (i, slot) in self.cliques.iter().enumerate() {
            if let Some(clique) = slot {
                if let Some(run) = clique.run {
                    if !self.run_alive(run) {
                        return Err(CoreError::InvariantViolation(format!(
                            "clique {i} references dangling run {run}"
                        )));
                    }
                    if !self.run(run).cliques().contains(&CliqueId::new(i)) {
                        return Err(CoreError::InvariantViolation(format!(
                            "clique {i} claims run {run} but run does not list it"
                        )));
                    }
                }
            }
        }
        for (i, edge) in self.edges.iter().enumerate() {
            if !edge.active {
                continue;
            }
            let edge_id = EdgeId::new(i);
            let genome_b = self.anchor_genome_index(edge.b);
            let genome_a = self.anchor_genome_index(edge.a);
            if !self.anchor(edge.a).edges[genome_b].contains(&edge_id) {
                return Err(CoreError::InvariantViolation(format!(
                    "active edge {i} missing from its 'a' endpoint's edge list"
                )));
            }
            if !self.anchor(edge.b).edges[genome_a].contains(&edge_id) {
                return Err(CoreError::InvariantViolation(format!(
                    "active edge {i} missing from its 'b' endpoint's edge list"
                )));
            }
        }
        Ok(())
    }
}
