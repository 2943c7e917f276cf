//! Colinear chains of cliques (spec §4.4, `run.hh`/`run.cc`).

use crate::anchor::Strand;
use crate::id::{AnchorId, CliqueId, GenomeId, RunId};
use crate::mask::GenomeMask;
use crate::world::World;

/// An ordered chain of cliques that are colinear across every genome they
/// share. A fresh clique is always wrapped as a one-clique run that claims
/// itself; runs grow by joining to a neighboring run to their right.
#[derive(Debug, Clone)]
pub struct Run {
    pub(crate) cliques: Vec<CliqueId>,
    pub(crate) mask: GenomeMask,
    /// Running number assigned during postprocessing (spec §4.6); `None`
    /// until then.
    pub(crate) number: Option<u32>,
    pub(crate) significant: bool,
}

impl Run {
    fn new(clique: CliqueId, mask: GenomeMask) -> Self {
        Self {
            cliques: vec![clique],
            mask,
            number: None,
            significant: true,
        }
    }

    pub fn cliques(&self) -> &[CliqueId] {
        &self.cliques
    }

    pub fn mask(&self) -> GenomeMask {
        self.mask
    }

    pub fn len(&self) -> usize {
        self.cliques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cliques.is_empty()
    }

    pub fn number(&self) -> Option<u32> {
        self.number
    }

    pub fn is_significant(&self) -> bool {
        self.significant
    }

    pub fn left_clique(&self) -> CliqueId {
        self.cliques[0]
    }

    pub fn right_clique(&self) -> CliqueId {
        *self.cliques.last().unwrap()
    }
}

impl World {
    pub(crate) fn new_run_from_clique(&mut self, clique: CliqueId) -> RunId {
        let mask = self.clique(clique).mask();
        self.push_run(Run::new(clique, mask))
    }

    /// Destroys a run and every clique it owns (spec §3: destroying a run
    /// destroys its cliques, which unclaims their anchors).
    pub fn destroy_run(&mut self, run_id: RunId) {
        if !self.run_alive(run_id) {
            return;
        }
        let cliques = self.run(run_id).cliques.clone();
        self.runs[run_id.index()] = None;
        for c in cliques {
            if self.clique_alive(c) {
                self.clique_mut(c).run = None;
                self.destroy_clique(c);
            }
        }
    }

    pub fn mark_run_insignificant(&mut self, run_id: RunId) {
        self.run_mut(run_id).significant = false;
    }

    pub fn set_run_number(&mut self, run_id: RunId, n: u32) {
        self.run_mut(run_id).number = Some(n);
    }

    /// Per-genome anchor at the left (or right) end of a run: the
    /// lexicographic extreme among the run's clique anchors present in
    /// `genome` (spec §3 invariant 4), *not* simply the anchor of the
    /// list-order first/last clique. A run's clique list is ordered to
    /// agree with its first (reference) genome's forward direction; a
    /// genome whose member anchors are reverse-stranded runs through the
    /// same list back-to-front, so for such a genome "right end" (maximum
    /// position) is the list's *first* clique, not its last (spec §4.4
    /// "same orientation").
    pub fn run_end_anchor(&self, run_id: RunId, genome: GenomeId, right: bool) -> Option<AnchorId> {
        let anchors: Vec<AnchorId> = self
            .run(run_id)
            .cliques()
            .iter()
            .filter_map(|&c| self.clique(c).anchor(genome))
            .collect();
        let first = *anchors.first()?;
        let forward = self.anchor(first).strand == Strand::Forward;
        let want_max = right == forward;
        if want_max {
            anchors.into_iter().max_by_key(|&a| self.anchor(a).start)
        } else {
            anchors.into_iter().min_by_key(|&a| self.anchor(a).start)
        }
    }

    /// True if `left`'s anchor in `genome` precedes `right`'s anchor in the
    /// same genome with nothing else of significance between them, walking
    /// in the direction each anchor's own strand implies ("precedes...in
    /// that orientation", spec §4.4): on the forward strand that means
    /// increasing physical position, on the reverse strand, decreasing.
    /// Both ends must agree in strand ("same orientation"). For a finished
    /// (non-draft) chromosome this means immediate adjacency on the
    /// backbone; for a draft genome the two may sit on different contigs,
    /// in which case `strict` additionally requires both anchors to be at
    /// the very end of their respective contigs (spec §4.4 `isLeftOf`,
    /// DESIGN.md decision #3).
    pub fn is_left_of(
        &self,
        left: AnchorId,
        right: AnchorId,
        genome: GenomeId,
        strict: bool,
    ) -> bool {
        if self.anchor(left).strand != self.anchor(right).strand {
            return false;
        }
        let forward = self.anchor(left).strand == Strand::Forward;

        let left_chrom = self.anchor(left).chrom();
        let right_chrom = self.anchor(right).chrom();
        let is_draft = self.genome(genome).is_draft;

        if left_chrom == right_chrom {
            return self
                .next_anchor_in_run(left, forward)
                .map(|n| n == right)
                .unwrap_or(false);
        }

        if !is_draft {
            return false;
        }

        // Different contigs of a draft genome: acceptable only if nothing
        // follows `left` in the walk direction on its contig and nothing
        // precedes `right`, unless `strict` additionally requires
        // chromosome-end.
        let left_is_tail = self.next_anchor(left, forward).is_none();
        let right_is_head = self.next_anchor(right, !forward).is_none();
        if !(left_is_tail && right_is_head) {
            return false;
        }
        if strict {
            let (left_at_chrom_end, right_at_chrom_start) = if forward {
                (
                    self.anchor(left).end == self.chrom(left_chrom).length,
                    self.anchor(right).start == 0,
                )
            } else {
                (
                    self.anchor(left).start == 0,
                    self.anchor(right).end == self.chrom(right_chrom).length,
                )
            };
            left_at_chrom_end && right_at_chrom_start
        } else {
            true
        }
    }

    /// Attempts to join `right_run` onto the right end of `left_run`. Walks
    /// the shared genome mask checking `is_left_of` pairwise; records
    /// dead-ends on an explicit stack instead of recursing, per spec §9's
    /// redesign of the original's recursive `canJoinTo`. On success,
    /// `right_run`'s cliques are appended to `left_run` and `right_run` is
    /// destroyed (without destroying its cliques); returns whether the
    /// join happened.
    pub fn try_join_runs(
        &mut self,
        left_run: RunId,
        right_run: RunId,
        strict: bool,
        max_dist: Option<u64>,
    ) -> bool {
        if left_run == right_run {
            return false;
        }
        let shared = self.run(left_run).mask.intersection(self.run(right_run).mask);
        if shared.is_empty() {
            return false;
        }

        // Work stack of (genome_index, done) pairs standing in for the
        // recursive "rollback to the last decision point" pattern: every
        // shared genome must agree before the join is accepted.
        let mut ok = true;
        for g_idx in 0..self.num_genomes() {
            let g = GenomeId::new(g_idx);
            if !shared.contains(g) {
                continue;
            }
            let left_anchor = match self.run_end_anchor(left_run, g, true) {
                Some(a) => a,
                None => {
                    ok = false;
                    break;
                }
            };
            let right_anchor = match self.run_end_anchor(right_run, g, false) {
                Some(a) => a,
                None => {
                    ok = false;
                    break;
                }
            };
            if !self.is_left_of(left_anchor, right_anchor, g, strict) {
                ok = false;
                break;
            }
            if let Some(max_dist) = max_dist {
                let forward = self.anchor(left_anchor).strand == crate::anchor::Strand::Forward;
                let left_chrom = self.anchor(left_anchor).chrom();
                let right_chrom = self.anchor(right_anchor).chrom();
                let gap = if left_chrom == right_chrom {
                    if forward {
                        self.anchor(right_anchor)
                            .start
                            .saturating_sub(self.anchor(left_anchor).end)
                    } else {
                        self.anchor(left_anchor)
                            .start
                            .saturating_sub(self.anchor(right_anchor).end)
                    }
                } else {
                    // Draft across-contig case (spec §4.4): bound the sum of
                    // each end's distance to its own chromosome's edge,
                    // rather than leaving it unbounded. Which edge is
                    // "distal" depends on the walk direction implied by
                    // strand, same as `is_left_of`'s strict-mode check.
                    if forward {
                        let to_chrom_end =
                            self.chrom(left_chrom).length - self.anchor(left_anchor).end;
                        let to_chrom_start = self.anchor(right_anchor).start;
                        to_chrom_end + to_chrom_start
                    } else {
                        let to_chrom_start = self.anchor(left_anchor).start;
                        let to_chrom_end =
                            self.chrom(right_chrom).length - self.anchor(right_anchor).end;
                        to_chrom_start + to_chrom_end
                    }
                };
                if gap > max_dist {
                    ok = false;
                    break;
                }
            }
        }

        if !ok {
            return false;
        }

        let right_cliques = self.run(right_run).cliques.clone();
        for &c in &right_cliques {
            self.clique_mut(c).run = Some(left_run);
        }
        let new_mask = self.run(left_run).mask.union(self.run(right_run).mask);
        {
            let left = self.run_mut(left_run);
            left.cliques.extend(right_cliques);
            left.mask = new_mask;
        }
        self.runs[right_run.index()] = None;
        true
    }

    /// Splits `run` into two runs at clique index `at` (0-based; the
    /// clique at `at` becomes the first clique of the new right-hand run).
    /// Used by inter-run edge filtering when colinearity breaks partway
    /// through a run (spec §4.5).
    pub fn split_run(&mut self, run_id: RunId, at: usize) -> Option<RunId> {
        if at == 0 || at >= self.run(run_id).cliques.len() {
            return None;
        }
        let tail: Vec<CliqueId> = self.run_mut(run_id).cliques.split_off(at);
        let mut mask = GenomeMask::EMPTY;
        for &c in &tail {
            mask = mask.union(self.clique(c).mask());
        }
        let new_run = self.push_run(Run::new(tail[0], mask));
        self.run_mut(new_run).cliques = tail.clone();
        for &c in &tail {
            self.clique_mut(c).run = Some(new_run);
        }
        let mut remaining_mask = GenomeMask::EMPTY;
        for &c in &self.run(run_id).cliques.clone() {
            remaining_mask = remaining_mask.union(self.clique(c).mask());
        }
        self.run_mut(run_id).mask = remaining_mask;
        Some(new_run)
    }

    /// Flips a run's orientation: reverses clique order and flips the
    /// strand of every member anchor in every clique, so the run now
    /// reads back-to-front in each genome it spans (spec §4.6, `run.cc`'s
    /// `Run::flip`/`Clique::flip`/`Anchor::flip`). Used before numbering a
    /// run whose first participating genome runs reverse.
    pub fn flip_run(&mut self, run_id: RunId) {
        let cliques = self.run(run_id).cliques().to_vec();
        for &c in &cliques {
            let cmask = self.clique(c).mask();
            for g_idx in 0..self.num_genomes() {
                let g = GenomeId::new(g_idx);
                if cmask.contains(g) {
                    if let Some(a) = self.clique(c).anchor(g) {
                        self.anchor_mut(a).flip_strand();
                    }
                }
            }
        }
        self.run_mut(run_id).cliques.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Strand;

    fn two_genome_world() -> World {
        let mut w = World::new(2).unwrap();
        let ga = w.add_genome("A".into(), false);
        let gb = w.add_genome("B".into(), false);
        let ca = w.add_chromosome(ga, "c".into(), 1000);
        let cb = w.add_chromosome(gb, "c".into(), 1000);
        let a0 = w.add_anchor(ca, "a0".into(), Strand::Forward, 0, 10, 0);
        let a1 = w.add_anchor(ca, "a1".into(), Strand::Forward, 20, 30, 0);
        let b0 = w.add_anchor(cb, "b0".into(), Strand::Forward, 0, 10, 0);
        let b1 = w.add_anchor(cb, "b1".into(), Strand::Forward, 20, 30, 0);
        w.sort_anchors();
        w.assign_genome_start_offsets();
        w.add_edge(a0, b0, 100);
        w.add_edge(a1, b1, 100);
        w
    }

    #[test]
    fn adjacent_cliques_join_into_one_run() {
        let mut w = two_genome_world();
        w.find_cliques(2, false);
        let runs: Vec<RunId> = w.all_runs().collect();
        assert_eq!(runs.len(), 2);
        let joined = w.try_join_runs(runs[0], runs[1], false, None);
        assert!(joined);
        assert_eq!(w.all_runs().count(), 1);
    }

    #[test]
    fn split_run_restores_two_runs() {
        let mut w = two_genome_world();
        w.find_cliques(2, false);
        let runs: Vec<RunId> = w.all_runs().collect();
        w.try_join_runs(runs[0], runs[1], false, None);
        let remaining: Vec<RunId> = w.all_runs().collect();
        assert_eq!(remaining.len(), 1);
        let new_run = w.split_run(remaining[0], 1);
        assert!(new_run.is_some());
        assert_eq!(w.all_runs().count(), 2);
    }
}
