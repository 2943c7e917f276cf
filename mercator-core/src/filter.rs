//! Colinearity enforcement: drops edges that would make a run's cliques
//! non-colinear in some genome, either within a run or between adjacent
//! runs (spec §4.5, ported from `run.cc`'s `Run::filterIntraRunEdges` and
//! `Run::filterInterRunEdges`).

use crate::anchor::Strand;
use crate::id::{AnchorId, CliqueId, GenomeId, RunId};
use crate::mask::GenomeMask;
use crate::world::World;

impl World {
    /// Absolute genomic position used to order anchors of the same genome
    /// regardless of which chromosome they sit on, mirroring
    /// `Anchor::getGenomeStart()` / `Anchor::operator<`.
    fn anchor_order_key(&self, a: AnchorId) -> u64 {
        let anchor = self.anchor(a);
        self.chrom(anchor.chrom()).genome_start + anchor.start
    }

    /// Drops every edge from `anchor` into `genome` whose far endpoint does
    /// not sit strictly between `start` and `end` in that genome's
    /// absolute order; a missing bound is unbounded on that side. Ports
    /// `Anchor::filterEdges(genome, start, end)`.
    fn filter_anchor_edges_to_genome(
        &mut self,
        anchor: AnchorId,
        genome: GenomeId,
        start: Option<AnchorId>,
        end: Option<AnchorId>,
    ) {
        if start.is_none() && end.is_none() {
            return;
        }
        let start_key = start.map(|a| self.anchor_order_key(a));
        let end_key = end.map(|a| self.anchor_order_key(a));
        let edges = self.anchor(anchor).edges[genome.index()].clone();
        for e in edges {
            let other = self.edge(e).other(anchor);
            let key = self.anchor_order_key(other);
            let inside =
                start_key.map_or(true, |s| s < key) && end_key.map_or(true, |e| key < e);
            if !inside {
                self.remove_edge(e);
            }
        }
    }

    /// The run's own nearest claimed neighbor to the left of its left
    /// anchor in `genome`, used as the interval boundary when no adjacent
    /// run shares `genome` to supply one (`run.cc`'s
    /// `getLeftInterRunAnchorInterval`).
    fn run_outer_left(&self, run_id: RunId, genome: GenomeId) -> Option<AnchorId> {
        if !self.run(run_id).mask().contains(genome) {
            return None;
        }
        let left = self.run_end_anchor(run_id, genome, false)?;
        let forward = self.anchor(left).strand == Strand::Forward;
        self.next_anchor_in_run(left, !forward)
    }

    /// Mirror of [`run_outer_left`] on the run's right end.
    fn run_outer_right(&self, run_id: RunId, genome: GenomeId) -> Option<AnchorId> {
        if !self.run(run_id).mask().contains(genome) {
            return None;
        }
        let right = self.run_end_anchor(run_id, genome, true)?;
        let forward = self.anchor(right).strand == Strand::Forward;
        self.next_anchor_in_run(right, forward)
    }

    /// Within every run, for each genome g and each adjacent pair of
    /// g-containing cliques, propagates begin/end masks outward through
    /// the run's clique sequence to find, for every other genome f, the
    /// nearest enclosing anchor on each side; every anchor strictly
    /// between the g-pair then loses any edge into f landing outside that
    /// interval (spec §4.5, `run.cc`'s `Run::filterIntraRunEdges`).
    pub fn filter_intra_run_edges(&mut self) {
        let run_ids: Vec<RunId> = self.all_runs().collect();
        for run_id in run_ids {
            self.filter_intra_run_edges_one(run_id);
        }
    }

    fn filter_intra_run_edges_one(&mut self, run_id: RunId) {
        let cliques = self.run(run_id).cliques().to_vec();
        if cliques.len() < 2 {
            return;
        }
        let mask = self.run(run_id).mask();
        let n = self.num_genomes();

        let outer_begin: Vec<Option<AnchorId>> =
            (0..n).map(|g| self.run_outer_left(run_id, GenomeId::new(g))).collect();
        let outer_end: Vec<Option<AnchorId>> =
            (0..n).map(|g| self.run_outer_right(run_id, GenomeId::new(g))).collect();

        for g_idx in 0..n {
            let g = GenomeId::new(g_idx);
            if !mask.contains(g) {
                continue;
            }
            let positions: Vec<usize> = cliques
                .iter()
                .enumerate()
                .filter(|&(_, &c)| self.clique(c).has_genome(g))
                .map(|(i, _)| i)
                .collect();
            for w in positions.windows(2) {
                self.filter_intra_run_pair(
                    &cliques, mask, g, w[0], w[1], &outer_begin, &outer_end,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn filter_intra_run_pair(
        &mut self,
        cliques: &[CliqueId],
        mask: GenomeMask,
        g: GenomeId,
        begin_pos: usize,
        end_pos: usize,
        outer_begin: &[Option<AnchorId>],
        outer_end: &[Option<AnchorId>],
    ) {
        let n = self.num_genomes();
        let mut begins: Vec<Option<AnchorId>> = vec![None; n];
        let mut ends: Vec<Option<AnchorId>> = vec![None; n];

        // Walk left from begin_pos, gathering the nearest claimed anchor in
        // every genome reachable before the mask closes (begins[f] fills in
        // list order, so the first hit wins: the nearest one to the gap).
        let mut begin_mask = self.clique(cliques[begin_pos]).mask();
        for &c in cliques[..=begin_pos].iter().rev() {
            let cmask = self.clique(c).mask();
            if cmask.intersection(begin_mask).is_empty() {
                continue;
            }
            for f_idx in 0..n {
                let f = GenomeId::new(f_idx);
                if begins[f_idx].is_none() && cmask.contains(f) {
                    begins[f_idx] = self.clique(c).anchor(f);
                }
            }
            begin_mask = begin_mask.union(cmask);
            if begin_mask == mask {
                break;
            }
        }

        // Symmetric walk to the right of end_pos.
        let mut end_mask = self.clique(cliques[end_pos]).mask();
        for &c in &cliques[end_pos..] {
            let cmask = self.clique(c).mask();
            if cmask.intersection(end_mask).is_empty() {
                continue;
            }
            for f_idx in 0..n {
                let f = GenomeId::new(f_idx);
                if ends[f_idx].is_none() && cmask.contains(f) {
                    ends[f_idx] = self.clique(c).anchor(f);
                }
            }
            end_mask = end_mask.union(cmask);
            if end_mask == mask {
                break;
            }
        }

        let begin_anchor = match self.clique(cliques[begin_pos]).anchor(g) {
            Some(a) => a,
            None => return,
        };
        let end_anchor = match self.clique(cliques[end_pos]).anchor(g) {
            Some(a) => a,
            None => return,
        };
        let g_forward = self.anchor(begin_anchor).strand == Strand::Forward;

        for f_idx in 0..n {
            let f = GenomeId::new(f_idx);
            if f_idx == g.index() || !mask.contains(f) {
                continue;
            }

            let mut b = begins[f_idx].or(outer_begin[f_idx]);
            let mut e = ends[f_idx].or(outer_end[f_idx]);
            if b.is_none() && e.is_none() {
                continue;
            }

            // Draft genome whose begin/end fall on different contigs: the
            // interval can't be compared meaningfully, leave it unpruned
            // (spec §9 open question #1, conservative).
            if self.genome(f).is_draft {
                let same_contig = matches!(
                    (b, e),
                    (Some(bb), Some(ee)) if self.anchor(bb).chrom() == self.anchor(ee).chrom()
                );
                if !same_contig {
                    continue;
                }
            }

            let f_forward = match (b, e) {
                (Some(bb), _) => self.anchor(bb).strand == Strand::Forward,
                (_, Some(ee)) => self.anchor(ee).strand == Strand::Forward,
                (None, None) => continue,
            };
            if !f_forward {
                if let (Some(bb), Some(ee)) = (b, e) {
                    if self.anchor_order_key(bb) < self.anchor_order_key(ee) {
                        // Cyclic run (an assembled chromosome rejoining
                        // itself): leave unpruned rather than mis-order.
                        continue;
                    }
                }
                std::mem::swap(&mut b, &mut e);
            } else if let (Some(bb), Some(ee)) = (b, e) {
                if self.anchor_order_key(ee) < self.anchor_order_key(bb) {
                    continue;
                }
            }

            if self.anchor(begin_anchor).chrom() != self.anchor(end_anchor).chrom() {
                let mut cur = self.next_anchor(begin_anchor, g_forward);
                while let Some(a) = cur {
                    self.filter_anchor_edges_to_genome(a, f, b, e);
                    cur = self.next_anchor(a, g_forward);
                }
                let mut cur = self.next_anchor(end_anchor, !g_forward);
                while let Some(a) = cur {
                    self.filter_anchor_edges_to_genome(a, f, b, e);
                    cur = self.next_anchor(a, !g_forward);
                }
            } else {
                let mut cur = self.next_anchor(begin_anchor, g_forward);
                while let Some(a) = cur {
                    if a == end_anchor {
                        break;
                    }
                    self.filter_anchor_edges_to_genome(a, f, b, e);
                    cur = self.next_anchor(a, g_forward);
                }
            }
        }
    }

    /// Between every run and its left neighbor on each shared genome g,
    /// derives, for every other genome f, the interval `[right end of the
    /// left neighbor in f, left end of this run in f]` (or the run's own
    /// outer boundary in f when no left neighbor shares g), then drops any
    /// edge into f from an anchor strictly inside the g-gap that lands
    /// outside that interval (spec §4.5).
    pub fn filter_inter_run_edges(&mut self) {
        let run_ids: Vec<RunId> = self.all_runs().collect();
        for run_id in run_ids {
            if !self.run_alive(run_id) {
                continue;
            }
            self.filter_inter_run_edges_one(run_id);
        }
    }

    fn filter_inter_run_edges_one(&mut self, run_id: RunId) {
        let mask = self.run(run_id).mask();
        let n = self.num_genomes();

        for g_idx in 0..n {
            let g = GenomeId::new(g_idx);
            if !mask.contains(g) {
                continue;
            }
            let r_left = match self.run_end_anchor(run_id, g, false) {
                Some(a) => a,
                None => continue,
            };
            let forward = self.anchor(r_left).strand == Strand::Forward;
            let neighbor = self.next_anchor_in_run(r_left, !forward);
            let left_run = neighbor
                .and_then(|a| self.anchor(a).clique())
                .and_then(|c| self.clique(c).run());
            if left_run == Some(run_id) {
                continue;
            }

            let mut gap_anchors = Vec::new();
            match (left_run, neighbor) {
                (Some(_), Some(start)) => {
                    let mut cur = self.next_anchor(start, forward);
                    while let Some(a) = cur {
                        if a == r_left {
                            break;
                        }
                        gap_anchors.push(a);
                        cur = self.next_anchor(a, forward);
                    }
                }
                _ => {
                    let mut cur = self.next_anchor(r_left, !forward);
                    while let Some(a) = cur {
                        gap_anchors.push(a);
                        cur = self.next_anchor(a, !forward);
                    }
                }
            }
            if gap_anchors.is_empty() {
                continue;
            }

            for f_idx in 0..n {
                if f_idx == g_idx {
                    continue;
                }
                let f = GenomeId::new(f_idx);
                let lo = match left_run {
                    Some(l) if self.run(l).mask().contains(f) => self.run_end_anchor(l, f, true),
                    Some(_) => None,
                    None => self.run_outer_left(run_id, f),
                };
                let hi = if mask.contains(f) {
                    self.run_end_anchor(run_id, f, false)
                } else {
                    None
                };
                if lo.is_none() && hi.is_none() {
                    continue;
                }
                for &a in &gap_anchors {
                    self.filter_anchor_edges_to_genome(a, f, lo, hi);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Strand;

    /// Spec §8 T6: a run's clique backbone is A1-B1, A2-B2, A3-B3, with an
    /// unclaimed anchor in A (`Afree`) sitting between A1 and A2 that still
    /// has edges into two unclaimed B anchors, one inside the `[B1, B2]`
    /// window and one well outside it. Intra-run filtering must keep the
    /// inside edge and prune the outside one.
    #[test]
    fn intra_run_filtering_prunes_edges_outside_the_window() {
        let mut w = World::new(2).unwrap();
        let ga = w.add_genome("A".into(), false);
        let gb = w.add_genome("B".into(), false);
        let ca = w.add_chromosome(ga, "c".into(), 1000);
        let cb = w.add_chromosome(gb, "c".into(), 1000);

        let a1 = w.add_anchor(ca, "A1".into(), Strand::Forward, 0, 10, 0);
        let afree = w.add_anchor(ca, "Afree".into(), Strand::Forward, 50, 60, 0);
        let a2 = w.add_anchor(ca, "A2".into(), Strand::Forward, 150, 160, 0);
        let a3 = w.add_anchor(ca, "A3".into(), Strand::Forward, 250, 260, 0);

        let b1 = w.add_anchor(cb, "B1".into(), Strand::Forward, 0, 10, 0);
        let bmid = w.add_anchor(cb, "Bmid".into(), Strand::Forward, 50, 60, 0);
        let b2 = w.add_anchor(cb, "B2".into(), Strand::Forward, 150, 160, 0);
        let b3 = w.add_anchor(cb, "B3".into(), Strand::Forward, 250, 260, 0);
        let bfar = w.add_anchor(cb, "Bfar".into(), Strand::Forward, 350, 360, 0);

        w.sort_anchors();
        w.assign_genome_start_offsets();

        w.add_edge(a1, b1, 100);
        w.add_edge(a2, b2, 100);
        w.add_edge(a3, b3, 100);
        w.add_edge(afree, bmid, 50);
        w.add_edge(afree, bfar, 50);

        let c1 = w.new_clique();
        w.claim_clique_anchors(c1, &[(ga, a1), (gb, b1)]);
        let c2 = w.new_clique();
        w.claim_clique_anchors(c2, &[(ga, a2), (gb, b2)]);
        let c3 = w.new_clique();
        w.claim_clique_anchors(c3, &[(ga, a3), (gb, b3)]);

        let run = w.new_run_from_clique(c1);
        w.clique_set_run(c2, Some(run));
        w.clique_set_run(c3, Some(run));
        w.run_mut(run).cliques = vec![c1, c2, c3];
        w.run_mut(run).mask = w
            .clique(c1)
            .mask()
            .union(w.clique(c2).mask())
            .union(w.clique(c3).mask());

        assert_eq!(w.anchor(afree).num_edges(gb.index()), 2);

        w.filter_intra_run_edges();

        assert_eq!(w.anchor(afree).num_edges(gb.index()), 1);
        assert!(w.anchor(afree).edges[gb.index()]
            .iter()
            .any(|&e| w.edge(e).other(afree) == bmid));
    }
}
