//! Global edge pool plus pruning and repeat-marking (spec §4.2, `edge.hh`).

use crate::id::AnchorId;
use crate::world::World;

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub a: AnchorId,
    pub b: AnchorId,
    pub score: i64,
    /// An edge is active iff it is still present in both endpoints' edge
    /// vectors. Because removal is always performed symmetrically (see
    /// `remove_edge`), a single flag is sufficient to track this.
    pub(crate) active: bool,
}

impl Edge {
    /// The other endpoint, given one of the two.
    pub fn other(&self, from: AnchorId) -> AnchorId {
        if self.a == from {
            self.b
        } else {
            debug_assert_eq!(self.b, from);
            self.a
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl World {
    /// Adds a new edge between two anchors in different genomes, appending
    /// it to both endpoints' per-genome vectors. Edges must be added in
    /// non-increasing score order overall (per source genome) for the
    /// "sorted by construction" invariant to hold; callers insert hits
    /// pre-sorted by score (spec §4.2).
    pub fn add_edge(&mut self, a: AnchorId, b: AnchorId, score: i64) {
        let edge_id = self.push_edge(Edge {
            a,
            b,
            score,
            active: true,
        });
        let genome_b = self.anchor_genome_index(b);
        let genome_a = self.anchor_genome_index(a);
        self.anchor_mut(a).edges[genome_b].push(edge_id);
        self.anchor_mut(b).edges[genome_a].push(edge_id);
    }

    /// Removes `edge` from both endpoints' vectors (spec §4.2: "Removal is
    /// always symmetric").
    pub fn remove_edge(&mut self, edge_id: crate::id::EdgeId) {
        let (a, b) = {
            let e = self.edge(edge_id);
            if !e.active {
                return;
            }
            (e.a, e.b)
        };
        let genome_b = self.anchor_genome_index(b);
        let genome_a = self.anchor_genome_index(a);
        self.anchor_mut(a).edges[genome_b].retain(|&e| e != edge_id);
        self.anchor_mut(b).edges[genome_a].retain(|&e| e != edge_id);
        self.edge_mut(edge_id).active = false;
    }

    /// Removes all of `anchor`'s edges to `genome`, except (optionally) one
    /// to keep (used by `remove_non_clique_edges`).
    pub(crate) fn remove_anchor_edges_to_genome(
        &mut self,
        anchor: AnchorId,
        genome: usize,
        keep: Option<crate::id::EdgeId>,
    ) {
        let ids: Vec<_> = self.anchor(anchor).edges[genome]
            .iter()
            .copied()
            .filter(|&e| Some(e) != keep)
            .collect();
        for e in ids {
            self.remove_edge(e);
        }
    }

    /// Prunes edges at load time: an edge is dropped iff its score is below
    /// `prune_pct` times the best edge from *either* endpoint into the
    /// other's genome. Preserves the original's asymmetric "or" semantics
    /// (spec §9 open question #2, DESIGN.md decision #2).
    pub fn prune_edges(&mut self, prune_pct: f64) {
        let mut to_remove = Vec::new();
        for (i, edge) in self.edges.iter().enumerate() {
            if !edge.active {
                continue;
            }
            let edge_id = crate::id::EdgeId::new(i);
            let a = edge.a;
            let b = edge.b;
            let genome_b = self.anchor_genome_index(b);
            let genome_a = self.anchor_genome_index(a);

            let best_from_a = self.anchor(a).edges[genome_b]
                .iter()
                .map(|&e| self.edge(e).score)
                .fold(i64::MIN, i64::max);
            let best_from_b = self.anchor(b).edges[genome_a]
                .iter()
                .map(|&e| self.edge(e).score)
                .fold(i64::MIN, i64::max);

            let threshold_a = (best_from_a as f64) * prune_pct;
            let threshold_b = (best_from_b as f64) * prune_pct;

            if (edge.score as f64) < threshold_a || (edge.score as f64) < threshold_b {
                to_remove.push(edge_id);
            }
        }
        for e in to_remove {
            self.remove_edge(e);
        }
    }

    /// Marks every anchor as repetitive or not, per genome-wise predicate
    /// (spec §4.2). Re-run at several pipeline stages since earlier
    /// filtering changes per-genome edge sets.
    pub fn mark_repeats(&mut self, repeat_num: usize, repeat_pct: f64) {
        let num_genomes = self.num_genomes();
        for i in 0..self.anchors.len() {
            let anchor_id = AnchorId::new(i);
            let mut repetitive = false;
            for g in 0..num_genomes {
                let edges = &self.anchor(anchor_id).edges[g];
                if edges.is_empty() {
                    continue;
                }
                let top = self.edge(edges[0]).score;
                if edges.len() >= 2 && self.edge(edges[1]).score == top {
                    repetitive = true;
                    break;
                }
                let threshold = (top as f64) * repeat_pct;
                let count_above = edges
                    .iter()
                    .filter(|&&e| (self.edge(e).score as f64) >= threshold)
                    .count();
                if count_above >= repeat_num {
                    repetitive = true;
                    break;
                }
            }
            self.anchor_mut(anchor_id).marked_repetitive = repetitive;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Strand;

    fn tiny_world() -> (World, AnchorId, AnchorId, AnchorId) {
        let mut w = World::new(2).unwrap();
        let g0 = w.add_genome("A".into(), false);
        let g1 = w.add_genome("B".into(), false);
        let c0 = w.add_chromosome(g0, "c".into(), 1000);
        let c1 = w.add_chromosome(g1, "c".into(), 1000);
        let a0 = w.add_anchor(c0, "a0".into(), Strand::Forward, 0, 10, 0);
        let b0 = w.add_anchor(c1, "b0".into(), Strand::Forward, 0, 10, 0);
        let b1 = w.add_anchor(c1, "b1".into(), Strand::Forward, 100, 110, 0);
        (w, a0, b0, b1)
    }

    #[test]
    fn repeat_marking_ties() {
        let (mut w, a0, b0, b1) = tiny_world();
        w.add_edge(a0, b0, 100);
        w.add_edge(a0, b1, 100);
        w.mark_repeats(2, 0.9);
        assert!(w.anchor(a0).is_repetitive());
    }

    #[test]
    fn repeat_marking_threshold() {
        let (mut w, a0, b0, b1) = tiny_world();
        w.add_edge(a0, b0, 100);
        w.add_edge(a0, b1, 95);
        w.mark_repeats(2, 0.9);
        assert!(w.anchor(a0).is_repetitive());
    }

    #[test]
    fn prune_drops_low_scoring_edge() {
        let (mut w, a0, b0, b1) = tiny_world();
        w.add_edge(a0, b0, 100);
        w.add_edge(a0, b1, 10);
        w.prune_edges(0.8);
        assert_eq!(w.anchor(a0).num_edges(1), 1);
    }
}
