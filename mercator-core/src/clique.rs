//! Reciprocal-best clique discovery (spec §4.3, `clique.hh`/`clique.cc`).

use crate::id::{AnchorId, CliqueId, GenomeId, RunId};
use crate::mask::GenomeMask;
use crate::world::World;

/// A set of anchors, at most one per genome, reciprocally best-linked
/// across every pair of included genomes.
#[derive(Debug, Clone)]
pub struct Clique {
    pub(crate) mask: GenomeMask,
    pub(crate) anchors: Vec<Option<AnchorId>>,
    pub(crate) run: Option<RunId>,
    pub(crate) keep: bool,
}

impl Clique {
    fn new(num_genomes: usize) -> Self {
        Self {
            mask: GenomeMask::EMPTY,
            anchors: vec![None; num_genomes],
            run: None,
            keep: false,
        }
    }

    pub fn mask(&self) -> GenomeMask {
        self.mask
    }

    pub fn anchor(&self, g: GenomeId) -> Option<AnchorId> {
        self.anchors.get(g.index()).copied().flatten()
    }

    pub fn has_genome(&self, g: GenomeId) -> bool {
        self.mask.contains(g)
    }

    pub fn run(&self) -> Option<RunId> {
        self.run
    }

    pub fn is_in_run(&self) -> bool {
        self.run.is_some()
    }

    pub fn is_kept(&self) -> bool {
        self.keep
    }

    pub fn size(&self) -> usize {
        self.mask.count() as usize
    }
}

impl World {
    pub(crate) fn new_clique(&mut self) -> CliqueId {
        let num_genomes = self.num_genomes();
        self.push_clique(Clique::new(num_genomes))
    }

    /// Unclaims every anchor in `clique`, detaches it from its run (if any,
    /// leaving that run's bookkeeping to be fixed up by the caller), and
    /// marks the clique slot dead.
    pub fn destroy_clique(&mut self, clique_id: CliqueId) {
        if !self.clique_alive(clique_id) {
            return;
        }
        let anchors: Vec<AnchorId> = self
            .clique(clique_id)
            .anchors
            .iter()
            .filter_map(|a| *a)
            .collect();
        for a in anchors {
            self.anchor_mut(a).clique = None;
        }
        self.cliques[clique_id.index()] = None;
    }

    /// Claims `members` into `clique`. Any anchor already owned by a
    /// different clique causes that clique (and, transitively, its run) to
    /// be destroyed first (spec §3: "claiming anchors already in another
    /// clique destroys that clique").
    pub(crate) fn claim_clique_anchors(
        &mut self,
        clique_id: CliqueId,
        members: &[(GenomeId, AnchorId)],
    ) {
        for &(genome, anchor) in members {
            if let Some(old) = self.anchor(anchor).clique {
                if old != clique_id {
                    if let Some(run) = self.clique(old).run {
                        self.destroy_run(run);
                    } else {
                        self.destroy_clique(old);
                    }
                }
            }
            self.clique_mut(clique_id).mask.set(genome);
            self.clique_mut(clique_id).anchors[genome.index()] = Some(anchor);
            self.anchor_mut(anchor).clique = Some(clique_id);
        }
    }

    pub(crate) fn clique_set_run(&mut self, clique_id: CliqueId, run: Option<RunId>) {
        self.clique_mut(clique_id).run = run;
    }

    /// Strips `genome`'s member out of `clique` without touching the
    /// others, unclaiming its anchor (`Clique::removeAnchor(g)`). Leaves
    /// the clique's run membership to the caller.
    pub(crate) fn clique_remove_anchor(&mut self, clique_id: CliqueId, genome: GenomeId) {
        if let Some(a) = self.clique(clique_id).anchor(genome) {
            self.anchor_mut(a).clique = None;
        }
        let c = self.clique_mut(clique_id);
        c.mask.unset(genome);
        c.anchors[genome.index()] = None;
    }

    /// True if every pair of genomes `clique` spans is still linked by a
    /// direct edge between the two claimed anchors, i.e. filtering passes
    /// haven't severed the edges that originally formed it. Mirrors the
    /// intent of `Clique::isConnected` (which rebuilds the clique from
    /// scratch and compares), simplified to a direct pairwise check.
    pub(crate) fn clique_is_connected(&self, clique_id: CliqueId) -> bool {
        let mask = self.clique(clique_id).mask();
        let members: Vec<(GenomeId, AnchorId)> = (0..self.num_genomes())
            .filter_map(|i| {
                let g = GenomeId::new(i);
                if !mask.contains(g) {
                    return None;
                }
                self.clique(clique_id).anchor(g).map(|a| (g, a))
            })
            .collect();
        for &(g1, a1) in &members {
            for &(g2, a2) in &members {
                if g1 == g2 {
                    continue;
                }
                let linked = self.anchor(a1).edges[g2.index()]
                    .iter()
                    .any(|&e| self.edge(e).other(a1) == a2);
                if !linked {
                    return false;
                }
            }
        }
        true
    }

    pub fn keep_clique(&mut self, clique_id: CliqueId) {
        self.clique_mut(clique_id).keep = true;
    }

    /// Removes, from every anchor claimed by `clique`, all edges to other
    /// in-clique genomes except the single edge internal to the clique
    /// (spec §4.3 "remove non-clique edges", used right after a clique is
    /// used).
    fn remove_non_clique_edges(&mut self, clique_id: CliqueId) {
        let members: Vec<(GenomeId, AnchorId)> = (0..self.num_genomes())
            .filter_map(|i| {
                let g = GenomeId::new(i);
                self.clique(clique_id).anchor(g).map(|a| (g, a))
            })
            .collect();
        for &(genome, anchor) in &members {
            for &(other_genome, other_anchor) in &members {
                if other_genome == genome {
                    continue;
                }
                let keep_edge = self.anchor(anchor).edges[other_genome.index()]
                    .iter()
                    .copied()
                    .find(|&e| self.edge(e).other(anchor) == other_anchor);
                self.remove_anchor_edges_to_genome(anchor, other_genome.index(), keep_edge);
            }
        }
    }

    /// Attempts to build a reciprocal-best clique seeded at `seed`, which
    /// must belong to genome `seed_genome`. `incomplete` relaxes the
    /// requirement that the seed anchor itself has edges to every other
    /// included genome (spec §4.3).
    fn build_clique(&self, seed: AnchorId, incomplete: bool) -> Option<Vec<(GenomeId, AnchorId)>> {
        if self.anchor(seed).is_repetitive() || self.anchor(seed).is_in_clique() {
            return None;
        }

        let mut members: Vec<(GenomeId, AnchorId)> = vec![(self.anchor_genome(seed), seed)];
        let mut mask = GenomeMask::single(self.anchor_genome(seed));

        // Greedily follow best edges breadth-first until no new genome is
        // reached by any member anchor's best edge.
        let mut frontier = vec![seed];
        while let Some(anchor) = frontier.pop() {
            for other_genome_idx in 0..self.num_genomes() {
                if other_genome_idx == self.anchor_genome_index(anchor) {
                    continue;
                }
                let best = match self.anchor(anchor).best_edge(other_genome_idx) {
                    Some(e) => e,
                    None => {
                        if anchor == seed && incomplete {
                            continue;
                        } else if mask.contains(GenomeId::new(other_genome_idx)) {
                            // a member genome we've already committed to must
                            // be reciprocally linked from every other member.
                            return None;
                        } else {
                            continue;
                        }
                    }
                };
                let candidate = self.edge(best).other(anchor);
                if self.anchor(candidate).is_repetitive() || self.anchor(candidate).is_in_clique()
                {
                    return None;
                }
                let candidate_genome = GenomeId::new(other_genome_idx);

                if let Some(existing) = members.iter().find(|&&(g, _)| g == candidate_genome) {
                    if existing.1 != candidate {
                        return None;
                    }
                    continue;
                }

                // Reject if candidate's best edge to any already-included
                // genome points outside the tentative set.
                for &(member_genome, _) in &members {
                    match self.anchor(candidate).best_edge(member_genome.index()) {
                        Some(e) => {
                            let back = self.edge(e).other(candidate);
                            if let Some(&(_, expected)) =
                                members.iter().find(|&&(g, _)| g == member_genome)
                            {
                                if back != expected {
                                    return None;
                                }
                            }
                        }
                        None => {
                            if !incomplete {
                                return None;
                            }
                        }
                    }
                }

                mask.set(candidate_genome);
                members.push((candidate_genome, candidate));
                frontier.push(candidate);
            }
        }

        Some(members)
    }

    /// Claims a successfully built clique, wraps it as a one-clique run
    /// that claims itself, and strips non-clique edges from its anchors
    /// (spec §4.3 "used").
    fn use_clique(&mut self, members: Vec<(GenomeId, AnchorId)>) -> CliqueId {
        let clique_id = self.new_clique();
        self.claim_clique_anchors(clique_id, &members);
        self.remove_non_clique_edges(clique_id);
        let run_id = self.new_run_from_clique(clique_id);
        self.clique_set_run(clique_id, Some(run_id));
        clique_id
    }

    /// Walks every anchor on every genome looking for reciprocal-best
    /// cliques of size >= `min_size`, repeating until a full pass adds
    /// none (spec §4.3).
    pub fn find_cliques(&mut self, min_size: usize, incomplete: bool) -> usize {
        let mut total_found = 0;
        loop {
            let mut found_this_pass = 0;
            for genome_idx in 0..self.num_genomes() {
                let anchor_ids: Vec<AnchorId> = self
                    .genome(GenomeId::new(genome_idx))
                    .chroms()
                    .iter()
                    .flat_map(|&c| self.chrom(c).anchors.clone())
                    .collect();
                for seed in anchor_ids {
                    if self.anchor(seed).is_repetitive() || self.anchor(seed).is_in_clique() {
                        continue;
                    }
                    if let Some(members) = self.build_clique(seed, incomplete) {
                        if members.len() >= min_size {
                            self.use_clique(members);
                            found_this_pass += 1;
                        }
                    }
                }
            }
            total_found += found_this_pass;
            if found_this_pass == 0 {
                break;
            }
        }
        total_found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Strand;

    fn make_world() -> World {
        let mut w = World::new(2).unwrap();
        let ga = w.add_genome("A".into(), false);
        let gb = w.add_genome("B".into(), false);
        let ca = w.add_chromosome(ga, "c".into(), 1000);
        let cb = w.add_chromosome(gb, "c".into(), 1000);
        let a0 = w.add_anchor(ca, "a0".into(), Strand::Forward, 0, 10, 0);
        let b0 = w.add_anchor(cb, "b0".into(), Strand::Forward, 0, 10, 0);
        w.sort_anchors();
        w.assign_genome_start_offsets();
        w.add_edge(a0, b0, 100);
        w
    }

    #[test]
    fn reciprocal_best_pair_forms_clique() {
        let mut w = make_world();
        let found = w.find_cliques(2, false);
        assert_eq!(found, 1);
    }

    #[test]
    fn claimed_anchor_is_not_reused() {
        let mut w = make_world();
        w.find_cliques(2, false);
        assert_eq!(w.find_cliques(2, false), 0);
    }
}
