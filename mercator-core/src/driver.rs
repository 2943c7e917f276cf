//! Top-level pipeline sequencing (spec §4.7, `mercator.cc`).

use crate::id::GenomeId;
use crate::world::World;

/// Tunable thresholds for a pipeline run, mirroring the original's
/// command-line knobs (spec §6).
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum number of edges to a genome, tied for the top score or
    /// scoring within `repeat_pct` of it, before an anchor is marked
    /// repetitive.
    pub repeat_num: usize,
    pub repeat_pct: f64,
    /// Fraction of the best edge score below which an edge is pruned.
    pub prune_pct: f64,
    /// Minimum clique count for a run to survive `remove_insignificant_runs`
    /// (spec §6 `--min-run-length`), unless one of its cliques is `keep`.
    pub min_run_length: usize,
    /// Whether the final join pass may cross draft-genome contig
    /// boundaries without requiring a chromosome-end clique.
    pub strict_join: bool,
    /// Maximum gap, in bases, allowed between two same-chromosome runs
    /// being joined during the descending clique-size loop (spec §4.7
    /// step 2's `max_dist`). Later joins in the pipeline are unbounded.
    pub join_distance: u64,
    /// Bases of `N` padding between components of an assembled draft
    /// chromosome (spec §6 `--padding`).
    pub padding: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repeat_num: 2,
            repeat_pct: 0.9,
            prune_pct: 0.8,
            min_run_length: 2,
            strict_join: true,
            join_distance: 300_000,
            padding: 100,
        }
    }
}

impl World {
    /// Repeatedly scans the backbone joining adjacent runs until a full
    /// pass makes no progress (spec §4.4).
    fn join_all_runs(&mut self, strict: bool, max_dist: Option<u64>) {
        loop {
            let mut joined_any = false;
            let run_ids: Vec<_> = self.all_runs().collect();
            'outer: for &run_id in &run_ids {
                if !self.run_alive(run_id) {
                    continue;
                }
                for g_idx in 0..self.num_genomes() {
                    let g = GenomeId::new(g_idx);
                    let right_anchor = match self.run_end_anchor(run_id, g, true) {
                        Some(a) => a,
                        None => continue,
                    };
                    let neighbor = match self.next_anchor_in_run(right_anchor, true) {
                        Some(a) => a,
                        None => continue,
                    };
                    let neighbor_clique = match self.anchor(neighbor).clique() {
                        Some(c) => c,
                        None => continue,
                    };
                    let neighbor_run = match self.clique(neighbor_clique).run() {
                        Some(r) => r,
                        None => continue,
                    };
                    if neighbor_run == run_id {
                        continue;
                    }
                    if self.try_join_runs(run_id, neighbor_run, strict, max_dist) {
                        joined_any = true;
                        continue 'outer;
                    }
                }
            }
            if !joined_any {
                break;
            }
        }
    }

    /// Primary pipeline: repeat marking, pruning, a descending sequence of
    /// clique-size passes joined and filtered after each pass, then
    /// postprocessing (spec §4.7 "make_map").
    pub fn make_map(&mut self, cfg: &Config) {
        self.mark_repeats(cfg.repeat_num, cfg.repeat_pct);
        self.prune_edges(cfg.prune_pct);

        let n = self.num_genomes();
        for min_size in (2..=n).rev() {
            let incomplete = min_size < n;
            self.find_cliques(min_size, incomplete);
            self.filter_intra_run_edges();
            self.join_all_runs(cfg.strict_join, Some(cfg.join_distance));
            self.filter_inter_run_edges();
        }

        // Final incomplete pass and unbounded joins (spec §4.7 steps 3-6).
        self.mark_repeats(cfg.repeat_num, cfg.repeat_pct);
        self.find_cliques(2, true);
        self.join_all_runs(cfg.strict_join, None);

        if cfg.min_run_length > 1 {
            self.remove_singleton_runs();
            self.join_all_runs(cfg.strict_join, None);
        }

        self.remove_insignificant_runs(cfg.min_run_length);
        self.join_all_runs(cfg.strict_join, None);
        self.filter_intra_run_edges();
        self.filter_inter_run_edges();

        self.mark_repeats(cfg.repeat_num, cfg.repeat_pct);
        self.find_cliques(2, true);
        self.join_all_runs(cfg.strict_join, None);
        self.remove_insignificant_runs(cfg.min_run_length);
        self.remove_singleton_runs();
        self.join_all_runs(cfg.strict_join, None);

        self.postprocess(cfg);
    }

    /// Alternative pipeline entry point: skips repeat marking and clique
    /// discovery, assuming the edge set already reflects a pre-existing
    /// pairwise map loaded via `--pairwisehits`, and goes straight to
    /// joining and postprocessing (spec §4.7 "join_pairwise_maps").
    pub fn join_pairwise_maps(&mut self, cfg: &Config) {
        self.join_all_runs(cfg.strict_join, None);
        self.filter_inter_run_edges();
        self.postprocess(cfg);
    }

    fn postprocess(&mut self, cfg: &Config) {
        self.remove_singleton_runs();
        self.remove_insignificant_runs(cfg.min_run_length);

        let draft_genomes: Vec<GenomeId> = self
            .genomes()
            .filter(|&g| self.genome(g).is_draft)
            .collect();
        for g in draft_genomes {
            self.break_draft_cycles(g);
        }
        self.remove_singleton_runs();

        let reference = GenomeId::new(0);
        let draft_genomes: Vec<GenomeId> = self
            .genomes()
            .filter(|&g| self.genome(g).is_draft)
            .collect();
        for g in draft_genomes {
            self.assemble_draft_genome(g, reference, cfg.padding);
        }
        self.assign_genome_start_offsets();

        self.number_runs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Strand;

    #[test]
    fn make_map_on_two_genome_tandem_produces_one_run() {
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

        let cfg = Config::default();
        w.make_map(&cfg);

        assert_eq!(w.all_runs().count(), 1);
    }
}
