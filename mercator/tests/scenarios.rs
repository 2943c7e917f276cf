//! End-to-end pipeline scenarios built directly against `mercator_core`,
//! one per testable property in the map-building specification.

use std::io::Read;

use mercator_core::{anchor::Strand, Config, World};
use mercator_io::writers::write_pre_map;

fn read_tmp(f: &tempfile::NamedTempFile) -> String {
    let mut s = String::new();
    std::fs::File::open(f.path()).unwrap().read_to_string(&mut s).unwrap();
    s
}

/// T1: two genomes, four tandem anchors each, matched 1:1 plus weak cross
/// hits. Expect a single four-clique run spanning `[0, 310)` in both.
#[test]
fn two_genome_tandem_forms_one_run() {
    let mut w = World::new(2).unwrap();
    let ga = w.add_genome("A".into(), false);
    let gb = w.add_genome("B".into(), false);
    let ca = w.add_chromosome(ga, "c".into(), 1000);
    let cb = w.add_chromosome(gb, "c".into(), 1000);

    let coords = [(0u64, 10u64), (100, 110), (200, 210), (300, 310)];
    let mut a_anchors = Vec::new();
    let mut b_anchors = Vec::new();
    for (i, &(s, e)) in coords.iter().enumerate() {
        a_anchors.push(w.add_anchor(ca, format!("A{}", i + 1), Strand::Forward, s, e, 0));
        b_anchors.push(w.add_anchor(cb, format!("B{}", i + 1), Strand::Forward, s, e, 0));
    }
    w.sort_anchors();
    w.assign_genome_start_offsets();

    // Each anchor's per-genome edge vector must be sorted by non-increasing
    // score (the invariant `add_edge` itself leaves to its caller, normally
    // upheld by `loaders::load_hits` sorting before insertion): add every
    // true pairing first, then the weaker cross hits, so both endpoints of
    // every edge see their best score first.
    for i in 0..4 {
        w.add_edge(a_anchors[i], b_anchors[i], 100);
    }
    for i in 0..4 {
        for j in 0..4 {
            if i != j {
                w.add_edge(a_anchors[i], b_anchors[j], 10);
            }
        }
    }

    w.make_map(&Config::default());
    w.check_invariants().unwrap();

    let runs: Vec<_> = w.all_runs().collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(w.run(runs[0]).len(), 4);

    let out = tempfile::NamedTempFile::new().unwrap();
    write_pre_map(&w, out.path()).unwrap();
    assert_eq!(read_tmp(&out), "1\tc\t0\t310\t+\tc\t0\t310\t+\n");
}

/// T2: as T1, but B's anchors sit on the reverse strand at the same
/// coordinates, paired so the physical order is reversed (a true
/// inversion). Expect one run, still spanning `[0, 310)`, with B reported
/// on the `-` strand.
#[test]
fn inversion_still_forms_one_run() {
    let mut w = World::new(2).unwrap();
    let ga = w.add_genome("A".into(), false);
    let gb = w.add_genome("B".into(), false);
    let ca = w.add_chromosome(ga, "c".into(), 1000);
    let cb = w.add_chromosome(gb, "c".into(), 1000);

    let coords = [(0u64, 10u64), (100, 110), (200, 210), (300, 310)];
    let mut a_anchors = Vec::new();
    let mut b_anchors = Vec::new();
    for (i, &(s, e)) in coords.iter().enumerate() {
        a_anchors.push(w.add_anchor(ca, format!("A{}", i + 1), Strand::Forward, s, e, 0));
        b_anchors.push(w.add_anchor(cb, format!("B{}", i + 1), Strand::Reverse, s, e, 0));
    }
    w.sort_anchors();
    w.assign_genome_start_offsets();

    // Ai pairs with B(4-i): A1-B4, A2-B3, A3-B2, A4-B1, matching a genome
    // that runs antiparallel to A across the whole span. True pairings
    // added first so every anchor's edge vector stays sorted by score.
    for i in 0..4 {
        w.add_edge(a_anchors[i], b_anchors[3 - i], 100);
    }
    for i in 0..4 {
        for j in 0..4 {
            if j != 3 - i {
                w.add_edge(a_anchors[i], b_anchors[j], 10);
            }
        }
    }

    w.make_map(&Config::default());
    w.check_invariants().unwrap();

    let runs: Vec<_> = w.all_runs().collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(w.run(runs[0]).len(), 4);

    let out = tempfile::NamedTempFile::new().unwrap();
    write_pre_map(&w, out.path()).unwrap();
    assert_eq!(read_tmp(&out), "1\tc\t0\t310\t+\tc\t0\t310\t-\n");
}

/// T3: genome B is draft with two contigs; genome A has one 500bp
/// chromosome whose anchors bracket a join across the B contig boundary.
/// B's anchors sit right at each contig's edge (B2 ends its 60bp contig,
/// B3 opens the next), which is what `is_left_of`'s strict chromosome-end
/// check (the pipeline never runs any other way — `strict_join` has no
/// CLI override) requires before it will bridge draft contigs at all.
/// With a join distance of 300 the two B contigs should be pulled into one
/// run and assembled into a single 310bp chromosome (60 + 50 padding +
/// 200).
#[test]
fn draft_contigs_join_across_gap_and_assemble() {
    let mut w = World::new(2).unwrap();
    let ga = w.add_genome("A".into(), false);
    let gb = w.add_genome("B".into(), true);
    let ca = w.add_chromosome(ga, "c".into(), 500);
    let c1 = w.add_chromosome(gb, "c1".into(), 60);
    let c2 = w.add_chromosome(gb, "c2".into(), 200);

    let a1 = w.add_anchor(ca, "A1".into(), Strand::Forward, 0, 10, 0);
    let a2 = w.add_anchor(ca, "A2".into(), Strand::Forward, 50, 60, 0);
    let a3 = w.add_anchor(ca, "A3".into(), Strand::Forward, 250, 260, 0);
    let a4 = w.add_anchor(ca, "A4".into(), Strand::Forward, 300, 310, 0);
    let b1 = w.add_anchor(c1, "B1".into(), Strand::Forward, 0, 10, 0);
    let b2 = w.add_anchor(c1, "B2".into(), Strand::Forward, 50, 60, 0);
    let b3 = w.add_anchor(c2, "B3".into(), Strand::Forward, 0, 10, 0);
    let b4 = w.add_anchor(c2, "B4".into(), Strand::Forward, 50, 60, 0);
    w.sort_anchors();
    w.assign_genome_start_offsets();

    let a_anchors = [a1, a2, a3, a4];
    let b_anchors = [b1, b2, b3, b4];
    for i in 0..4 {
        w.add_edge(a_anchors[i], b_anchors[i], 100);
    }
    // Weak cross hits, added after every true pairing, so the
    // reciprocal-best clique build has something to reject in favor of the
    // true pairing without unsorting either endpoint's edge vector.
    for i in 0..4 {
        for j in 0..4 {
            if i != j {
                w.add_edge(a_anchors[i], b_anchors[j], 5);
            }
        }
    }

    let mut cfg = Config::default();
    cfg.join_distance = 300;
    cfg.padding = 50;
    w.make_map(&cfg);
    w.check_invariants().unwrap();

    let runs: Vec<_> = w.all_runs().collect();
    assert_eq!(runs.len(), 1);

    let assembled_chrom = w
        .genome(gb)
        .chroms()
        .iter()
        .copied()
        .find(|&c| w.chrom(c).is_assembled())
        .expect("B should have gained an assembled chromosome");
    assert_eq!(w.chrom(assembled_chrom).length, 310);
}

/// T4: A1 ties its top two edges (to B1 and B2), so repeat marking defers
/// it out of the first clique pass entirely — `build_clique` aborts on a
/// repetitive seed or candidate, but does not touch the edges themselves.
/// A2's edge to B2 outscores A1's, so A2-B2 forms its own reciprocal-best
/// clique on that same pass; claiming B2 strips its non-clique edges,
/// which removes A1-B2 and leaves A1 with a single, untied edge to B1.
/// The next repeat-marking pass (run ahead of the pipeline's final
/// incomplete clique pass) then finds A1 no longer repetitive, and it
/// joins B1 into a clique of its own — which then joins the A2-B2 run
/// into one colinear run of two cliques.
#[test]
fn repeat_is_deferred_then_joined() {
    let mut w = World::new(2).unwrap();
    let ga = w.add_genome("A".into(), false);
    let gb = w.add_genome("B".into(), false);
    let ca = w.add_chromosome(ga, "c".into(), 1000);
    let cb = w.add_chromosome(gb, "c".into(), 1000);

    let a1 = w.add_anchor(ca, "A1".into(), Strand::Forward, 0, 10, 0);
    let a2 = w.add_anchor(ca, "A2".into(), Strand::Forward, 100, 110, 0);
    let b1 = w.add_anchor(cb, "B1".into(), Strand::Forward, 0, 10, 0);
    let b2 = w.add_anchor(cb, "B2".into(), Strand::Forward, 100, 110, 0);
    w.sort_anchors();
    w.assign_genome_start_offsets();

    // A2-B2 added before A1-B2 so B2's edge vector ([150(A2), 100(A1)])
    // stays sorted by non-increasing score.
    w.add_edge(a1, b1, 100);
    w.add_edge(a2, b2, 150);
    w.add_edge(a1, b2, 100);

    let mut cfg = Config::default();
    cfg.prune_pct = 0.0;
    w.make_map(&cfg);
    w.check_invariants().unwrap();

    assert!(!w.anchor(a1).is_repetitive());

    let runs: Vec<_> = w.all_runs().collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(w.run(runs[0]).len(), 2);
    let a_members: Vec<_> = w
        .run(runs[0])
        .cliques()
        .iter()
        .filter_map(|&c| w.clique(c).anchor(ga))
        .collect();
    assert!(a_members.contains(&a1));
    assert!(a_members.contains(&a2));
}

/// T5: a lone single-clique run never reaches the significance threshold
/// and must be dropped entirely.
#[test]
fn insignificant_singleton_run_is_removed() {
    let mut w = World::new(2).unwrap();
    let ga = w.add_genome("A".into(), false);
    let gb = w.add_genome("B".into(), false);
    let ca = w.add_chromosome(ga, "c".into(), 1000);
    let cb = w.add_chromosome(gb, "c".into(), 1000);

    let a1 = w.add_anchor(ca, "A1".into(), Strand::Forward, 0, 10, 0);
    let b1 = w.add_anchor(cb, "B1".into(), Strand::Forward, 0, 10, 0);
    w.sort_anchors();
    w.assign_genome_start_offsets();
    w.add_edge(a1, b1, 100);

    let mut cfg = Config::default();
    cfg.min_run_length = 2;
    w.make_map(&cfg);
    w.check_invariants().unwrap();

    assert_eq!(w.all_runs().count(), 0);
}
