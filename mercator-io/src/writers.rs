//! Output-format writers: `genomes`, `<genome>.coverage`, `runs`,
//! `pre.map`, `map`, `pairwisehits`, `<genome>.agp`, `<genome>.anchors`,
//! `<genome>.mgr`, plus the `--output-hits`/`--output-runs` debug dumps
//! (spec §6, §2.2, grounded in `multimap.cc`/`assembled.cc`).

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use mercator_core::{
    anchor::Strand,
    id::{ChromId, GenomeId, RunId},
    world::World,
};
use utile::range::{RangeExt, RangeLen};

use crate::error::IoError;

fn create(path: &Path) -> Result<BufWriter<File>, IoError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| IoError::Write {
            path: path.display().to_string(),
            source,
        })
}

fn wrap_write(path: &Path, source: std::io::Error) -> IoError {
    IoError::Write {
        path: path.display().to_string(),
        source,
    }
}

pub fn write_genomes(world: &World, path: &Path) -> Result<(), IoError> {
    let mut w = create(path)?;
    let names: Vec<&str> = world.genomes().map(|g| world.genome(g).name.as_str()).collect();
    writeln!(w, "{}", names.join("\t")).map_err(|e| wrap_write(path, e))
}

/// The half-open interval a run occupies in one genome, taken as the min
/// start / max end over the run's clique anchors present in that genome.
fn run_span(world: &World, run: RunId, genome: GenomeId) -> Option<(ChromId, u64, u64, Strand)> {
    let anchors: Vec<_> = world
        .run(run)
        .cliques()
        .iter()
        .filter_map(|&c| world.clique(c).anchor(genome))
        .collect();
    let first = *anchors.first()?;
    let chrom = world.anchor(first).chrom();
    let start = anchors.iter().map(|&a| world.anchor(a).start).min()?;
    let end = anchors.iter().map(|&a| world.anchor(a).end).max()?;
    Some((chrom, start, end, world.anchor(first).strand))
}

pub fn write_coverage(world: &World, genome: GenomeId, path: &Path) -> Result<(), IoError> {
    let mut w = create(path)?;

    let mut total_length = 0u64;
    let mut total_covered = 0u64;

    for &chrom in world.genome(genome).chroms() {
        let length = world.chrom(chrom).length;
        // Runs are colinear and non-overlapping by construction, but merge
        // before summing rather than assume it, so a stray overlap is
        // counted once instead of double-counted.
        let mut spans: Vec<std::ops::Range<u64>> = world
            .all_runs()
            .filter_map(|r| run_span(world, r, genome))
            .filter(|&(c, ..)| c == chrom)
            .map(|(_, start, end, _)| start..end)
            .collect();
        spans.sort_by_key(|s| s.start);
        let mut merged: Vec<std::ops::Range<u64>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if last.overlaps(&span) || last.end == span.start => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }
        let covered: u64 = merged.iter().map(RangeLen::range_len).sum();
        let pct = if length == 0 {
            0.0
        } else {
            100.0 * covered as f64 / length as f64
        };
        writeln!(
            w,
            "{}\t{}\t{}\t{:.2}",
            world.chrom(chrom).name, length, covered, pct
        )
        .map_err(|e| wrap_write(path, e))?;
        total_length += length;
        total_covered += covered;
    }

    let total_pct = if total_length == 0 {
        0.0
    } else {
        100.0 * total_covered as f64 / total_length as f64
    };
    writeln!(w, "TOTAL\t{total_length}\t{total_covered}\t{total_pct:.2}")
        .map_err(|e| wrap_write(path, e))
}

/// `runs`: one line per clique (tab-separated anchor names, `NA` where
/// absent), each run terminated by a trailing all-`NA` record separator.
pub fn write_runs(world: &World, path: &Path) -> Result<(), IoError> {
    let mut w = create(path)?;
    let n = world.num_genomes();
    let mut runs: Vec<RunId> = world.all_runs().collect();
    runs.sort_by_key(|&r| world.run(r).number().unwrap_or(u32::MAX));

    for run in runs {
        for &clique in world.run(run).cliques() {
            let fields: Vec<String> = (0..n)
                .map(|i| {
                    world
                        .clique(clique)
                        .anchor(GenomeId::new(i))
                        .map(|a| world.anchor(a).name.clone())
                        .unwrap_or_else(|| "NA".to_string())
                })
                .collect();
            writeln!(w, "{}", fields.join("\t")).map_err(|e| wrap_write(path, e))?;
        }
        let na_line: Vec<&str> = std::iter::repeat("NA").take(n).collect();
        writeln!(w, "{}", na_line.join("\t")).map_err(|e| wrap_write(path, e))?;
    }
    Ok(())
}

fn write_interval_map(
    world: &World,
    path: &Path,
    extend: bool,
) -> Result<(), IoError> {
    let mut w = create(path)?;
    let n = world.num_genomes();
    let mut runs: Vec<RunId> = world.all_runs().collect();
    runs.sort_by_key(|&r| world.run(r).number().unwrap_or(u32::MAX));

    for run in &runs {
        let mut fields = vec![world.run(*run).number().unwrap_or(0).to_string()];
        for i in 0..n {
            let genome = GenomeId::new(i);
            match run_span(world, *run, genome) {
                None => fields.push("NA\tNA\tNA\tNA".to_string()),
                Some((chrom, start, end, strand)) => {
                    let (start, end) = if extend {
                        extend_span(world, *run, genome, chrom, start, end, &runs)
                    } else {
                        (start, end)
                    };
                    fields.push(format!(
                        "{}\t{}\t{}\t{}",
                        world.chrom(chrom).name,
                        start,
                        end,
                        strand.as_char()
                    ));
                }
            }
        }
        writeln!(w, "{}", fields.join("\t")).map_err(|e| wrap_write(path, e))?;
    }
    Ok(())
}

/// Extends a run's interval in one genome to the midpoint between it and
/// its nearest chromosome-neighbor run (or +/-1000bp if none exists),
/// clamped to the chromosome's bounds (spec §6 `map` vs `pre.map`).
fn extend_span(
    world: &World,
    this_run: RunId,
    genome: GenomeId,
    chrom: ChromId,
    start: u64,
    end: u64,
    all_runs: &[RunId],
) -> (u64, u64) {
    const FALLBACK: u64 = 1000;
    let chrom_len = world.chrom(chrom).length;

    let mut others: Vec<(u64, u64)> = all_runs
        .iter()
        .filter(|&&r| r != this_run)
        .filter_map(|&r| run_span(world, r, genome))
        .filter(|&(c, ..)| c == chrom)
        .map(|(_, s, e, _)| (s, e))
        .collect();
    others.sort();

    let prev_end = others.iter().map(|&(_, e)| e).filter(|&e| e <= start).max();
    let next_start = others.iter().map(|&(s, _)| s).filter(|&s| s >= end).min();

    let new_start = match prev_end {
        Some(pe) => (pe + start) / 2,
        None => start.saturating_sub(FALLBACK),
    };
    let new_end = match next_start {
        Some(ns) => (end + ns) / 2,
        None => (end + FALLBACK).min(chrom_len),
    };
    (new_start.min(start), new_end.max(end).min(chrom_len))
}

pub fn write_pre_map(world: &World, path: &Path) -> Result<(), IoError> {
    write_interval_map(world, path, false)
}

pub fn write_map(world: &World, path: &Path) -> Result<(), IoError> {
    write_interval_map(world, path, true)
}

/// `pairwisehits`: every active edge internal to a clique, restated as
/// `runNum genome_g anchor_g genome_h anchor_h` for g < h (spec §6,
/// round-trips as `--pairwisehits` input).
pub fn write_pairwise_hits(world: &World, path: &Path) -> Result<(), IoError> {
    let mut w = create(path)?;
    let n = world.num_genomes();
    for run in world.all_runs() {
        let run_num = world.run(run).number().unwrap_or(0);
        for &clique in world.run(run).cliques() {
            for g in 0..n {
                for h in (g + 1)..n {
                    let (Some(a), Some(b)) = (
                        world.clique(clique).anchor(GenomeId::new(g)),
                        world.clique(clique).anchor(GenomeId::new(h)),
                    ) else {
                        continue;
                    };
                    let active = world
                        .anchor(a)
                        .best_edge(h)
                        .map(|e| world.edge(e).other(a) == b && world.edge(e).is_active())
                        .unwrap_or(false);
                    if active {
                        writeln!(
                            w,
                            "{run_num}\t{g}\t{}\t{h}\t{}",
                            world.anchor(a).name,
                            world.anchor(b).name
                        )
                        .map_err(|e| wrap_write(path, e))?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// AGP v1: one record per chromosome component. Non-assembled
/// chromosomes emit a single `D`-type record spanning the whole
/// chromosome; assembled chromosomes alternate `D`-type component
/// records with `N`-type gap records of `padding` length (spec §6,
/// `assembled.cc`).
pub fn write_agp(world: &World, genome: GenomeId, path: &Path) -> Result<(), IoError> {
    let mut w = create(path)?;
    for &chrom in world.genome(genome).chroms() {
        let c = world.chrom(chrom);
        let mut part = 1u32;
        let mut pos = 1u64;
        match &c.assembled {
            None => {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\tD\t{}\t1\t{}\t{}",
                    c.name,
                    pos,
                    c.length,
                    part,
                    c.name,
                    c.length,
                    if c.reversed { '-' } else { '+' }
                )
                .map_err(|e| wrap_write(path, e))?;
            }
            Some(assembled) => {
                for (i, comp) in assembled.components.iter().enumerate() {
                    let end = pos + comp.length - 1;
                    writeln!(
                        w,
                        "{}\t{}\t{}\t{}\tD\t{}\t1\t{}\t{}",
                        c.name,
                        pos,
                        end,
                        part,
                        comp.name,
                        comp.length,
                        if comp.reversed { '-' } else { '+' }
                    )
                    .map_err(|e| wrap_write(path, e))?;
                    pos = end + 1;
                    part += 1;

                    if i + 1 < assembled.components.len() {
                        let gap_end = pos + assembled.padding - 1;
                        writeln!(
                            w,
                            "{}\t{}\t{}\t{}\tN\t{}\tscaffold\tyes",
                            c.name, pos, gap_end, part, assembled.padding
                        )
                        .map_err(|e| wrap_write(path, e))?;
                        pos = gap_end + 1;
                        part += 1;
                    }
                }
            }
        }
    }
    Ok(())
}

/// `<genome>.anchors`: same tab-delimited shape as the input format, after
/// any coordinate shifting from draft-genome assembly.
pub fn write_anchors(world: &World, genome: GenomeId, path: &Path) -> Result<(), IoError> {
    let mut w = create(path)?;
    for &chrom in world.genome(genome).chroms() {
        for &a in &world.chrom(chrom).anchors {
            let anchor = world.anchor(a);
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                anchor.name,
                world.chrom(chrom).name,
                anchor.strand.as_char(),
                anchor.start,
                anchor.end,
                anchor.is_coding
            )
            .map_err(|e| wrap_write(path, e))?;
        }
    }
    Ok(())
}

/// `<genome>.mgr`: a signed run-number permutation per chromosome, one
/// `>genome` header followed by one line per chromosome, negated when
/// the run sits reverse-strand in this genome, terminated by `$ # name`.
pub fn write_mgr(world: &World, genome: GenomeId, path: &Path) -> Result<(), IoError> {
    let mut w = create(path)?;
    writeln!(w, ">{}", world.genome(genome).name).map_err(|e| wrap_write(path, e))?;

    for &chrom in world.genome(genome).chroms() {
        let mut entries: Vec<(u64, i64)> = world
            .all_runs()
            .filter_map(|r| {
                run_span(world, r, genome)
                    .filter(|&(c, ..)| c == chrom)
                    .map(|(_, start, _, strand)| {
                        let num = world.run(r).number().unwrap_or(0) as i64;
                        (start, if strand == Strand::Reverse { -num } else { num })
                    })
            })
            .collect();
        entries.sort_by_key(|&(start, _)| start);

        let fields: Vec<String> = entries.iter().map(|&(_, n)| n.to_string()).collect();
        writeln!(w, "{} $ # {}", fields.join(" "), world.chrom(chrom).name)
            .map_err(|e| wrap_write(path, e))?;
    }
    Ok(())
}

/// `--output-hits` debug dump: every active edge, one per line.
pub fn write_debug_hits(world: &World, path: &Path) -> Result<(), IoError> {
    let mut w = create(path)?;
    for edge in world.all_edges() {
        if !edge.is_active() {
            continue;
        }
        writeln!(
            w,
            "{}\t{}\t{}",
            world.anchor(edge.a).name,
            world.anchor(edge.b).name,
            edge.score
        )
        .map_err(|e| wrap_write(path, e))?;
    }
    Ok(())
}

/// `--output-runs` debug dump: same shape as `runs`, emitted at an
/// intermediate pipeline stage rather than after postprocessing.
pub fn write_debug_runs(world: &World, path: &Path) -> Result<(), IoError> {
    write_runs(world, path)
}
