//! Readers for the four input formats: `.chroms`, `.anchors`, `.hits` and
//! the alternative `--pairwisehits` file (spec §6). Each builds directly
//! against a `mercator_core::World`; malformed individual lines are
//! logged and skipped rather than aborting the whole file (spec §7).

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use mercator_core::{anchor::Strand, id::GenomeId, world::World};

use crate::error::IoError;

fn open(path: &Path) -> Result<BufReader<File>, IoError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IoError::Read {
            path: path.display().to_string(),
            source,
        })
}

/// Loads `name length` lines into new chromosomes for `genome`.
pub fn load_chroms(world: &mut World, genome: GenomeId, path: &Path) -> Result<(), IoError> {
    let reader = open(path)?;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IoError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(name), Some(length)) = (fields.next(), fields.next()) else {
            return Err(IoError::Malformed {
                path: path.display().to_string(),
                line: lineno + 1,
                message: format!("expected 'name length', got {line:?}"),
            });
        };
        let length: u64 = length.parse().map_err(|_| IoError::Malformed {
            path: path.display().to_string(),
            line: lineno + 1,
            message: format!("invalid chromosome length {length:?}"),
        })?;
        world.add_chromosome(genome, name.to_owned(), length);
    }
    Ok(())
}

/// Loads six-field tab-delimited `name chrom strand start end isCoding`
/// anchor lines. A line naming a chromosome absent from `genome` is
/// logged and skipped (spec §7).
pub fn load_anchors(world: &mut World, genome: GenomeId, path: &Path) -> Result<(), IoError> {
    let reader = open(path)?;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IoError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let [name, chrom, strand, start, end, is_coding] = fields[..] else {
            return Err(IoError::Malformed {
                path: path.display().to_string(),
                line: lineno + 1,
                message: format!("expected 6 tab-separated fields, got {}", fields.len()),
            });
        };

        let Some(chrom_id) = world.genome(genome).chrom_named(chrom) else {
            log::warn!(
                "{}:{}: unknown chromosome {chrom:?}, skipping anchor {name:?}",
                path.display(),
                lineno + 1
            );
            continue;
        };
        let Some(strand) = Strand::from_char(strand.chars().next().unwrap_or('?')) else {
            return Err(IoError::Malformed {
                path: path.display().to_string(),
                line: lineno + 1,
                message: format!("invalid strand {strand:?}"),
            });
        };
        let start: u64 = start.parse().map_err(|_| IoError::Malformed {
            path: path.display().to_string(),
            line: lineno + 1,
            message: format!("invalid start {start:?}"),
        })?;
        let end: u64 = end.parse().map_err(|_| IoError::Malformed {
            path: path.display().to_string(),
            line: lineno + 1,
            message: format!("invalid end {end:?}"),
        })?;
        let is_coding: u64 = is_coding.parse().map_err(|_| IoError::Malformed {
            path: path.display().to_string(),
            line: lineno + 1,
            message: format!("invalid isCoding {is_coding:?}"),
        })?;

        world.add_anchor(chrom_id, name.to_owned(), strand, start, end, is_coding);
    }
    Ok(())
}

/// Loads a `name1 name2 score evalue` hits file between `genome_a` and
/// `genome_b`, dropping hits above `max_eval` and warning on names absent
/// from either genome (spec §6, §7, T7). Hits are buffered and added in
/// non-increasing score order so that each endpoint's per-genome edge
/// vector ends up sorted "by construction" (spec §4.2); the file itself
/// makes no ordering guarantee.
pub fn load_hits(
    world: &mut World,
    genome_a: GenomeId,
    genome_b: GenomeId,
    path: &Path,
    max_eval: f64,
) -> Result<(), IoError> {
    let reader = open(path)?;
    let mut pending = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IoError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let [name1, name2, score, evalue] = fields[..] else {
            return Err(IoError::Malformed {
                path: path.display().to_string(),
                line: lineno + 1,
                message: format!("expected 4 tab-separated fields, got {}", fields.len()),
            });
        };

        let evalue: f64 = evalue.parse().map_err(|_| IoError::Malformed {
            path: path.display().to_string(),
            line: lineno + 1,
            message: format!("invalid evalue {evalue:?}"),
        })?;
        if evalue > max_eval {
            continue;
        }
        let score: i64 = score.parse().map_err(|_| IoError::Malformed {
            path: path.display().to_string(),
            line: lineno + 1,
            message: format!("invalid score {score:?}"),
        })?;

        let a = world.genome(genome_a).anchor_named(name1);
        let b = world.genome(genome_b).anchor_named(name2);
        match (a, b) {
            (Some(a), Some(b)) => pending.push((a, b, score)),
            _ => log::warn!(
                "{}:{}: hit references unknown anchor ({name1:?}, {name2:?}), skipping",
                path.display(),
                lineno + 1
            ),
        }
    }
    pending.sort_by_key(|&(_, _, score)| std::cmp::Reverse(score));
    for (a, b, score) in pending {
        world.add_edge(a, b, score);
    }
    Ok(())
}

/// Loads an alternative `--pairwisehits` file: `segNum g1 name1 g2 name2`
/// lines, score treated as a constant 1 (spec §6). `genomes_by_name` maps
/// genome name to the `GenomeId` already registered in `world`.
pub fn load_pairwise_hits(
    world: &mut World,
    genomes_by_name: &HashMap<String, GenomeId>,
    path: &Path,
) -> Result<(), IoError> {
    let reader = open(path)?;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IoError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [_seg_num, g1, name1, g2, name2] = fields[..] else {
            return Err(IoError::Malformed {
                path: path.display().to_string(),
                line: lineno + 1,
                message: format!("expected 5 fields, got {}", fields.len()),
            });
        };

        let (Some(&g1_id), Some(&g2_id)) =
            (genomes_by_name.get(g1), genomes_by_name.get(g2))
        else {
            log::warn!(
                "{}:{}: unknown genome in pairwise hits ({g1:?}, {g2:?}), skipping",
                path.display(),
                lineno + 1
            );
            continue;
        };
        let a = world.genome(g1_id).anchor_named(name1);
        let b = world.genome(g2_id).anchor_named(name2);
        match (a, b) {
            (Some(a), Some(b)) => world.add_edge(a, b, 1),
            _ => log::warn!(
                "{}:{}: pairwise hit references unknown anchor ({name1:?}, {name2:?}), skipping",
                path.display(),
                lineno + 1
            ),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn chroms_and_anchors_round_trip_into_world() {
        let mut world = World::new(2).unwrap();
        let genome = world.add_genome("A".into(), false);

        let chroms = write_tmp("c 1000\n");
        load_chroms(&mut world, genome, chroms.path()).unwrap();

        let anchors = write_tmp("a0\tc\t+\t0\t10\t0\n");
        load_anchors(&mut world, genome, anchors.path()).unwrap();

        assert_eq!(world.genome(genome).chroms().len(), 1);
        assert!(world.genome(genome).anchor_named("a0").is_some());
    }

    #[test]
    fn hits_skip_unknown_anchor_with_warning_not_error() {
        let mut world = World::new(2).unwrap();
        let ga = world.add_genome("A".into(), false);
        let gb = world.add_genome("B".into(), false);
        let ca = world.add_chromosome(ga, "c".into(), 1000);
        world.add_anchor(ca, "a0".into(), Strand::Forward, 0, 10, 0);

        let hits = write_tmp("a0\tghost\t100\t0.0\n");
        let result = load_hits(&mut world, ga, gb, hits.path(), 1.0);
        assert!(result.is_ok());
    }

    #[test]
    fn hits_above_max_eval_are_dropped() {
        let mut world = World::new(2).unwrap();
        let ga = world.add_genome("A".into(), false);
        let gb = world.add_genome("B".into(), false);
        let ca = world.add_chromosome(ga, "c".into(), 1000);
        let cb = world.add_chromosome(gb, "c".into(), 1000);
        let a0 = world.add_anchor(ca, "a0".into(), Strand::Forward, 0, 10, 0);
        let _b0 = world.add_anchor(cb, "b0".into(), Strand::Forward, 0, 10, 0);

        let hits = write_tmp("a0\tb0\t100\t2.0\n");
        load_hits(&mut world, ga, gb, hits.path(), 1.0).unwrap();

        assert_eq!(world.anchor(a0).num_edges(gb.index()), 0);
    }
}
