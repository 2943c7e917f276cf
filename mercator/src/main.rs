mod cli;

use std::collections::HashMap;

use clap::Parser;
use mercator_core::{driver::Config, id::GenomeId, world::World};
use mercator_io::{loaders, writers};

use cli::{AppError, Args};

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.quiet {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let (world, genome_ids) = load_world(&args)?;
    let mut world = world;

    let cfg = Config {
        repeat_num: args.repeat_num,
        repeat_pct: args.repeat_pct,
        prune_pct: args.prune_pct,
        min_run_length: args.min_run_length,
        strict_join: true,
        join_distance: args.join_distance,
        padding: args.padding,
    };

    if args.output_hits {
        writers::write_debug_hits(&world, &args.outdir.join("hits.debug"))?;
    }

    match &args.pairwisehits {
        Some(path) => {
            let names_by_genome: HashMap<String, GenomeId> = genome_ids
                .iter()
                .map(|&(ref name, id)| (name.clone(), id))
                .collect();
            loaders::load_pairwise_hits(&mut world, &names_by_genome, path)?;
            world.join_pairwise_maps(&cfg);
        }
        None => {
            world.make_map(&cfg);
        }
    }

    if args.output_runs {
        writers::write_debug_runs(&world, &args.outdir.join("runs.debug"))?;
    }

    write_outputs(&world, &genome_ids, &args)?;

    log::info!("wrote {} runs", world.all_runs().count());
    Ok(())
}

/// Builds the `World` from `--indir`'s `.chroms`/`.anchors`/`.hits` files,
/// ordering genomes non-draft-first per `--draft` (spec §4.7).
fn load_world(args: &Args) -> Result<(World, Vec<(String, GenomeId)>), AppError> {
    let mut ordered: Vec<&String> = args
        .genomes
        .iter()
        .filter(|g| !args.draft_genomes.contains(g))
        .collect();
    ordered.extend(args.genomes.iter().filter(|g| args.draft_genomes.contains(g)));

    let mut world = World::new(ordered.len())?;
    let mut genome_ids = Vec::with_capacity(ordered.len());

    for name in &ordered {
        let is_draft = args.draft_genomes.contains(name);
        let id = world.add_genome((*name).clone(), is_draft);
        genome_ids.push(((*name).clone(), id));

        loaders::load_chroms(&mut world, id, &args.indir.join(format!("{name}.chroms")))?;
        loaders::load_anchors(&mut world, id, &args.indir.join(format!("{name}.anchors")))?;
    }

    world.sort_anchors();
    world.assign_genome_start_offsets();

    if args.pairwisehits.is_none() {
        for i in 0..genome_ids.len() {
            for j in (i + 1)..genome_ids.len() {
                let (name_a, id_a) = &genome_ids[i];
                let (name_b, id_b) = &genome_ids[j];
                let forward = args.indir.join(format!("{name_a}-{name_b}.hits"));
                let backward = args.indir.join(format!("{name_b}-{name_a}.hits"));
                let path = if forward.exists() {
                    Some(forward)
                } else if backward.exists() {
                    Some(backward)
                } else {
                    None
                };
                if let Some(path) = path {
                    loaders::load_hits(&mut world, *id_a, *id_b, &path, args.max_eval)?;
                }
            }
        }
    }

    Ok((world, genome_ids))
}

fn write_outputs(
    world: &World,
    genome_ids: &[(String, GenomeId)],
    args: &Args,
) -> Result<(), AppError> {
    std::fs::create_dir_all(&args.outdir).map_err(|e| {
        AppError::Config(format!("failed to create {}: {e}", args.outdir.display()))
    })?;

    writers::write_genomes(world, &args.outdir.join("genomes"))?;
    writers::write_runs(world, &args.outdir.join("runs"))?;
    writers::write_pre_map(world, &args.outdir.join("pre.map"))?;
    writers::write_map(world, &args.outdir.join("map"))?;
    writers::write_pairwise_hits(world, &args.outdir.join("pairwisehits"))?;

    for &(ref name, id) in genome_ids {
        writers::write_coverage(world, id, &args.outdir.join(format!("{name}.coverage")))?;
        writers::write_agp(world, id, &args.outdir.join(format!("{name}.agp")))?;
        writers::write_anchors(world, id, &args.outdir.join(format!("{name}.anchors")))?;
        writers::write_mgr(world, id, &args.outdir.join(format!("{name}.mgr")))?;
    }

    println!("genomes: {}", genome_ids.len());
    for &(ref name, id) in genome_ids {
        println!("  {name}: {} chromosomes", world.genome(id).chroms().len());
    }
    println!("runs: {}", world.all_runs().count());

    Ok(())
}
