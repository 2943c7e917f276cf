//! Pure synteny/orthology map construction: anchors, edges, cliques and
//! runs, with no knowledge of file formats or the command line. See
//! `world::World` for the entry point.

pub mod anchor;
pub mod chromosome;
pub mod clique;
pub mod driver;
pub mod edge;
pub mod error;
pub mod filter;
pub mod genome;
pub mod id;
pub mod mask;
pub mod postprocess;
pub mod run;
pub mod world;

pub use anchor::{Anchor, Strand};
pub use chromosome::{Assembled, AssembledComponent, Chromosome};
pub use clique::Clique;
pub use driver::Config;
pub use edge::Edge;
pub use error::CoreError;
pub use genome::Genome;
pub use id::{AnchorId, ChromId, CliqueId, EdgeId, GenomeId, RunId};
pub use mask::{GenomeMask, MAX_GENOMES};
pub use run::Run;
pub use world::World;
