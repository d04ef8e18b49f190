// Composition driver: runs every sampling pass a config describes and lays
// the resulting chords end to end on one part.
//
// Pass order is block, then record-depth set, then max depth, and within a
// pass trajectories come in seed order, so the same config always produces
// the same piece. Trajectories are computed in parallel per pass (rayon,
// order preserved). Trajectories that recorded nothing, which only happens
// with an escape threshold, are skipped instead of producing empty chords.

use crate::chord::ChordAssembler;
use crate::config::CompositionConfig;
use crate::error::Result;
use crate::part::Part;
use crate::sampler::sample_par;

/// Counters from one composition run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositionStats {
    pub passes: usize,
    pub trajectories: usize,
    pub chords: usize,
    pub notes: usize,
    /// Trajectories that recorded no samples.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct Composition {
    pub part: Part,
    pub stats: CompositionStats,
}

/// Generate the part described by `config`.
pub fn compose(config: &CompositionConfig) -> Result<Composition> {
    config.validate()?;

    let mut part = Part::with_instrument(config.part.channel, &config.part.instrument)?;
    part.volume = config.part.volume;
    let mut stats = CompositionStats::default();

    for (block_index, block) in config.blocks.iter().enumerate() {
        let scale = block.scale.scale();
        let assembler = ChordAssembler::new(&scale, config.scale_root, config.quantizer_params(block));

        for record_depths in &config.record_depth_sets {
            for &max_depth in &config.max_depths {
                let sampler = config.sampler_config(block, record_depths, max_depth);
                let chords_before = stats.chords;

                for trajectory in sample_par(&sampler)? {
                    stats.trajectories += 1;
                    let group = assembler.assemble(trajectory);
                    if group.is_empty() {
                        stats.skipped += 1;
                        continue;
                    }
                    stats.chords += 1;
                    stats.notes += group.len();
                    part.add_group(&group);
                }

                stats.passes += 1;
                tracing::debug!(
                    block = block_index,
                    map = %block.map,
                    ?record_depths,
                    max_depth,
                    chords = stats.chords - chords_before,
                    "sampling pass done"
                );
            }
        }
    }

    tracing::info!(
        passes = stats.passes,
        chords = stats.chords,
        notes = stats.notes,
        ticks = part.end_tick(),
        "composition complete"
    );
    Ok(Composition { part, stats })
}
