// Circle sampler: the orbit walker that feeds the chord assembler.
//
// Seeds are placed at `point_count` evenly spaced angles on a circle of
// `radius` around `center`. From each seed the dynamical map is iterated up
// to `max_depth` times with `center` as the fixed parameter, and the iterates
// at the requested `record_depths` are kept as that seed's trajectory.
//
// Recorded samples come out in the order `record_depths` lists them, not in
// depth order: `[9, 2]` yields z₉ then z₂, and a repeated depth yields a
// repeated sample. This is how a caller controls chord voicing order.
//
// With an escape threshold set, a seed stops as soon as an iterate's
// magnitude exceeds it. The check runs after recording, so the escaping
// iterate itself is kept; deeper depths are simply missing and the
// trajectory is shorter.
//
// All parameter checks run in `CircleSampler::new`; iteration itself cannot
// fail. NaN/∞ produced by the map is passed through untouched.
//
// Seeds are independent of each other. `trajectories()` is the lazy, ordered,
// single-threaded stream; `collect_par()` computes all seeds with rayon and
// returns them in seed order.

use crate::complex::{ComplexValue, DynamicalMap, from_polar};
use crate::error::{MusicError, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::TAU;
use std::iter::FusedIterator;

/// Parameters for one sampling pass.
#[derive(Debug, Clone)]
pub struct SamplerConfig<M> {
    /// Number of seeds on the circle (> 0).
    pub point_count: u32,
    /// Circle center; also the fixed parameter of the recurrence.
    pub center: ComplexValue,
    /// Circle radius (> 0).
    pub radius: f64,
    /// Number of map iterations per seed (> 0).
    pub max_depth: u32,
    /// Depths to snapshot, each in `1..=max_depth`, in output order.
    pub record_depths: Vec<u32>,
    /// Stop a seed once `|z|` exceeds this (> 0).
    pub escape_threshold: Option<f64>,
    pub map: M,
}

impl<M> SamplerConfig<M> {
    pub fn new(
        point_count: u32,
        center: ComplexValue,
        radius: f64,
        max_depth: u32,
        record_depths: Vec<u32>,
        map: M,
    ) -> Self {
        SamplerConfig {
            point_count,
            center,
            radius,
            max_depth,
            record_depths,
            escape_threshold: None,
            map,
        }
    }

    pub fn with_escape_threshold(mut self, threshold: f64) -> Self {
        self.escape_threshold = Some(threshold);
        self
    }

    /// Check every parameter range.
    pub fn validate(&self) -> Result<()> {
        if self.point_count == 0 {
            return Err(MusicError::invalid("point_count must be at least 1"));
        }
        if self.max_depth == 0 {
            return Err(MusicError::invalid("max_depth must be at least 1"));
        }
        if self.radius <= 0.0 || !self.radius.is_finite() {
            return Err(MusicError::invalid(format!(
                "radius must be positive and finite, got {}",
                self.radius
            )));
        }
        if !self.center.is_finite() {
            return Err(MusicError::invalid("center must be finite"));
        }
        if let Some(&depth) = self
            .record_depths
            .iter()
            .find(|&&d| d == 0 || d > self.max_depth)
        {
            return Err(MusicError::invalid(format!(
                "record depth {depth} outside 1..={}",
                self.max_depth
            )));
        }
        if let Some(threshold) = self.escape_threshold.filter(|t| t.is_nan() || *t <= 0.0) {
            return Err(MusicError::invalid(format!(
                "escape_threshold must be positive, got {threshold}"
            )));
        }
        Ok(())
    }
}

/// Recorded iterates for one seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub seed_index: u32,
    pub samples: Vec<ComplexValue>,
}

impl Trajectory {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A validated sampler over a borrowed config.
#[derive(Debug)]
pub struct CircleSampler<'a, M> {
    config: &'a SamplerConfig<M>,
    /// `(depth, output slot)` pairs sorted by depth.
    slots: Vec<(u32, usize)>,
}

impl<M> Clone for CircleSampler<'_, M> {
    fn clone(&self) -> Self {
        CircleSampler {
            config: self.config,
            slots: self.slots.clone(),
        }
    }
}

impl<'a, M: DynamicalMap> CircleSampler<'a, M> {
    pub fn new(config: &'a SamplerConfig<M>) -> Result<Self> {
        config.validate()?;
        let mut slots: Vec<(u32, usize)> = config
            .record_depths
            .iter()
            .enumerate()
            .map(|(slot, &depth)| (depth, slot))
            .collect();
        slots.sort_unstable();
        Ok(CircleSampler { config, slots })
    }

    pub fn config(&self) -> &'a SamplerConfig<M> {
        self.config
    }

    /// Seed `i`: `center + radius·(cos θ, sin θ)` with `θ = 2π·i / point_count`.
    pub fn seed_point(&self, index: u32) -> ComplexValue {
        let theta = TAU * index as f64 / self.config.point_count as f64;
        self.config.center + from_polar(self.config.radius, theta)
    }

    /// The fixed recurrence parameter used for every seed.
    ///
    /// The circle center, not the seed: all seeds iterate the same map from
    /// different starting points.
    fn recurrence_parameter(&self, _seed: ComplexValue) -> ComplexValue {
        self.config.center
    }

    /// Iterate seed `index` and collect its recorded samples.
    pub fn trajectory(&self, index: u32) -> Trajectory {
        let seed = self.seed_point(index);
        let parameter = self.recurrence_parameter(seed);
        let mut snapshots: Vec<Option<ComplexValue>> = vec![None; self.slots.len()];
        let mut next_slot = 0;
        let mut z = seed;

        for depth in 1..=self.config.max_depth {
            if next_slot == self.slots.len() {
                break;
            }
            z = self.config.map.step(z, parameter);
            while let Some(&(slot_depth, slot)) = self.slots.get(next_slot) {
                if slot_depth != depth {
                    break;
                }
                snapshots[slot] = Some(z);
                next_slot += 1;
            }
            if self.config.escape_threshold.is_some_and(|t| z.norm() > t) {
                break;
            }
        }

        Trajectory {
            seed_index: index,
            samples: snapshots.into_iter().flatten().collect(),
        }
    }

    /// Lazy stream of all trajectories in seed order.
    pub fn trajectories(&self) -> Trajectories<'a, M> {
        Trajectories {
            sampler: self.clone(),
            next: 0,
        }
    }

    /// All trajectories, computed in parallel, returned in seed order.
    pub fn collect_par(&self) -> Vec<Trajectory>
    where
        M: Sync,
    {
        (0..self.config.point_count)
            .into_par_iter()
            .map(|i| self.trajectory(i))
            .collect()
    }
}

/// Iterator over a sampler's trajectories. Finite: yields exactly `point_count` items.
#[derive(Debug, Clone)]
pub struct Trajectories<'a, M> {
    sampler: CircleSampler<'a, M>,
    next: u32,
}

impl<M: DynamicalMap> Iterator for Trajectories<'_, M> {
    type Item = Trajectory;

    fn next(&mut self) -> Option<Trajectory> {
        if self.next >= self.sampler.config.point_count {
            return None;
        }
        let trajectory = self.sampler.trajectory(self.next);
        self.next += 1;
        Some(trajectory)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sampler.config.point_count.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl<M: DynamicalMap> ExactSizeIterator for Trajectories<'_, M> {}

impl<M: DynamicalMap> FusedIterator for Trajectories<'_, M> {}

/// Validate `config` and return the lazy trajectory stream.
pub fn sample<M: DynamicalMap>(config: &SamplerConfig<M>) -> Result<Trajectories<'_, M>> {
    Ok(CircleSampler::new(config)?.trajectories())
}

/// Validate `config` and compute every trajectory in parallel.
pub fn sample_par<M: DynamicalMap + Sync>(config: &SamplerConfig<M>) -> Result<Vec<Trajectory>> {
    Ok(CircleSampler::new(config)?.collect_par())
}
