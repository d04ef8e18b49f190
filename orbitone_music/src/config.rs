// Composition configuration.
//
// A composition is a list of blocks run through the same outer loops: every
// block is sampled once per record-depth set per max depth, and each
// trajectory becomes one chord on a single part. A block fixes the scale,
// the number of phase sectors, the number of seed points, the circle radius
// and the dynamical map. Everything shared across blocks (center, root,
// magnitude bounds, tempo, instrument) lives at the top level.
//
// `CompositionConfig` is loaded from JSON. Missing top-level fields take the
// values of the `complex1` preset, which is also the `Default`. Two presets
// are built in: `complex1` (natural minor and the octatonic scale on E, slow
// piano) and `edge_rock` (three Messiaen modes on C#, a wider circle and
// deeper orbits).
//
// `validate()` checks every range up front, including building each
// sampler configuration the loops will use, so a config that validates
// composes without error.

use crate::complex::{ComplexValue, StandardMap};
use crate::error::{MusicError, Result};
use crate::midi::{MAX_TEMPO_BPM, MIN_TEMPO_BPM};
use crate::part::gm_program;
use crate::quantize::{DEFAULT_OLD_MAX, QuantizerParams};
use crate::sampler::SamplerConfig;
use crate::scale::Scale;
use crate::scales::ScaleName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Where a block's pitches come from: a named table or an explicit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleSpec {
    Named(ScaleName),
    Pitches(Scale),
}

impl ScaleSpec {
    pub fn scale(&self) -> Scale {
        match self {
            ScaleSpec::Named(name) => name.scale(),
            ScaleSpec::Pitches(scale) => scale.clone(),
        }
    }
}

impl From<ScaleName> for ScaleSpec {
    fn from(name: ScaleName) -> Self {
        ScaleSpec::Named(name)
    }
}

/// One block of material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub scale: ScaleSpec,
    /// Phase sectors per turn; a multiple of the scale length spans whole octaves.
    pub sector_base: u32,
    /// Seed points on the circle.
    pub point_count: u32,
    pub radius: f64,
    pub map: StandardMap,
}

impl BlockConfig {
    pub fn new(scale: impl Into<ScaleSpec>, sector_base: u32, point_count: u32, radius: f64, map: StandardMap) -> Self {
        BlockConfig {
            scale: scale.into(),
            sector_base,
            point_count,
            radius,
            map,
        }
    }
}

/// The part every chord is written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartConfig {
    /// MIDI channel, 0–15.
    pub channel: u8,
    /// General MIDI instrument name or program number.
    pub instrument: String,
    /// Channel volume sent before the first note.
    #[serde(default)]
    pub volume: Option<u8>,
}

impl Default for PartConfig {
    fn default() -> Self {
        PartConfig {
            channel: 0,
            instrument: "piano".to_string(),
            volume: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    pub tempo_bpm: u32,
    /// Center of every sampling circle, also the fixed map parameter.
    pub center: ComplexValue,
    /// MIDI pitch the scales are transposed to.
    pub scale_root: i32,
    /// Depth sets to record, one sampling pass each.
    pub record_depth_sets: Vec<Vec<u32>>,
    /// Maximum iteration depths, one sampling pass each.
    pub max_depths: Vec<u32>,
    /// Stop an orbit once its magnitude exceeds this.
    pub escape_threshold: Option<f64>,
    /// Upper bound of the magnitude domain for durations.
    pub old_max: f64,
    /// Upper bound of the intermediate duration range.
    pub new_max: f64,
    pub part: PartConfig,
    pub blocks: Vec<BlockConfig>,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Preset::Complex1.config()
    }
}

impl CompositionConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: CompositionConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn quantizer_params(&self, block: &BlockConfig) -> QuantizerParams {
        QuantizerParams {
            sector_base: block.sector_base,
            old_max: self.old_max,
            new_max: self.new_max,
        }
    }

    /// Sampler settings for one pass over `block`.
    pub fn sampler_config(&self, block: &BlockConfig, record_depths: &[u32], max_depth: u32) -> SamplerConfig<StandardMap> {
        let config = SamplerConfig::new(
            block.point_count,
            self.center,
            block.radius,
            max_depth,
            record_depths.to_vec(),
            block.map,
        );
        match self.escape_threshold {
            Some(threshold) => config.with_escape_threshold(threshold),
            None => config,
        }
    }

    /// Number of sampling passes the config describes.
    pub fn pass_count(&self) -> usize {
        self.blocks.len() * self.record_depth_sets.len() * self.max_depths.len()
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&self.tempo_bpm) {
            return Err(MusicError::invalid(format!(
                "tempo_bpm {} outside {MIN_TEMPO_BPM}..={MAX_TEMPO_BPM}",
                self.tempo_bpm
            )));
        }
        if self.blocks.is_empty() {
            return Err(MusicError::invalid("no blocks"));
        }
        if self.record_depth_sets.is_empty() || self.record_depth_sets.iter().any(Vec::is_empty) {
            return Err(MusicError::invalid("record_depth_sets must hold non-empty depth lists"));
        }
        if self.max_depths.is_empty() {
            return Err(MusicError::invalid("max_depths is empty"));
        }
        for (name, value) in [("old_max", self.old_max), ("new_max", self.new_max)] {
            if value <= 0.0 || !value.is_finite() {
                return Err(MusicError::invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if self.part.channel > 15 {
            return Err(MusicError::invalid(format!("channel {} outside 0..=15", self.part.channel)));
        }
        if gm_program(&self.part.instrument).is_none() {
            return Err(MusicError::invalid(format!("unknown instrument '{}'", self.part.instrument)));
        }
        if let Some(volume) = self.part.volume.filter(|&v| v > 127) {
            return Err(MusicError::invalid(format!("volume {volume} outside 0..=127")));
        }

        for (i, block) in self.blocks.iter().enumerate() {
            if block.sector_base == 0 {
                return Err(MusicError::invalid(format!("block {i}: sector_base must be at least 1")));
            }
            for record_depths in &self.record_depth_sets {
                for &max_depth in &self.max_depths {
                    self.sampler_config(block, record_depths, max_depth)
                        .validate()
                        .map_err(|e| match e {
                            MusicError::InvalidConfig(msg) => MusicError::invalid(format!("block {i}: {msg}")),
                            other => other,
                        })?;
                }
            }
        }
        Ok(())
    }
}

/// The built-in compositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Complex1,
    EdgeRock,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Complex1, Preset::EdgeRock];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Complex1 => "complex1",
            Preset::EdgeRock => "edge_rock",
        }
    }

    pub fn config(self) -> CompositionConfig {
        use StandardMap::{Quadratic, ReciprocalQuadratic};
        match self {
            Preset::Complex1 => CompositionConfig {
                tempo_bpm: 75,
                center: ComplexValue::new(0.0, 0.0),
                scale_root: 40,
                record_depth_sets: vec![vec![4], vec![5, 7], vec![2, 9]],
                max_depths: vec![10, 20],
                escape_threshold: None,
                old_max: 3.5,
                new_max: 16.0,
                part: PartConfig::default(),
                blocks: vec![
                    BlockConfig::new(ScaleName::NaturalMinor, 21, 12, 0.7885, ReciprocalQuadratic),
                    BlockConfig::new(ScaleName::NaturalMinor, 24, 24, 0.7885, Quadratic),
                    BlockConfig::new(ScaleName::MessiaenMode2, 21, 12, 0.7885, ReciprocalQuadratic),
                ],
            },
            Preset::EdgeRock => CompositionConfig {
                tempo_bpm: 83,
                center: ComplexValue::new(0.0, 0.0),
                scale_root: 37,
                record_depth_sets: vec![vec![4], vec![5, 7], vec![2, 9]],
                max_depths: vec![10, 50],
                escape_threshold: None,
                old_max: DEFAULT_OLD_MAX,
                new_max: 16.0,
                part: PartConfig {
                    volume: Some(100),
                    ..PartConfig::default()
                },
                blocks: vec![
                    BlockConfig::new(ScaleName::MessiaenMode2, 22, 12, 0.83, ReciprocalQuadratic),
                    BlockConfig::new(ScaleName::MessiaenMode4, 24, 20, 0.83, Quadratic),
                    BlockConfig::new(ScaleName::MessiaenMode6, 24, 12, 0.83, ReciprocalQuadratic),
                ],
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| MusicError::invalid(format!("unknown preset '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for preset in Preset::ALL {
            preset.config().validate().unwrap();
        }
    }

    #[test]
    fn test_default_is_complex1() {
        assert_eq!(CompositionConfig::default(), Preset::Complex1.config());
        assert_eq!(CompositionConfig::default().pass_count(), 18);
    }

    #[test]
    fn test_config_serializes() {
        let config = Preset::EdgeRock.config();
        let json = config.to_json_pretty().unwrap();
        let restored: CompositionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "tempo_bpm": 120,
            "scale_root": 48,
            "blocks": [
                { "scale": "major", "sector_base": 14, "point_count": 8, "radius": 0.5, "map": "quadratic" },
                { "scale": [0, 3, 7], "sector_base": 6, "point_count": 4, "radius": 0.6, "map": "reciprocal_quadratic" }
            ]
        }"#;
        let config: CompositionConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.tempo_bpm, 120);
        assert_eq!(config.max_depths, vec![10, 20]);
        assert_eq!(config.blocks[0].scale, ScaleSpec::Named(ScaleName::Major));
        assert_eq!(config.blocks[1].scale.scale().pitches(), &[0, 3, 7]);
        assert_eq!(config.blocks[1].map, StandardMap::ReciprocalQuadratic);
    }

    #[test]
    fn test_empty_scale_rejected_on_load() {
        let json = r#"{ "blocks": [
            { "scale": [], "sector_base": 6, "point_count": 4, "radius": 0.6, "map": "quadratic" }
        ] }"#;
        assert!(serde_json::from_str::<CompositionConfig>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = Preset::Complex1.config();

        let mut config = base.clone();
        config.tempo_bpm = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.blocks.clear();
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.record_depth_sets.push(vec![]);
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.max_depths = vec![5];
        // depth 9 cannot be recorded within 5 iterations
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.blocks[1].radius = -1.0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.blocks[0].sector_base = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.part.instrument = "kazoo".to_string();
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.new_max = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = base;
        config.escape_threshold = Some(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("complex1".parse::<Preset>().unwrap(), Preset::Complex1);
        assert_eq!("Edge-Rock".parse::<Preset>().unwrap(), Preset::EdgeRock);
        assert!("sonata".parse::<Preset>().is_err());
    }

    #[test]
    fn test_sampler_config_carries_escape_threshold() {
        let mut config = Preset::Complex1.config();
        config.escape_threshold = Some(4.0);
        let sampler = config.sampler_config(&config.blocks[0], &[2, 9], 10);
        assert_eq!(sampler.escape_threshold, Some(4.0));
        assert_eq!(sampler.record_depths, vec![2, 9]);
        assert_eq!(sampler.point_count, 12);
    }
}
