use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutProfile {
    #[default]
    Structural,
    Compact,
}

impl LayoutProfile {
    pub fn label(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Compact => "compact",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Substring,
    Fuzzy,
}

impl SearchMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Fuzzy => "fuzzy",
        }
    }
}

/// `clamp(offset + log2(1 + degree) * scale, floor, cap)`
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeSizing {
    pub offset: f32,
    pub scale: f32,
    pub floor: f32,
    pub cap: f32,
}

impl NodeSizing {
    pub fn size_for(self, degree: usize) -> f32 {
        let raw = self.offset + (1.0 + degree as f32).log2() * self.scale;
        raw.max(self.floor).min(self.cap.max(self.floor))
    }
}

impl Default for NodeSizing {
    fn default() -> Self {
        Self {
            offset: 0.3,
            scale: 0.75,
            floor: 0.8,
            cap: 4.0,
        }
    }
}

/// `max(floor, log2(1 + weight) * scale)`
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeSizing {
    pub floor: f32,
    pub scale: f32,
}

impl EdgeSizing {
    pub fn size_for(self, weight: f32) -> f32 {
        ((1.0 + weight.max(0.0)).log2() * self.scale).max(self.floor)
    }
}

impl Default for EdgeSizing {
    fn default() -> Self {
        Self {
            floor: 0.1,
            scale: 0.4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IterationPolicy {
    pub per_node: usize,
    pub min: usize,
    pub max: usize,
}

impl IterationPolicy {
    pub fn iterations_for(self, order: usize) -> usize {
        order
            .saturating_mul(self.per_node)
            .clamp(self.min, self.max.max(self.min))
    }
}

impl Default for IterationPolicy {
    fn default() -> Self {
        Self {
            per_node: 3,
            min: 600,
            max: 1500,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForceConfig {
    pub iterations: IterationPolicy,
    pub lin_log: bool,
    pub gravity: f32,
    pub scaling_ratio: f32,
    pub edge_weight_influence: f32,
    pub outbound_attraction_distribution: bool,
    pub adjust_sizes: bool,
    pub barnes_hut: bool,
    pub barnes_hut_theta: f32,
    pub slow_down: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            iterations: IterationPolicy::default(),
            lin_log: true,
            gravity: 1e-11,
            scaling_ratio: 900.0,
            edge_weight_influence: 0.1,
            outbound_attraction_distribution: true,
            adjust_sizes: true,
            barnes_hut: true,
            barnes_hut_theta: 0.5,
            slow_down: 12.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlapConfig {
    pub enabled: bool,
    pub margin: f32,
    pub ratio: f32,
    pub speed: f32,
    pub max_iterations: usize,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            margin: 3.5,
            ratio: 1.2,
            speed: 3.0,
            max_iterations: 350,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub padding: f32,
    pub resize_debounce_ms: u64,
}

impl ViewportConfig {
    pub fn debounce(self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            padding: 0.85,
            resize_debounce_ms: 150,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ThresholdConfig {
    pub fn clamp(self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default.clamp(self.min, self.max.max(self.min));
        }
        value.clamp(self.min, self.max.max(self.min))
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            default: 1.0,
            min: 1.0,
            max: 20.0,
            step: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub profile: LayoutProfile,
    pub top_k: usize,
    pub seed: u64,
    pub initial_radius: f32,
    pub node_sizing: NodeSizing,
    pub edge_sizing: EdgeSizing,
    pub force: ForceConfig,
    pub overlap: OverlapConfig,
    pub viewport: ViewportConfig,
    pub threshold: ThresholdConfig,
    pub search: SearchMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_profile(LayoutProfile::Structural)
    }
}

impl PipelineConfig {
    pub fn for_profile(profile: LayoutProfile) -> Self {
        let structural = Self {
            profile,
            top_k: 2,
            seed: 0x5eed_1e55,
            initial_radius: 5.0,
            node_sizing: NodeSizing::default(),
            edge_sizing: EdgeSizing::default(),
            force: ForceConfig::default(),
            overlap: OverlapConfig::default(),
            viewport: ViewportConfig::default(),
            threshold: ThresholdConfig::default(),
            search: SearchMode::default(),
        };

        match profile {
            LayoutProfile::Structural => structural,
            LayoutProfile::Compact => Self {
                node_sizing: NodeSizing {
                    offset: 0.5,
                    scale: 1.2,
                    floor: 0.5,
                    cap: 12.0,
                },
                edge_sizing: EdgeSizing {
                    floor: 1.0,
                    scale: 1.0,
                },
                force: ForceConfig {
                    iterations: IterationPolicy {
                        per_node: 0,
                        min: 400,
                        max: 400,
                    },
                    lin_log: false,
                    gravity: 0.3,
                    scaling_ratio: 50.0,
                    edge_weight_influence: 1.0,
                    outbound_attraction_distribution: false,
                    adjust_sizes: true,
                    barnes_hut: true,
                    barnes_hut_theta: 0.6,
                    slow_down: 10.0,
                },
                overlap: OverlapConfig {
                    enabled: false,
                    ..OverlapConfig::default()
                },
                ..structural
            },
        }
    }

    /// Reads a JSON config file. Missing fields fall back to `profile` when
    /// given, else to the profile named in the file, else to the structural
    /// profile.
    pub fn from_path(path: &Path, profile: Option<LayoutProfile>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&raw, profile)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(raw: &str, profile: Option<LayoutProfile>) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(raw).context("config is not JSON")?;
        let profile = match (profile, value.get("profile")) {
            (Some(profile), _) => profile,
            (None, Some(named)) => LayoutProfile::deserialize(named).context("unknown profile")?,
            (None, None) => LayoutProfile::default(),
        };
        if let Some(object) = value.as_object_mut() {
            object.remove("profile");
        }

        let mut merged = serde_json::to_value(Self::for_profile(profile))
            .context("failed to expand profile defaults")?;
        merge_json(&mut merged, value);
        PipelineConfig::deserialize(merged).context("config does not match the expected shape")
    }
}

fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
