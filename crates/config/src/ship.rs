use serde::{Deserialize, Serialize};

use crate::{ConfigError, ensure, non_negative, positive};

/// Initial displacement and length estimates from the deadweight target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRegression {
    pub length_intercept_m: f64,
    pub length_coefficient: f64,
    pub length_divisor: f64,
    /// Typical deadweight/displacement ratio for the type.
    pub deadweight_ratio: f64,
}

/// Which load-line freeboard table governs the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeboardType {
    /// Liquid cargo ships.
    TypeA,
    /// All other ships.
    TypeB,
}

/// Principal proportion regressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proportions {
    pub lb_intercept: f64,
    pub lb_slope: f64,
    pub lb_reference_length_m: f64,
    pub lb_break_length_m: f64,
    pub lb_high: f64,
    pub length_depth_ratio: f64,
    pub draft_depth_ratio: f64,
    pub freeboard: FreeboardType,
}

/// Linear block coefficient regression on Froude number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockCoefficientRegression {
    pub intercept: f64,
    pub froude_slope: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightCoefficients {
    pub steel_k1: f64,
    pub outfit_k2_intercept: f64,
    pub outfit_k2_length_slope: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeCoefficients {
    /// Hold volume per tonne of deadweight cargo.
    pub stowage_factor_m3_per_t: f64,
    /// Share of the container-stowage box volume taken by cargo holds.
    pub teu_hold_fraction: f64,
    /// Share of moulded volume lost to machinery, ballast and accommodation.
    pub non_cargo_fraction: f64,
    /// Height of superstructure and deck cargo above the main deck (m).
    pub superstructure_height_m: f64,
}

fn full_capacity() -> f64 {
    1.0
}

/// EEDI reference line `a · capacity^(-c)` and phase reduction `b`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EediReference {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Share of deadweight counted as EEDI capacity.
    #[serde(default = "full_capacity")]
    pub capacity_fraction: f64,
}

/// CII reference line, annual reduction factor and rating boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiiReference {
    pub a: f64,
    pub c: f64,
    pub reduction: f64,
    pub boundaries: [f64; 4],
}

/// Bounds on the volume-driven expansion of depth and breadth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionLimits {
    pub max_depth_factor: f64,
    pub max_breadth_factor: f64,
}

/// Empirical hull-form and regulatory constants for one ship type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipConfig {
    pub key: String,
    pub name: String,
    pub seed: SeedRegression,
    pub proportions: Proportions,
    pub block_coefficient: BlockCoefficientRegression,
    pub weights: WeightCoefficients,
    pub volume: VolumeCoefficients,
    pub eedi: EediReference,
    pub cii: CiiReference,
    pub deadweight_range_t: [f64; 2],
    #[serde(default)]
    pub teu_range: Option<[f64; 2]>,
    pub expansion: ExpansionLimits,
}

impl ShipConfig {
    /// Length/breadth ratio for a given length: linear below the break length, constant above.
    pub fn length_breadth_ratio(&self, length_m: f64) -> f64 {
        let p = &self.proportions;
        if length_m <= p.lb_break_length_m {
            (p.lb_intercept + p.lb_slope * (length_m - p.lb_reference_length_m)).max(p.lb_intercept)
        } else {
            p.lb_high
        }
    }

    /// Block coefficient for a Froude number, clamped to the regression's validity band.
    pub fn block_coefficient(&self, froude: f64) -> f64 {
        let r = &self.block_coefficient;
        (r.intercept - r.froude_slope * froude).clamp(r.min, r.max)
    }

    /// Outfit weight coefficient K2 at a given length.
    pub fn outfit_k2(&self, length_m: f64) -> f64 {
        let w = &self.weights;
        (w.outfit_k2_intercept - w.outfit_k2_length_slope * length_m).max(0.05)
    }

    /// Initial displacement guess for a deadweight target.
    pub fn seed_displacement(&self, deadweight_t: f64) -> f64 {
        deadweight_t / self.seed.deadweight_ratio
    }

    /// Initial length guess for a deadweight target.
    pub fn seed_length(&self, deadweight_t: f64) -> f64 {
        let s = &self.seed;
        s.length_intercept_m + s.length_coefficient * (deadweight_t / s.length_divisor).cbrt()
    }

    pub fn supports_teu(&self) -> bool {
        self.teu_range.is_some()
    }

    pub fn accepts_deadweight(&self, deadweight_t: f64) -> bool {
        let [low, high] = self.deadweight_range_t;
        (low..=high).contains(&deadweight_t)
    }

    pub fn accepts_teu(&self, teu: f64) -> bool {
        self.teu_range
            .map(|[low, high]| (low..=high).contains(&teu))
            .unwrap_or(false)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.key.as_str();
        ensure(key, !key.is_empty(), "key must not be empty")?;
        let p = &self.proportions;
        ensure(
            key,
            positive(p.lb_intercept) && positive(p.lb_high) && non_negative(p.lb_slope),
            "length/breadth regression must be positive",
        )?;
        ensure(
            key,
            positive(p.length_depth_ratio),
            "length/depth ratio must be positive",
        )?;
        ensure(
            key,
            positive(p.draft_depth_ratio) && p.draft_depth_ratio < 1.0,
            "draft/depth ratio must lie in (0, 1)",
        )?;
        let cb = &self.block_coefficient;
        ensure(
            key,
            positive(cb.min) && cb.min < cb.max && cb.max < 1.0,
            "block coefficient bounds must satisfy 0 < min < max < 1",
        )?;
        ensure(
            key,
            positive(self.seed.deadweight_ratio) && self.seed.deadweight_ratio < 1.0,
            "seed deadweight ratio must lie in (0, 1)",
        )?;
        ensure(
            key,
            positive(self.seed.length_coefficient) && positive(self.seed.length_divisor),
            "seed length regression must be positive",
        )?;
        ensure(key, positive(self.weights.steel_k1), "steel K1 must be positive")?;
        let v = &self.volume;
        ensure(
            key,
            positive(v.stowage_factor_m3_per_t),
            "stowage factor must be positive",
        )?;
        ensure(
            key,
            non_negative(v.non_cargo_fraction) && v.non_cargo_fraction < 1.0,
            "non-cargo fraction must lie in [0, 1)",
        )?;
        ensure(
            key,
            non_negative(v.teu_hold_fraction) && v.teu_hold_fraction <= 1.0,
            "TEU hold fraction must lie in [0, 1]",
        )?;
        ensure(
            key,
            positive(self.eedi.a)
                && positive(self.eedi.c)
                && (0.0..1.0).contains(&self.eedi.b)
                && positive(self.eedi.capacity_fraction)
                && self.eedi.capacity_fraction <= 1.0,
            "EEDI reference parameters out of range",
        )?;
        ensure(
            key,
            positive(self.cii.a) && positive(self.cii.c) && (0.0..1.0).contains(&self.cii.reduction),
            "CII reference parameters out of range",
        )?;
        ensure(
            key,
            self.cii.boundaries.windows(2).all(|pair| pair[0] < pair[1])
                && positive(self.cii.boundaries[0]),
            "CII boundaries must be positive and ascending",
        )?;
        let [low, high] = self.deadweight_range_t;
        ensure(key, positive(low) && low < high, "deadweight range must be ascending")?;
        if let Some([low, high]) = self.teu_range {
            ensure(key, positive(low) && low < high, "TEU range must be ascending")?;
            ensure(
                key,
                positive(v.teu_hold_fraction),
                "TEU-capable types need a positive hold fraction",
            )?;
        }
        ensure(
            key,
            self.expansion.max_depth_factor >= 1.0 && self.expansion.max_breadth_factor >= 1.0,
            "expansion limits must be at least 1",
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::Registries;

    #[test]
    fn length_breadth_ratio_is_continuous_at_break() {
        let tanker = Registries::builtin().ships.get("tanker").expect("tanker");
        let below = tanker.length_breadth_ratio(129.999);
        let above = tanker.length_breadth_ratio(130.001);
        assert!((below - above).abs() < 1e-3, "{below} vs {above}");
    }

    #[test]
    fn block_coefficient_is_clamped() {
        let tanker = Registries::builtin().ships.get("tanker").expect("tanker");
        assert_eq!(tanker.block_coefficient(0.0), 0.87);
        assert_eq!(tanker.block_coefficient(0.6), 0.55);
        let mid = tanker.block_coefficient(0.16);
        assert!((mid - 0.824).abs() < 1e-9, "Cb = {mid}");
    }

    #[test]
    fn only_box_ships_accept_teu() {
        let ships = &Registries::builtin().ships;
        assert!(!ships.get("tanker").expect("tanker").supports_teu());
        assert!(!ships.get("bulk_carrier").expect("bulk").supports_teu());
        let container = ships.get("container").expect("container");
        assert!(container.accepts_teu(8_000.0));
        assert!(!container.accepts_teu(40_000.0));
    }

    #[test]
    fn outfit_coefficient_falls_with_length_for_tankers() {
        let tanker = Registries::builtin().ships.get("tanker").expect("tanker");
        assert!(tanker.outfit_k2(250.0) < tanker.outfit_k2(100.0));
        let container = Registries::builtin().ships.get("container").expect("container");
        assert_eq!(container.outfit_k2(100.0), container.outfit_k2(300.0));
    }
}
