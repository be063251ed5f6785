//! Minimum tabular freeboard after the 1966 Load Line convention.

use shipdes_config::FreeboardType;

const TABLE_LENGTHS_M: [f64; 18] = [
    30.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0, 220.0, 240.0, 260.0, 280.0,
    300.0, 320.0, 340.0, 360.0,
];
const TYPE_A_MM: [f64; 18] = [
    250.0, 334.0, 573.0, 841.0, 1135.0, 1459.0, 1803.0, 2126.0, 2393.0, 2612.0, 2792.0, 2946.0,
    3072.0, 3176.0, 3262.0, 3331.0, 3382.0, 3425.0,
];
const TYPE_B_MM: [f64; 18] = [
    250.0, 334.0, 573.0, 887.0, 1271.0, 1690.0, 2109.0, 2520.0, 2915.0, 3264.0, 3586.0, 3880.0,
    4152.0, 4397.0, 4630.0, 4844.0, 5055.0, 5260.0,
];

/// Effective superstructure length as a fraction of ship length.
const SUPERSTRUCTURE_FRACTION: f64 = 0.2;
/// Fitted sheer relative to standard, forward and aft.
const SHEER_FORWARD: f64 = 0.5;
const SHEER_AFT: f64 = 0.0;

/// Tabular freeboard (mm) with linear interpolation, extrapolated from the end segments.
fn tabular_freeboard_mm(kind: FreeboardType, length_m: f64) -> f64 {
    let table = match kind {
        FreeboardType::TypeA => &TYPE_A_MM,
        FreeboardType::TypeB => &TYPE_B_MM,
    };
    let last = TABLE_LENGTHS_M.len() - 2;
    let segment = TABLE_LENGTHS_M
        .windows(2)
        .position(|pair| length_m <= pair[1])
        .unwrap_or(last);
    let (l0, l1) = (TABLE_LENGTHS_M[segment], TABLE_LENGTHS_M[segment + 1]);
    let (f0, f1) = (table[segment], table[segment + 1]);
    f0 + (length_m - l0) * (f1 - f0) / (l1 - l0)
}

/// Minimum summer freeboard (m) for the given moulded dimensions.
pub fn minimum_freeboard_m(
    kind: FreeboardType,
    length_m: f64,
    depth_m: f64,
    draft_m: f64,
    block_coefficient: f64,
) -> f64 {
    let mut freeboard = tabular_freeboard_mm(kind, length_m);

    if kind == FreeboardType::TypeB && length_m < 100.0 {
        freeboard += 0.75 * (100.0 - length_m) * (0.35 - SUPERSTRUCTURE_FRACTION);
    }

    let cb_at_depth = block_coefficient + (0.85 * depth_m - draft_m) / (10.0 * draft_m);
    if cb_at_depth >= 0.68 {
        freeboard *= (cb_at_depth + 0.68) / 1.36;
    }

    let reference_depth = length_m / 15.0;
    if depth_m >= reference_depth {
        let per_metre = if length_m <= 120.0 {
            length_m / 0.48
        } else {
            250.0
        };
        freeboard += (depth_m - reference_depth) * per_metre;
    }

    let full_deduction = if length_m <= 85.0 {
        350.0 + (length_m - 24.0) * (860.0 - 350.0) / (85.0 - 24.0)
    } else if length_m <= 122.0 {
        860.0 + (length_m - 85.0) * (1070.0 - 860.0) / (122.0 - 85.0)
    } else {
        1070.0
    };
    let exponent = match kind {
        FreeboardType::TypeA => 1.23,
        FreeboardType::TypeB => 1.3,
    };
    freeboard -= full_deduction * SUPERSTRUCTURE_FRACTION.powf(exponent);

    let sheer = (length_m / 3.0 + 10.0)
        * (8.3375 * (1.0 - SHEER_FORWARD) + 4.168_75 * (1.0 - SHEER_AFT))
        * (0.75 - 0.5 * SUPERSTRUCTURE_FRACTION);
    freeboard += sheer;

    (freeboard * 0.001).max(0.0)
}
