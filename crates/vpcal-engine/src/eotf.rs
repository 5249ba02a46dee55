//! EOTF correction LUT.
//!
//! The analysis stage measures how each channel of the wall actually
//! responds across its luminance range. The correction is a PQ-domain 1D
//! LUT: entry `i` holds the PQ code of the measured response at the linear
//! luminance that PQ code `i / (N - 1)` decodes to. The pipeline applies it
//! in the inverse direction between a linear-to-PQ and a PQ-to-linear stage.
//!
//! # Example
//!
//! ```
//! use vpcal_engine::{build_eotf_lut, LUT_LEN};
//!
//! let ramp: Vec<f64> = (0..LUT_LEN).map(|j| j as f64 / (LUT_LEN - 1) as f64 * 10.0).collect();
//! let lut = build_eotf_lut([&ramp, &ramp, &ramp], 1000.0).unwrap();
//! assert!(lut.issues.is_empty());
//! assert_eq!(lut.r.len(), LUT_LEN);
//! ```

use std::fmt;
use std::path::Path;

use tracing::{info, warn};
use vpcal_lut::{clf, Lut1D, ProcessNode};
use vpcal_math::{interp, pq};

use crate::error::{EngineError, EngineResult};

/// Entries per channel in the EOTF correction LUT.
pub const LUT_LEN: usize = 4096;

const CHANNELS: [char; 3] = ['R', 'G', 'B'];

/// Data-quality fault found while building the LUT.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveIssue {
    /// Peak luminance was zero, negative or non-finite; every entry maps to
    /// the last measured value.
    NonPositivePeak(f64),
    /// Non-finite samples were replaced with 0.
    NonFiniteSamples {
        /// Channel name (`R`, `G`, `B`).
        channel: char,
        /// Number of replaced samples.
        count: usize,
    },
    /// Measured response decreases somewhere.
    NonMonotone {
        /// Channel name (`R`, `G`, `B`).
        channel: char,
    },
}

impl fmt::Display for CurveIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositivePeak(peak) => write!(f, "peak luminance {peak} is not positive"),
            Self::NonFiniteSamples { channel, count } => {
                write!(f, "{count} non-finite samples in channel {channel} replaced with 0")
            }
            Self::NonMonotone { channel } => write!(f, "channel {channel} response is not monotone"),
        }
    }
}

/// PQ-domain EOTF correction tables.
#[derive(Debug, Clone, PartialEq)]
pub struct EotfLut {
    /// Red entries.
    pub r: Vec<f64>,
    /// Green entries.
    pub g: Vec<f64>,
    /// Blue entries.
    pub b: Vec<f64>,
    /// Faults found in the measured curves.
    pub issues: Vec<CurveIssue>,
}

impl EotfLut {
    /// Entries per channel.
    pub fn len(&self) -> usize {
        self.r.len()
    }

    /// True if the tables are empty.
    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    /// Converts to a 3-channel [`Lut1D`] over `[0, 1]`.
    pub fn to_lut1d(&self) -> EngineResult<Lut1D> {
        let f32s = |v: &[f64]| v.iter().map(|&x| x as f32).collect::<Vec<_>>();
        Ok(Lut1D::from_rgb(f32s(&self.r), f32s(&self.g), f32s(&self.b), 0.0, 1.0)?)
    }

    /// Writes the tables as a CLF with a single `LUT1D` node.
    pub fn write_clf(&self, path: impl AsRef<Path>, id: &str) -> EngineResult<()> {
        let path = path.as_ref();
        let mut pl = clf::ProcessList::new(id)
            .with_description("PQ-domain EOTF correction, apply inverse");
        pl.input_descriptor = Some("ST-2084".into());
        pl.output_descriptor = Some("ST-2084".into());
        pl.nodes.push(ProcessNode::Lut1D(self.to_lut1d()?));
        clf::write_clf(path, &pl)?;
        info!(path = %path.display(), entries = self.len(), "wrote EOTF correction LUT");
        Ok(())
    }
}

/// Builds the PQ-domain correction tables from measured response curves.
///
/// `curves` are the R, G, B responses in linear units (1.0 = 100 nits),
/// sampled evenly from 0 to `peak_nits`. The output has [`LUT_LEN`]
/// entries per channel.
///
/// Faults in the data become [`CurveIssue`]s. Empty or unequal-length
/// curves are an error.
pub fn build_eotf_lut(curves: [&[f64]; 3], peak_nits: f64) -> EngineResult<EotfLut> {
    let len = curves[0].len();
    if curves.iter().any(|c| c.is_empty()) {
        return Err(EngineError::InvalidResults("EOTF curve is empty".into()));
    }
    if curves.iter().any(|c| c.len() != len) {
        return Err(EngineError::InvalidResults(format!(
            "EOTF curves differ in length ({}, {}, {})",
            curves[0].len(),
            curves[1].len(),
            curves[2].len()
        )));
    }

    let mut issues = Vec::new();
    let peak = if peak_nits.is_finite() && peak_nits > 0.0 {
        peak_nits
    } else {
        issues.push(CurveIssue::NonPositivePeak(peak_nits));
        0.0
    };

    let domain = interp::linspace(0.0, peak / pq::NITS_PER_UNIT, len);
    let xs: Vec<f64> = (0..LUT_LEN)
        .map(|i| pq::decode(i as f64 / (LUT_LEN - 1) as f64))
        .collect();

    let mut out: [Vec<f64>; 3] = Default::default();
    for (c, curve) in curves.iter().enumerate() {
        let channel = CHANNELS[c];
        let mut fp = curve.to_vec();
        let mut bad = 0;
        for v in fp.iter_mut().filter(|v| !v.is_finite()) {
            *v = 0.0;
            bad += 1;
        }
        if bad > 0 {
            issues.push(CurveIssue::NonFiniteSamples { channel, count: bad });
        }
        if !interp::is_non_decreasing(&fp) {
            issues.push(CurveIssue::NonMonotone { channel });
        }
        out[c] = interp::resample(&xs, &domain, &fp)
            .into_iter()
            .map(pq::encode)
            .collect();
    }

    for issue in &issues {
        warn!(%issue, "EOTF curve");
    }

    let [r, g, b] = out;
    Ok(EotfLut { r, g, b, issues })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear(peak_units: f64) -> Vec<f64> {
        interp::linspace(0.0, peak_units, LUT_LEN)
    }

    #[test]
    fn identity_response_is_identity_lut() {
        let c = linear(10.0);
        let lut = build_eotf_lut([&c, &c, &c], 1000.0).unwrap();
        assert!(lut.issues.is_empty());

        // below the peak the measured response equals the input
        let i = 2048;
        let p = i as f64 / (LUT_LEN - 1) as f64;
        assert!(pq::decode(p) < 10.0);
        assert_relative_eq!(lut.r[i], p, epsilon = 1e-9);
        assert_relative_eq!(lut.r[0], 0.0);
    }

    #[test]
    fn clamps_past_the_peak() {
        let c = linear(10.0);
        let lut = build_eotf_lut([&c, &c, &c], 1000.0).unwrap();
        let top = pq::encode(10.0);
        assert_relative_eq!(lut.g[LUT_LEN - 1], top, epsilon = 1e-9);
    }

    #[test]
    fn half_response_lowers_its_channel() {
        let full = linear(10.0);
        let half: Vec<f64> = full.iter().map(|v| v * 0.5).collect();
        let lut = build_eotf_lut([&full, &half, &full], 1000.0).unwrap();
        assert!(lut.g[3000] < lut.r[3000]);
        assert_eq!(lut.r, lut.b);
    }

    #[test]
    fn bad_peak_degenerates() {
        let c = linear(10.0);
        for peak in [0.0, -5.0, f64::NAN] {
            let lut = build_eotf_lut([&c, &c, &c], peak).unwrap();
            assert!(matches!(lut.issues[0], CurveIssue::NonPositivePeak(_)));
            assert!(lut.r.iter().all(|v| v.is_finite()));
            assert_relative_eq!(lut.r[100], pq::encode(10.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn non_finite_samples_are_zeroed() {
        let good = linear(10.0);
        let mut bad = good.clone();
        bad[10] = f64::NAN;
        bad[20] = f64::INFINITY;
        let lut = build_eotf_lut([&good, &good, &bad], 1000.0).unwrap();
        assert!(lut.issues.contains(&CurveIssue::NonFiniteSamples { channel: 'B', count: 2 }));
        assert!(lut.b.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn reports_non_monotone() {
        let good = linear(10.0);
        let mut dip = good.clone();
        dip[100] = 0.0;
        let lut = build_eotf_lut([&dip, &good, &good], 1000.0).unwrap();
        assert_eq!(lut.issues, [CurveIssue::NonMonotone { channel: 'R' }]);
    }

    #[test]
    fn rejects_empty_and_mismatched() {
        let c = linear(10.0);
        assert!(matches!(
            build_eotf_lut([&c, &[], &c], 1000.0),
            Err(EngineError::InvalidResults(_))
        ));
        let short = &c[..100];
        assert!(matches!(
            build_eotf_lut([&c, &c, short], 1000.0),
            Err(EngineError::InvalidResults(_))
        ));
    }

    #[test]
    fn writes_single_node_clf() {
        let dir = tempfile::tempdir().unwrap();
        let c = linear(10.0);
        let lut = build_eotf_lut([&c, &c, &c], 1000.0).unwrap();
        let path = dir.path().join("wall.clf");
        lut.write_clf(&path, "wall").unwrap();

        let pl = clf::read_clf(&path).unwrap();
        assert_eq!(pl.nodes.len(), 1);
        match &pl.nodes[0] {
            ProcessNode::Lut1D(l) => {
                assert_eq!(l.size(), LUT_LEN);
                assert!(!l.is_mono());
            }
            other => panic!("unexpected node {other:?}"),
        }
    }
}
