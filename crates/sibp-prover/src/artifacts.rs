//! On-disk model artifact layout and input normalization.
//!
//! The real strategy needs six pre-generated artifacts under one model
//! directory. Absence of any subset is reported as a single aggregated
//! [`ProveError::MissingArtifacts`] naming every absent item, checked
//! up front so the pipeline never partially executes.
//!
//! `norm_params.json` is optional: when absent, identity normalization
//! (mean 0, std 1) applies instead of failing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sibp_core::ProveError;

/// Fixed circuit input width. The compiled circuit was built for exactly
/// this many inputs; shorter series are zero-padded and longer ones
/// truncated.
pub const CIRCUIT_INPUT_LEN: usize = 30;

/// Required artifact file names, paired with the logical names used in
/// missing-artifact reports.
const REQUIRED: [(&str, &str); 6] = [
    ("model", "sharpe_model.onnx"),
    ("settings", "settings.json"),
    ("circuit", "circuit.ezkl"),
    ("pk", "pk.key"),
    ("vk", "vk.key"),
    ("srs", "kzg.srs"),
];

/// Resolved artifact paths under one configured model directory.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    model_dir: PathBuf,
}

impl ArtifactLayout {
    /// Bind the layout to a model directory (no filesystem access).
    #[must_use]
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    /// The configured model directory.
    #[inline]
    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Trained model description (ONNX).
    #[must_use]
    pub fn model(&self) -> PathBuf {
        self.model_dir.join("sharpe_model.onnx")
    }

    /// Circuit settings.
    #[must_use]
    pub fn settings(&self) -> PathBuf {
        self.model_dir.join("settings.json")
    }

    /// Compiled circuit.
    #[must_use]
    pub fn circuit(&self) -> PathBuf {
        self.model_dir.join("circuit.ezkl")
    }

    /// Proving key.
    #[must_use]
    pub fn proving_key(&self) -> PathBuf {
        self.model_dir.join("pk.key")
    }

    /// Verification key.
    #[must_use]
    pub fn verification_key(&self) -> PathBuf {
        self.model_dir.join("vk.key")
    }

    /// KZG structured reference string.
    #[must_use]
    pub fn srs(&self) -> PathBuf {
        self.model_dir.join("kzg.srs")
    }

    /// Optional per-feature normalization parameters.
    #[must_use]
    pub fn norm_params(&self) -> PathBuf {
        self.model_dir.join("norm_params.json")
    }

    /// Verify all six required artifacts exist; otherwise report every
    /// absent one in a single aggregated error.
    pub fn check_required(&self) -> Result<(), ProveError> {
        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|(_, file)| !self.model_dir.join(file).exists())
            .map(|(name, _)| (*name).to_owned())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProveError::MissingArtifacts {
                missing,
                model_dir: self.model_dir.clone(),
            })
        }
    }

    /// Load normalization parameters, falling back to identity when the
    /// optional file is absent.
    pub fn load_norm_params(&self) -> Result<NormParams> {
        let path = self.norm_params();
        if !path.exists() {
            return Ok(NormParams::identity());
        }
        let raw = fs::read(&path)
            .with_context(|| format!("reading normalization params {}", path.display()))?;
        let params: NormParams = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing normalization params {}", path.display()))?;
        Ok(params)
    }
}

/// Per-feature affine normalization parameters persisted at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormParams {
    /// Per-feature means.
    pub x_mean: Vec<f64>,
    /// Per-feature standard deviations.
    pub x_std: Vec<f64>,
}

impl NormParams {
    /// Identity normalization: mean 0, std 1 for every feature.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            x_mean: vec![0.0; CIRCUIT_INPUT_LEN],
            x_std: vec![1.0; CIRCUIT_INPUT_LEN],
        }
    }

    /// Apply `(x - mean) / std` element-wise over a fixed-width input.
    #[must_use]
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        input
            .iter()
            .enumerate()
            .map(|(i, x)| {
                let mean = self.x_mean.get(i).copied().unwrap_or(0.0);
                let std = self.x_std.get(i).copied().unwrap_or(1.0);
                (x - mean) / std
            })
            .collect()
    }
}

/// Pad with zeros or truncate so the series is exactly
/// [`CIRCUIT_INPUT_LEN`] wide.
#[must_use]
pub fn fit_to_circuit_width(returns: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = returns.iter().copied().take(CIRCUIT_INPUT_LEN).collect();
    out.resize(CIRCUIT_INPUT_LEN, 0.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn missing_check_names_every_absent_artifact() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let err = layout.check_required().unwrap_err();
        match err {
            ProveError::MissingArtifacts { missing, .. } => {
                assert_eq!(
                    missing,
                    vec!["model", "settings", "circuit", "pk", "vk", "srs"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn partial_layout_reports_only_missing() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "sharpe_model.onnx");
        touch(dir.path(), "settings.json");
        touch(dir.path(), "circuit.ezkl");
        touch(dir.path(), "pk.key");
        let layout = ArtifactLayout::new(dir.path());
        match layout.check_required().unwrap_err() {
            ProveError::MissingArtifacts { missing, .. } => {
                assert_eq!(missing, vec!["vk", "srs"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn complete_layout_passes() {
        let dir = tempdir().unwrap();
        for (_, file) in REQUIRED {
            touch(dir.path(), file);
        }
        assert!(ArtifactLayout::new(dir.path()).check_required().is_ok());
    }

    #[test]
    fn absent_norm_params_is_identity() {
        let dir = tempdir().unwrap();
        let params = ArtifactLayout::new(dir.path()).load_norm_params().unwrap();
        let input = fit_to_circuit_width(&[1.0, -2.0]);
        assert_eq!(params.apply(&input), input);
    }

    #[test]
    fn persisted_norm_params_are_applied() {
        let dir = tempdir().unwrap();
        let params = NormParams {
            x_mean: vec![1.0; CIRCUIT_INPUT_LEN],
            x_std: vec![2.0; CIRCUIT_INPUT_LEN],
        };
        fs::write(
            dir.path().join("norm_params.json"),
            serde_json::to_vec(&params).unwrap(),
        )
        .unwrap();
        let loaded = ArtifactLayout::new(dir.path()).load_norm_params().unwrap();
        let out = loaded.apply(&[3.0; CIRCUIT_INPUT_LEN]);
        assert!(out.iter().all(|v| (*v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn width_fitting_pads_and_truncates() {
        assert_eq!(fit_to_circuit_width(&[1.0; 2]).len(), CIRCUIT_INPUT_LEN);
        assert_eq!(fit_to_circuit_width(&[1.0; 2])[2], 0.0);
        let long = vec![0.5; 365];
        assert_eq!(fit_to_circuit_width(&long).len(), CIRCUIT_INPUT_LEN);
        assert!(fit_to_circuit_width(&long).iter().all(|v| *v == 0.5));
    }
}
