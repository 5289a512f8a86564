//! Adapter over the external `ezkl` proving toolchain.
//!
//! The pipeline needs exactly one capability from the toolchain: *run a
//! potentially-asynchronous proving operation and block until it
//! completes*. [`ProvingEngine`] expresses that once and every pipeline
//! step reuses it, instead of branching per call site.
//!
//! The default implementation shells out to the `ezkl` CLI binary.
//! Availability is probed once at process start (`ezkl --version`) and the
//! outcome is injected into the executor; nothing re-checks it ad hoc.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Blocking operations the real strategy needs from the proving toolchain.
///
/// All operations take file-path arguments; artifacts and intermediates
/// never travel through memory across this boundary.
pub trait ProvingEngine: Send + Sync {
    /// Generate a witness for `input` against the compiled circuit.
    fn gen_witness(&self, input: &Path, circuit: &Path, witness_out: &Path) -> Result<()>;

    /// Generate a proof from a witness, proving key, and reference string.
    fn prove(
        &self,
        witness: &Path,
        circuit: &Path,
        pk: &Path,
        proof_out: &Path,
        srs: &Path,
    ) -> Result<()>;

    /// Verify a proof locally. `Ok(false)` means the proof was present but
    /// rejected; `Err` means the operation itself could not run.
    fn verify(&self, proof: &Path, settings: &Path, vk: &Path, srs: &Path) -> Result<bool>;
}

/// `ezkl` CLI subprocess adapter.
#[derive(Debug, Clone)]
pub struct EzklCli {
    binary: PathBuf,
}

impl EzklCli {
    /// Default binary name resolved through `PATH`.
    pub const DEFAULT_BINARY: &'static str = "ezkl";

    /// Wrap an explicit binary path (no probing).
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Probe the toolchain once at startup. Returns the adapter and the
    /// reported version string, or `None` if the binary cannot run.
    #[must_use]
    pub fn probe(binary: impl Into<PathBuf>) -> Option<(Self, String)> {
        let cli = Self::new(binary);
        let out = Command::new(&cli.binary).arg("--version").output().ok()?;
        if !out.status.success() {
            return None;
        }
        let version = String::from_utf8_lossy(&out.stdout).trim().to_owned();
        Some((cli, version))
    }

    /// Run one subcommand to completion, failing with captured stderr on a
    /// non-zero exit.
    fn run(&self, args: &[&std::ffi::OsStr]) -> Result<std::process::ExitStatus> {
        debug!(binary = %self.binary.display(), ?args, "invoking ezkl");
        let out = Command::new(&self.binary)
            .args(args)
            .output()
            .with_context(|| format!("spawning {}", self.binary.display()))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!(
                "ezkl {} exited with {}: {}",
                args.first()
                    .map_or_else(String::new, |a| a.to_string_lossy().into_owned()),
                out.status,
                stderr.trim()
            );
        }
        Ok(out.status)
    }
}

impl ProvingEngine for EzklCli {
    fn gen_witness(&self, input: &Path, circuit: &Path, witness_out: &Path) -> Result<()> {
        self.run(&[
            "gen-witness".as_ref(),
            "--data".as_ref(),
            input.as_os_str(),
            "--compiled-circuit".as_ref(),
            circuit.as_os_str(),
            "--output".as_ref(),
            witness_out.as_os_str(),
        ])
        .map(|_| ())
        .context("generating witness")
    }

    fn prove(
        &self,
        witness: &Path,
        circuit: &Path,
        pk: &Path,
        proof_out: &Path,
        srs: &Path,
    ) -> Result<()> {
        self.run(&[
            "prove".as_ref(),
            "--witness".as_ref(),
            witness.as_os_str(),
            "--compiled-circuit".as_ref(),
            circuit.as_os_str(),
            "--pk-path".as_ref(),
            pk.as_os_str(),
            "--proof-path".as_ref(),
            proof_out.as_os_str(),
            "--srs-path".as_ref(),
            srs.as_os_str(),
        ])
        .map(|_| ())
        .context("generating proof")
    }

    fn verify(&self, proof: &Path, settings: &Path, vk: &Path, srs: &Path) -> Result<bool> {
        let out = Command::new(&self.binary)
            .args([
                "verify".as_ref(),
                "--proof-path".as_ref(),
                proof.as_os_str(),
                "--settings-path".as_ref(),
                settings.as_os_str(),
                "--vk-path".as_ref(),
                vk.as_os_str(),
                "--srs-path".as_ref(),
                srs.as_os_str(),
            ])
            .output()
            .with_context(|| format!("spawning {}", self.binary.display()))?;
        if out.status.success() {
            return Ok(true);
        }
        // Exit code 1 is the verifier's "proof rejected"; anything else is
        // an operational failure.
        if out.status.code() == Some(1) {
            return Ok(false);
        }
        let stderr = String::from_utf8_lossy(&out.stderr);
        bail!("ezkl verify exited with {}: {}", out.status, stderr.trim())
    }
}
