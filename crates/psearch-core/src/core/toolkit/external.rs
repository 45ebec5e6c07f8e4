use super::{ChemToolkit, EmbedOptions, StereoOptions, ToolkitError};
use crate::core::models::features::FeaturePoint;
use crate::core::models::molecule::{Conformer, Molecule};
use crate::core::pharmacophore::definitions::FeatureDefinitions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;
use std::thread::JoinHandle;
use tracing::{debug, trace};

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
enum Request<'a> {
    CanonicalSmiles {
        molecule: &'a Molecule,
    },
    EnumerateStereoisomers {
        molecule: &'a Molecule,
        options: &'a StereoOptions,
    },
    AddHydrogens {
        molecule: &'a Molecule,
    },
    EmbedConformers {
        molecule: &'a Molecule,
        options: &'a EmbedOptions,
    },
    Minimize {
        molecule: &'a Molecule,
        conformer: &'a Conformer,
    },
    ConformerEnergy {
        molecule: &'a Molecule,
        conformer: &'a Conformer,
    },
    FeaturePoints {
        molecule: &'a Molecule,
        conformer: &'a Conformer,
        definitions: &'a FeatureDefinitions,
    },
}

impl Request<'_> {
    fn name(&self) -> &'static str {
        match self {
            Request::CanonicalSmiles { .. } => "canonical-smiles",
            Request::EnumerateStereoisomers { .. } => "enumerate-stereoisomers",
            Request::AddHydrogens { .. } => "add-hydrogens",
            Request::EmbedConformers { .. } => "embed-conformers",
            Request::Minimize { .. } => "minimize",
            Request::ConformerEnergy { .. } => "conformer-energy",
            Request::FeaturePoints { .. } => "feature-points",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ErrorKind {
    InvalidStructure,
    ForceFieldUnavailable,
    Embedding,
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
enum Response<T> {
    Ok { result: T },
    Error { kind: ErrorKind, message: String },
}

/// Lines of helper stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// One running helper process, answering one request per line.
#[derive(Debug)]
struct Session {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr: Option<JoinHandle<Vec<String>>>,
}

impl Session {
    fn spawn(program: &Path, args: &[String]) -> Result<Self, ToolkitError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ToolkitError::Process(format!("cannot start '{}': {}", program.display(), e))
            })?;
        let missing =
            |stream: &str| ToolkitError::Process(format!("helper {} is not available", stream));
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

        // stderr must be drained while the helper runs.
        let stderr = std::thread::spawn(move || {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                trace!(target: "psearch::toolkit::stderr", "{}", line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail)
        });
        debug!("Started toolkit helper {:?} (pid {}).", program, child.id());

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr: Some(stderr),
        })
    }

    fn exchange(&mut self, payload: &[u8], op: &str) -> Result<String, ToolkitError> {
        self.stdin.write_all(payload)?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(self.exit_error(op));
        }
        Ok(line)
    }

    /// Describes a helper that closed its stdout before answering.
    fn exit_error(&mut self, op: &str) -> ToolkitError {
        // A helper that closed stdout but is still running is stopped here.
        let _ = self.child.kill();
        let status = match self.child.wait() {
            Ok(status) => status.to_string(),
            Err(e) => format!("unknown status: {}", e),
        };
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
            .join("\n");
        ToolkitError::Process(format!(
            "helper exited without answering '{}' ({}): {}",
            op,
            status,
            stderr.trim()
        ))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A [`ChemToolkit`] backed by an external helper program.
///
/// The helper (`program args...`) is a long-lived process that reads one JSON request per
/// line on stdin (tagged by its `op` field) and answers each with one JSON line on stdout:
///
/// ```json
/// {"status": "ok", "result": ...}
/// {"status": "error", "kind": "force-field-unavailable", "message": "..."}
/// ```
///
/// Error kinds are `invalid-structure`, `force-field-unavailable`, `embedding` and `other`.
/// A helper that exits or answers with malformed output is a fatal toolkit error.
///
/// Idle helpers are pooled: a worker thread takes one (starting a new helper when none is
/// idle), runs its request and returns it. At most one helper per concurrent caller is started
/// and a helper that failed mid-exchange is discarded. Helpers are stopped when the toolkit is
/// dropped.
#[derive(Debug)]
pub struct ExternalToolkit {
    program: PathBuf,
    args: Vec<String>,
    idle: Mutex<Vec<Session>>,
}

impl ExternalToolkit {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn checkout(&self) -> Result<Session, ToolkitError> {
        let pooled = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        match pooled {
            Some(session) => Ok(session),
            None => Session::spawn(&self.program, &self.args),
        }
    }

    fn checkin(&self, session: Session) {
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(session);
        }
    }

    fn call<T: DeserializeOwned>(&self, request: &Request<'_>) -> Result<T, ToolkitError> {
        let op = request.name();
        let payload = serde_json::to_vec(request)
            .map_err(|e| ToolkitError::Protocol(format!("cannot encode '{}' request: {}", op, e)))?;
        trace!(op, bytes = payload.len(), "Calling toolkit helper.");

        let mut session = self.checkout()?;
        let line = session.exchange(&payload, op)?;
        self.checkin(session);

        let response: Response<T> = serde_json::from_str(&line).map_err(|e| {
            ToolkitError::Protocol(format!("malformed response to '{}': {}", op, e))
        })?;

        match response {
            Response::Ok { result } => Ok(result),
            Response::Error { kind, message } => Err(match kind {
                ErrorKind::InvalidStructure => ToolkitError::InvalidStructure(message),
                ErrorKind::ForceFieldUnavailable => ToolkitError::ForceFieldUnavailable(message),
                ErrorKind::Embedding => ToolkitError::Embedding(message),
                ErrorKind::Other => ToolkitError::Process(message),
            }),
        }
    }
}

impl ChemToolkit for ExternalToolkit {
    fn canonical_smiles(&self, molecule: &Molecule) -> Result<String, ToolkitError> {
        self.call(&Request::CanonicalSmiles { molecule })
    }

    fn enumerate_stereoisomers(
        &self,
        molecule: &Molecule,
        options: &StereoOptions,
    ) -> Result<Vec<Molecule>, ToolkitError> {
        self.call(&Request::EnumerateStereoisomers { molecule, options })
    }

    fn add_hydrogens(&self, molecule: &Molecule) -> Result<Molecule, ToolkitError> {
        self.call(&Request::AddHydrogens { molecule })
    }

    fn embed_conformers(
        &self,
        molecule: &Molecule,
        options: &EmbedOptions,
    ) -> Result<Vec<Conformer>, ToolkitError> {
        self.call(&Request::EmbedConformers { molecule, options })
    }

    fn minimize(
        &self,
        molecule: &Molecule,
        conformer: &Conformer,
    ) -> Result<Conformer, ToolkitError> {
        self.call(&Request::Minimize {
            molecule,
            conformer,
        })
    }

    fn conformer_energy(
        &self,
        molecule: &Molecule,
        conformer: &Conformer,
    ) -> Result<f64, ToolkitError> {
        self.call(&Request::ConformerEnergy {
            molecule,
            conformer,
        })
    }

    fn feature_points(
        &self,
        molecule: &Molecule,
        conformer: &Conformer,
        definitions: &FeatureDefinitions,
    ) -> Result<Vec<FeaturePoint>, ToolkitError> {
        self.call(&Request::FeaturePoints {
            molecule,
            conformer,
            definitions,
        })
    }
}
