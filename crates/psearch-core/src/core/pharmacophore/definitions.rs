use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Human-readable names of the built-in feature labels.
pub static FEATURE_LABEL_NAMES: Map<&'static str, &'static str> = phf_map! {
    "A" => "hydrogen-bond acceptor",
    "D" => "hydrogen-bond donor",
    "P" => "positive ionizable",
    "N" => "negative ionizable",
    "H" => "hydrophobic",
    "a" => "aromatic ring",
};

const DEFAULT_DEFINITIONS: &[(&str, &[&str])] = &[
    (
        "A",
        &[
            "[#7;!$([#7]~[#6]=[#8]);!$([#7]-a);!$([#7+]);!$([#7]=,:[#6]~[#7])]",
            "[#8;!$([OH][C,S,P]=O);!$([#8]-[#6]=[#8]-*)]",
        ],
    ),
    (
        "D",
        &[
            "[#7!H0&!$(N-[SX4](=O)(=O)[CX4](F)(F)F)]",
            "[#8!H0&!$([OH][C,S,P]=O)]",
            "[#16!H0]",
        ],
    ),
    (
        "P",
        &[
            "[+;!$([N+]-[O-]);!$(*~[-])]",
            "[NX3;H2,H1;!$(NC=[O,S,N]);!$(N-a)]",
            "NC(=N)N",
        ],
    ),
    (
        "N",
        &[
            "[-;!$(*~[+])]",
            "[$([CX3](=O)[OH]),$([SX4](=O)(=O)[OH]),$([PX4](=O)[OH])]",
        ],
    ),
    (
        "H",
        &[
            "[CH3X4,CH2X3,CH1X2,F,Cl,Br,I]",
            "[$([CH2X4]([CH2,CH3])[CH2,CH3])]",
            "[$(C(~[#6])(~[#6])(~[#6]));!$(C~[#7,#8,#16])]",
        ],
    ),
    ("a", &["a1aaaaa1", "a1aaaa1"]),
];

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Feature definition set is empty")]
    Empty,
    #[error("Feature label '{0}' has no SMARTS patterns")]
    EmptyLabel(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefinitionFile {
    features: BTreeMap<String, Vec<String>>,
}

/// Maps pharmacophore feature labels to the SMARTS patterns that perceive them.
///
/// The patterns are opaque to this crate; they are handed to the chemistry toolkit together
/// with each conformer. A custom set can be loaded from a TOML file:
///
/// ```toml
/// [features]
/// A = ["[#7;!$([#7]-a)]", "[#8]"]
/// D = ["[#7!H0]", "[#8!H0]"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefinitions {
    features: BTreeMap<String, Vec<String>>,
}

impl Default for FeatureDefinitions {
    fn default() -> Self {
        let features = DEFAULT_DEFINITIONS
            .iter()
            .map(|(label, patterns)| {
                (
                    label.to_string(),
                    patterns.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();
        Self { features }
    }
}

impl FeatureDefinitions {
    pub fn new(features: BTreeMap<String, Vec<String>>) -> Result<Self, DefinitionError> {
        if features.is_empty() {
            return Err(DefinitionError::Empty);
        }
        if let Some((label, _)) = features.iter().find(|(_, patterns)| patterns.is_empty()) {
            return Err(DefinitionError::EmptyLabel(label.clone()));
        }
        Ok(Self { features })
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, DefinitionError> {
        let raw: RawDefinitionFile =
            toml::from_str(content).map_err(|source| DefinitionError::Toml {
                path: origin.to_string(),
                source,
            })?;
        Self::new(raw.features)
    }

    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path_str.clone(),
            source,
        })?;
        Self::from_toml_str(&content, &path_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn patterns(&self, label: &str) -> Option<&[String]> {
        self.features.get(label).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.features
            .iter()
            .map(|(label, patterns)| (label.as_str(), patterns.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

pub fn describe_label(label: &str) -> &str {
    FEATURE_LABEL_NAMES.get(label).copied().unwrap_or(label)
}
