use crate::scenario::assertions::AssertionKind;
use crate::scenario::{HandlerStyle, PathMode};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub collection_path: PathBuf,
    pub environment_path: Option<PathBuf>,
    pub features_dir: PathBuf,
    pub steps_file: PathBuf,
    pub env_store: PathBuf,
    pub cypress_dir: Option<PathBuf>,
    pub path_mode: PathMode,
    pub handler_style: HandlerStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureSummary {
    pub folder: String,
    pub file: String,
    pub appended: usize,
    pub skipped: usize,
}

/// Extracted assertions per kind, duplicates included.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssertionTally {
    pub equality: usize,
    pub membership: usize,
    pub existence: usize,
}

impl AssertionTally {
    pub fn record(&mut self, kind: AssertionKind) {
        match kind {
            AssertionKind::Equality => self.equality += 1,
            AssertionKind::Membership => self.membership += 1,
            AssertionKind::Existence => self.existence += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub collection: String,
    pub requests: usize,
    pub assertions: AssertionTally,
    pub features: Vec<FeatureSummary>,
    pub methods: Vec<String>,
    pub identities: Vec<String>,
    pub steps_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_store: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cypress_specs: Vec<String>,
    pub unresolved_placeholders: Vec<String>,
}

impl ConversionSummary {
    pub fn appended(&self) -> usize {
        self.features.iter().map(|f| f.appended).sum()
    }

    pub fn skipped(&self) -> usize {
        self.features.iter().map(|f| f.skipped).sum()
    }
}
