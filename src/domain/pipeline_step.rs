//! Pipeline step catalogue
//!
//! Step names are stored as free text by the pipeline and have been renamed
//! over time. Every literal ever written is listed in [`STEP_ALIASES`] and
//! resolves to one canonical [`PipelineStep`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Canonical pipeline stage, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStep {
    BadPixMap,
    DataReduction,
    Subtract,
    FilterShape,
    AssignReference,
    AlignReference,
    RunSfft,
    ExtractSources,
    FilterNearStars,
    ZeroPoint,
    RealBogus,
    Cutouts,
    Save,
    Skyportal,
    FiveSigma,
    MpcQuery,
    ReferenceStack,
}

/// Every known step literal and the step it denotes.
pub const STEP_ALIASES: &[(&str, PipelineStep)] = &[
    ("Bad pix map generation", PipelineStep::BadPixMap),
    ("Generate bad pixel map", PipelineStep::BadPixMap),
    ("Create bad pixel mask from raw image", PipelineStep::BadPixMap),
    ("Basic data reduction", PipelineStep::DataReduction),
    ("Perform basic data reduction", PipelineStep::DataReduction),
    ("Subtract Background and generate source cat", PipelineStep::Subtract),
    ("Subtract background and generate source catalog", PipelineStep::Subtract),
    ("filter image by the shape of sources", PipelineStep::FilterShape),
    ("Filter image by the shape of sources", PipelineStep::FilterShape),
    ("Assign Reference from file", PipelineStep::AssignReference),
    ("Assign Reference", PipelineStep::AssignReference),
    ("Assign reference image", PipelineStep::AssignReference),
    ("Align ref to sci and propagate wcs from ref to sci", PipelineStep::AlignReference),
    ("Align ref to sci and propogate wcs from ref to sci", PipelineStep::AlignReference),
    ("Run Sfft Subtraction", PipelineStep::RunSfft),
    ("Extract sources from difference image", PipelineStep::ExtractSources),
    ("Filter out candidates close to stars", PipelineStep::FilterNearStars),
    ("Calculate zeropoint of image", PipelineStep::ZeroPoint),
    ("Calculate real-bogus score for candidates", PipelineStep::RealBogus),
    ("Making cutouts ", PipelineStep::Cutouts),
    ("save the image", PipelineStep::Save),
    ("skyportal_logging", PipelineStep::Skyportal),
    ("Finding the five sigma upper limit of magnitude", PipelineStep::FiveSigma),
    ("Post annotations from MPC query", PipelineStep::MpcQuery),
    ("Add image to reference stack", PipelineStep::ReferenceStack),
];

impl PipelineStep {
    pub const ALL: [PipelineStep; 17] = [
        Self::BadPixMap,
        Self::DataReduction,
        Self::Subtract,
        Self::FilterShape,
        Self::AssignReference,
        Self::AlignReference,
        Self::RunSfft,
        Self::ExtractSources,
        Self::FilterNearStars,
        Self::ZeroPoint,
        Self::RealBogus,
        Self::Cutouts,
        Self::Save,
        Self::Skyportal,
        Self::FiveSigma,
        Self::MpcQuery,
        Self::ReferenceStack,
    ];

    /// Resolve a stored step literal. Matching is exact, including case and
    /// trailing whitespace.
    pub fn resolve(literal: &str) -> Option<Self> {
        STEP_ALIASES
            .iter()
            .find(|(alias, _)| *alias == literal)
            .map(|(_, step)| *step)
    }

    /// Label used on charts and in filters.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::BadPixMap => "Bad Pix Map",
            Self::DataReduction => "Data Reduction",
            Self::Subtract => "Subtract",
            Self::FilterShape => "Fltr Shape",
            Self::AssignReference => "Assign Ref",
            Self::AlignReference => "Align Ref",
            Self::RunSfft => "Run Sfft",
            Self::ExtractSources => "Extract Sources",
            Self::FilterNearStars => "Fltr Near Stars",
            Self::ZeroPoint => "Zero Point",
            Self::RealBogus => "Real-Bogus",
            Self::Cutouts => "Cutouts",
            Self::Save => "Save",
            Self::Skyportal => "Skyportal",
            Self::FiveSigma => "Five Sigma",
            Self::MpcQuery => "MPC Query",
            Self::ReferenceStack => "Ref Stack",
        }
    }

    /// Literal the pipeline historically wrote for this step.
    pub fn long_name(self) -> &'static str {
        match self {
            Self::BadPixMap => "Bad pix map generation",
            Self::DataReduction => "Basic data reduction",
            Self::Subtract => "Subtract Background and generate source cat",
            Self::FilterShape => "filter image by the shape of sources",
            Self::AssignReference => "Assign Reference from file",
            Self::AlignReference => "Align ref to sci and propagate wcs from ref to sci",
            Self::RunSfft => "Run Sfft Subtraction",
            Self::ExtractSources => "Extract sources from difference image",
            Self::FilterNearStars => "Filter out candidates close to stars",
            Self::ZeroPoint => "Calculate zeropoint of image",
            Self::RealBogus => "Calculate real-bogus score for candidates",
            Self::Cutouts => "Making cutouts ",
            Self::Save => "save the image",
            Self::Skyportal => "skyportal_logging",
            Self::FiveSigma => "Finding the five sigma upper limit of magnitude",
            Self::MpcQuery => "Post annotations from MPC query",
            Self::ReferenceStack => "Add image to reference stack",
        }
    }

    /// All literals that resolve to this step.
    pub fn aliases(self) -> impl Iterator<Item = &'static str> {
        STEP_ALIASES
            .iter()
            .filter(move |(_, step)| *step == self)
            .map(|(alias, _)| *alias)
    }

    /// Only a saved image counts as a successful run.
    pub fn is_terminal_success(self) -> bool {
        self == Self::Save
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for PipelineStep {
    type Err = Error;

    /// Accepts a short name (case-insensitive) or any known literal.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|step| step.short_name().eq_ignore_ascii_case(s.trim()))
            .or_else(|| Self::resolve(s))
            .ok_or_else(|| Error::UnknownPipelineStep(s.to_string()))
    }
}

/// A step literal as stored, paired with the step it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StepName {
    literal: &'static str,
    step: PipelineStep,
}

impl StepName {
    pub fn parse(literal: &str) -> Result<Self> {
        STEP_ALIASES
            .iter()
            .find(|(alias, _)| *alias == literal)
            .map(|(alias, step)| Self {
                literal: *alias,
                step: *step,
            })
            .ok_or_else(|| Error::UnknownPipelineStep(literal.to_string()))
    }

    pub fn literal(&self) -> &'static str {
        self.literal
    }

    pub fn step(&self) -> PipelineStep {
        self.step
    }
}

impl From<PipelineStep> for StepName {
    fn from(step: PipelineStep) -> Self {
        Self {
            literal: step.long_name(),
            step,
        }
    }
}

impl TryFrom<String> for StepName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<StepName> for String {
    fn from(name: StepName) -> Self {
        name.literal.to_string()
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_step_has_its_long_name_as_alias() {
        for step in PipelineStep::ALL {
            assert_eq!(PipelineStep::resolve(step.long_name()), Some(step));
            assert!(step.aliases().any(|a| a == step.long_name()));
        }
    }

    #[test]
    fn test_aliases_are_unique() {
        let literals: HashSet<_> = STEP_ALIASES.iter().map(|(alias, _)| *alias).collect();
        assert_eq!(literals.len(), STEP_ALIASES.len());
    }

    #[test]
    fn test_historical_aliases_resolve() {
        assert_eq!(
            PipelineStep::resolve("Align ref to sci and propogate wcs from ref to sci"),
            Some(PipelineStep::AlignReference)
        );
        assert_eq!(
            PipelineStep::resolve("Create bad pixel mask from raw image"),
            Some(PipelineStep::BadPixMap)
        );
        assert_eq!(
            PipelineStep::resolve("Assign Reference"),
            Some(PipelineStep::AssignReference)
        );
        assert_eq!(
            PipelineStep::resolve("Add image to reference stack"),
            Some(PipelineStep::ReferenceStack)
        );
    }

    #[test]
    fn test_resolution_is_exact() {
        assert_eq!(PipelineStep::resolve("Making cutouts"), None);
        assert_eq!(PipelineStep::resolve("Save the image"), None);
        assert_eq!(PipelineStep::resolve("Making cutouts "), Some(PipelineStep::Cutouts));
    }

    #[test]
    fn test_only_save_is_success() {
        let successes: Vec<_> = PipelineStep::ALL
            .into_iter()
            .filter(|s| s.is_terminal_success())
            .collect();
        assert_eq!(successes, vec![PipelineStep::Save]);
        assert_eq!(PipelineStep::Save.aliases().collect::<Vec<_>>(), vec!["save the image"]);
    }

    #[test]
    fn test_from_str_accepts_short_and_long_names() {
        assert_eq!("run sfft".parse::<PipelineStep>().unwrap(), PipelineStep::RunSfft);
        assert_eq!(
            "Run Sfft Subtraction".parse::<PipelineStep>().unwrap(),
            PipelineStep::RunSfft
        );
        assert!(matches!(
            "Levitate telescope".parse::<PipelineStep>(),
            Err(Error::UnknownPipelineStep(_))
        ));
    }

    #[test]
    fn test_step_name_keeps_literal() {
        let name = StepName::parse("Filter image by the shape of sources").unwrap();
        assert_eq!(name.step(), PipelineStep::FilterShape);
        assert_eq!(name.literal(), "Filter image by the shape of sources");

        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Filter image by the shape of sources\"");
        assert!(serde_json::from_str::<StepName>("\"nope\"").is_err());
    }
}
