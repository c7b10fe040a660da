#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{cmp::Ordering, fmt, fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{constants::SNAPSHOT_QUALIFIER, error::ReportError};

/// Coordinates identifying an artifact in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Group identifier, dot-separated.
    pub group_id:    String,
    /// Artifact identifier.
    pub artifact_id: String,
    /// Packaging of the artifact, e.g. `jar`.
    pub packaging:   String,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.packaging)
    }
}

/// A version identifier split into `major[.minor[.incremental]]` numeric
/// parts plus an optional build number or qualifier.
///
/// Parsing never fails: a version that does not follow the numeric pattern
/// is treated as a bare qualifier, ordered before any release.
#[derive(Debug, Clone)]
pub struct ArtifactVersion {
    /// The version exactly as given.
    raw:          String,
    /// First numeric component.
    major:        u32,
    /// Second numeric component.
    minor:        u32,
    /// Third numeric component.
    incremental:  u32,
    /// Numeric part after the hyphen, when it is all digits.
    build_number: u32,
    /// Non-numeric part after the hyphen, or the whole string when the
    /// numeric pattern did not apply.
    qualifier:    Option<String>,
}

impl ArtifactVersion {
    /// Parses a version string.
    pub fn new(raw: &str) -> Self {
        let mut version = Self {
            raw:          raw.to_string(),
            major:        0,
            minor:        0,
            incremental:  0,
            build_number: 0,
            qualifier:    None,
        };

        let (main, rest) = match raw.split_once('-') {
            Some((main, rest)) => (main, Some(rest)),
            None => (raw, None),
        };

        let mut parts = [0u32; 3];
        let mut count = 0;
        let mut numeric = !main.is_empty();
        for piece in main.split('.') {
            if count == parts.len() {
                numeric = false;
                break;
            }
            match piece.parse::<u32>() {
                Ok(number) => {
                    parts[count] = number;
                    count += 1;
                }
                Err(_) => {
                    numeric = false;
                    break;
                }
            }
        }

        if !numeric {
            version.qualifier = Some(raw.to_string());
            return version;
        }

        version.major = parts[0];
        version.minor = parts[1];
        version.incremental = parts[2];

        if let Some(rest) = rest {
            match rest.parse::<u32>() {
                Ok(number) => version.build_number = number,
                Err(_) => version.qualifier = Some(rest.to_string()),
            }
        }

        version
    }

    /// The qualifier, if the version carries one.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// True when the qualifier marks this as an unstable build.
    pub fn is_snapshot(&self) -> bool {
        self.qualifier.as_deref() == Some(SNAPSHOT_QUALIFIER)
    }
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for ArtifactVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.incremental.cmp(&other.incremental))
            .then_with(|| match (&self.qualifier, &other.qualifier) {
                (None, None) => Ordering::Equal,
                // a qualified version precedes its release
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(left), Some(right)) => left.cmp(right),
            })
            .then(self.build_number.cmp(&other.build_number))
    }
}

impl PartialOrd for ArtifactVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ArtifactVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArtifactVersion {}

/// A single interval of acceptable versions within a range expression.
#[derive(Debug, Clone)]
struct Restriction {
    /// Lower bound, unbounded when absent.
    lower:           Option<ArtifactVersion>,
    /// Whether the lower bound itself is acceptable.
    lower_inclusive: bool,
    /// Upper bound, unbounded when absent.
    upper:           Option<ArtifactVersion>,
    /// Whether the upper bound itself is acceptable.
    upper_inclusive: bool,
}

impl Restriction {
    /// Parses one bracketed interval, e.g. `[1.0,2.0)` or `[1.0]`.
    fn parse(token: &str, spec: &str) -> Result<Self, ReportError> {
        let lower_inclusive = token.starts_with('[');
        let upper_inclusive = token.ends_with(']');
        let inner = &token[1..token.len() - 1];

        if let Some((lower, upper)) = inner.split_once(',') {
            let lower = lower.trim();
            let upper = upper.trim();

            let lower = (!lower.is_empty()).then(|| ArtifactVersion::new(lower));
            let upper = (!upper.is_empty()).then(|| ArtifactVersion::new(upper));

            if let (Some(lower), Some(upper)) = (&lower, &upper)
                && lower > upper
            {
                return Err(invalid(spec, "range defies version ordering"));
            }

            Ok(Self {
                lower,
                lower_inclusive,
                upper,
                upper_inclusive,
            })
        } else {
            let pinned = inner.trim();
            if pinned.is_empty() {
                return Err(invalid(spec, "empty version in range"));
            }
            if !(lower_inclusive && upper_inclusive) {
                return Err(invalid(spec, "single version must be surrounded by []"));
            }
            let version = ArtifactVersion::new(pinned);
            Ok(Self {
                lower:           Some(version.clone()),
                lower_inclusive: true,
                upper:           Some(version),
                upper_inclusive: true,
            })
        }
    }

    /// Whether the interval contains the given version.
    fn contains(&self, version: &ArtifactVersion) -> bool {
        if let Some(lower) = &self.lower {
            match version.cmp(lower) {
                Ordering::Less => return false,
                Ordering::Equal if !self.lower_inclusive => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match version.cmp(upper) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.upper_inclusive => return false,
                _ => {}
            }
        }
        true
    }
}

/// A parsed version-range expression.
///
/// A bare version like `1.0` is a soft pin; bracketed intervals such as
/// `(,2.0)` or `[1.0,2.0)` restrict the acceptable set, and several
/// intervals may be combined with commas.
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// The expression as given.
    spec:         String,
    /// The softly pinned version, when no intervals were given.
    recommended:  Option<ArtifactVersion>,
    /// The bracketed intervals, in declaration order.
    restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// Parses a range expression, failing on malformed syntax.
    pub fn parse(spec: &str) -> Result<Self, ReportError> {
        let mut restrictions = Vec::new();
        let mut process = spec.trim();

        while process.starts_with('[') || process.starts_with('(') {
            let end = match (process.find(')'), process.find(']')) {
                (None, None) => return Err(invalid(spec, "unbounded range")),
                (Some(round), None) => round,
                (None, Some(square)) => square,
                (Some(round), Some(square)) => round.min(square),
            };

            restrictions.push(Restriction::parse(&process[..=end], spec)?);

            process = process[end + 1..].trim_start();
            if let Some(rest) = process.strip_prefix(',') {
                process = rest.trim_start();
            } else if !process.is_empty() {
                return Err(invalid(spec, "expected ',' between ranges"));
            }
        }

        if restrictions.is_empty() {
            if process.is_empty() {
                return Err(invalid(spec, "empty version specification"));
            }
            return Ok(Self {
                spec:         spec.to_string(),
                recommended:  Some(ArtifactVersion::new(process)),
                restrictions,
            });
        }

        if !process.is_empty() {
            return Err(invalid(spec, "trailing text after ranges"));
        }

        Ok(Self {
            spec: spec.to_string(),
            recommended: None,
            restrictions,
        })
    }

    /// The exact version this expression pins, when it is a soft pin rather
    /// than a set of intervals.
    pub fn pinned_version(&self) -> Option<&ArtifactVersion> {
        self.recommended.as_ref()
    }

    /// Whether the given version satisfies this range.
    pub fn matches(&self, version: &ArtifactVersion) -> bool {
        if self.restrictions.is_empty() {
            return self
                .recommended
                .as_ref()
                .is_some_and(|recommended| version >= recommended);
        }
        self.restrictions
            .iter()
            .any(|restriction| restriction.contains(version))
    }

    /// Selects the highest available version satisfying this range.
    pub fn match_version<'a>(
        &self,
        available: &'a [ArtifactVersion],
    ) -> Option<&'a ArtifactVersion> {
        available.iter().filter(|v| self.matches(v)).max()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

/// Shorthand for the malformed-range error.
fn invalid(spec: &str, reason: &str) -> ReportError {
    ReportError::InvalidVersionConstraint {
        spec:   spec.to_string(),
        reason: reason.to_string(),
    }
}

/// A concrete version selected for comparison, immutable once chosen.
#[derive(Debug, Clone)]
pub struct ResolvedVersion {
    /// Coordinates the version belongs to.
    coordinates: Coordinates,
    /// The selected version.
    version:     ArtifactVersion,
}

impl ResolvedVersion {
    /// Coordinates the version belongs to.
    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    /// The selected version.
    pub fn version(&self) -> &ArtifactVersion {
        &self.version
    }

    /// The version rendered as the tag identifying one side of the report.
    pub fn tag(&self) -> String {
        self.version.to_string()
    }
}

/// Source of published-version information for a set of coordinates.
pub trait VersionMetadata {
    /// All published versions for the coordinates, unfiltered.
    fn available_versions(&self, coordinates: &Coordinates) -> Result<Vec<ArtifactVersion>>;
}

/// How the comparison side of the report resolved.
#[derive(Debug)]
pub enum Resolution {
    /// The requested version is the current project version; no remote
    /// lookup happened and the current tree is compared against itself.
    CurrentTree,
    /// A concrete prior version was selected.
    Prior(ResolvedVersion),
    /// The constraint legitimately matched nothing, e.g. a first release.
    NoPriorVersion,
}

/// Resolves the version to compare against.
///
/// A constraint textually equal to the current version skips remote
/// resolution entirely. A soft pin is used directly. Otherwise the published
/// versions are queried, snapshot-qualified candidates are dropped, and the
/// highest version matching the range wins; an empty match is not an error.
pub fn resolve_comparison(
    spec: &str,
    current_version: &str,
    coordinates: &Coordinates,
    metadata: &dyn VersionMetadata,
) -> Result<Resolution, ReportError> {
    if spec == current_version {
        debug!("Comparison version equals the project version, using the current tree");
        return Ok(Resolution::CurrentTree);
    }

    let range = VersionRange::parse(spec)?;

    if let Some(pinned) = range.pinned_version() {
        return Ok(Resolution::Prior(ResolvedVersion {
            coordinates: coordinates.clone(),
            version:     pinned.clone(),
        }));
    }

    debug!("Searching for versions in range: {range}");
    let mut available = metadata
        .available_versions(coordinates)
        .context("Error determining previous version")?;
    available.retain(|version| !version.is_snapshot());

    match range.match_version(&available) {
        Some(version) => {
            debug!("Previous version: {version}");
            Ok(Resolution::Prior(ResolvedVersion {
                coordinates: coordinates.clone(),
                version:     version.clone(),
            }))
        }
        None => Ok(Resolution::NoPriorVersion),
    }
}

/// Version metadata read from a Maven-layout repository directory on disk,
/// where each published version of an artifact owns a subdirectory under
/// `<root>/<group-as-path>/<artifact>/`.
#[derive(Debug, Clone)]
pub struct LocalRepositoryMetadata {
    /// Repository root, e.g. `~/.m2/repository`.
    root: PathBuf,
}

impl LocalRepositoryMetadata {
    /// Creates a metadata source rooted at the given repository directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the version subdirectories of an artifact.
    fn artifact_dir(&self, coordinates: &Coordinates) -> PathBuf {
        let mut dir = self.root.clone();
        for part in coordinates.group_id.split('.') {
            dir.push(part);
        }
        dir.push(&coordinates.artifact_id);
        dir
    }
}

impl VersionMetadata for LocalRepositoryMetadata {
    fn available_versions(&self, coordinates: &Coordinates) -> Result<Vec<ArtifactVersion>> {
        let dir = self.artifact_dir(coordinates);
        if !dir.is_dir() {
            // nothing published yet
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in
            fs::read_dir(&dir).with_context(|| format!("Could not list {}", dir.display()))?
        {
            let entry = entry.with_context(|| format!("Could not list {}", dir.display()))?;
            if entry.path().is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                versions.push(ArtifactVersion::new(name));
            }
        }
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_components_and_qualifier() {
        let version = ArtifactVersion::new("1.2.3-SNAPSHOT");
        assert_eq!(version.qualifier(), Some("SNAPSHOT"));
        assert!(version.is_snapshot());
        assert_eq!(version.to_string(), "1.2.3-SNAPSHOT");
    }

    #[test]
    fn build_numbers_are_numeric_not_qualifiers() {
        let version = ArtifactVersion::new("1.0-2");
        assert_eq!(version.qualifier(), None);
        assert!(ArtifactVersion::new("1.0-1") < version);
    }

    #[test]
    fn qualified_version_precedes_release() {
        assert!(ArtifactVersion::new("1.0-SNAPSHOT") < ArtifactVersion::new("1.0"));
        assert!(ArtifactVersion::new("1.0") < ArtifactVersion::new("1.1"));
        assert!(ArtifactVersion::new("1.9") < ArtifactVersion::new("1.10"));
    }

    #[test]
    fn unparseable_version_becomes_qualifier() {
        let version = ArtifactVersion::new("not-a-version");
        assert_eq!(version.qualifier(), Some("not-a-version"));
        assert!(version < ArtifactVersion::new("0.1"));
    }

    #[test]
    fn open_below_range_matches() {
        let range = VersionRange::parse("(,2.0)").expect("parse range");
        assert!(range.matches(&ArtifactVersion::new("1.0")));
        assert!(range.matches(&ArtifactVersion::new("1.9.9")));
        assert!(!range.matches(&ArtifactVersion::new("2.0")));
        assert!(!range.matches(&ArtifactVersion::new("2.1")));
    }

    #[test]
    fn closed_range_honors_bounds() {
        let range = VersionRange::parse("[1.0,2.0)").expect("parse range");
        assert!(range.matches(&ArtifactVersion::new("1.0")));
        assert!(range.matches(&ArtifactVersion::new("1.5")));
        assert!(!range.matches(&ArtifactVersion::new("0.9")));
        assert!(!range.matches(&ArtifactVersion::new("2.0")));
    }

    #[test]
    fn union_of_ranges() {
        let range = VersionRange::parse("[1.0,1.5],[2.0,)").expect("parse range");
        assert!(range.matches(&ArtifactVersion::new("1.2")));
        assert!(!range.matches(&ArtifactVersion::new("1.8")));
        assert!(range.matches(&ArtifactVersion::new("2.4")));
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        for spec in ["[1.0", "(,2.0", "(1.0)", "[1.0,2.0)x", "[2.0,1.0]", ""] {
            let result = VersionRange::parse(spec);
            assert!(
                matches!(result, Err(ReportError::InvalidVersionConstraint { .. })),
                "expected {spec:?} to be rejected"
            );
        }
    }

    #[test]
    fn soft_pin_is_reported_as_pinned() {
        let range = VersionRange::parse("1.0").expect("parse soft pin");
        assert_eq!(
            range.pinned_version().map(ToString::to_string),
            Some("1.0".to_string())
        );

        let range = VersionRange::parse("[1.0,2.0)").expect("parse range");
        assert!(range.pinned_version().is_none());
    }

    #[test]
    fn match_version_picks_highest() {
        let range = VersionRange::parse("(,2.0)").expect("parse range");
        let available: Vec<_> = ["0.9", "1.0", "1.5", "2.5"]
            .iter()
            .map(|v| ArtifactVersion::new(v))
            .collect();
        let selected = range.match_version(&available).expect("a match");
        assert_eq!(selected.to_string(), "1.5");
    }
}
