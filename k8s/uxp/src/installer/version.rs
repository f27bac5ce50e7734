use crate::common::error::{InvalidVersion, Result};
use semver::Version;
use snafu::ResultExt;
use std::borrow::Cow;

/// Helm drops a leading 'v' from chart versions, so does the resolver.
pub fn trim_version_prefix(version: &str) -> &str {
    version.trim().strip_prefix('v').unwrap_or(version.trim())
}

/// Parses a chart version. A leading 'v' is ignored, and missing minor and patch numbers are
/// read as zero, e.g. 'v1.5' is 1.5.0.
pub fn parse(version: &str) -> Result<Version> {
    let trimmed = trim_version_prefix(version);
    Version::parse(complete_core(trimmed).as_ref()).context(InvalidVersion {
        version_string: version.to_string(),
    })
}

/// Two versions are equivalent if their major, minor and patch numbers match. Pre-release and
/// build metadata are not compared. Versions which cannot be parsed are never equivalent to
/// anything.
///
/// This decides if a crossplane release may be moved to a universal-crossplane chart, which
/// only differs from the matching crossplane release in its pre-release tag.
pub fn equivalent(current: &str, target: &str) -> bool {
    match (parse(current), parse(target)) {
        (Ok(current), Ok(target)) => {
            current.major == target.major
                && current.minor == target.minor
                && current.patch == target.patch
        }
        _ => false,
    }
}

/// Pads 'major' and 'major.minor' cores with '.0' components.
fn complete_core(version: &str) -> Cow<'_, str> {
    let core_end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(core_end);
    match core.matches('.').count() {
        0 if !core.is_empty() => Cow::Owned(format!("{core}.0.0{suffix}")),
        1 => Cow::Owned(format!("{core}.0{suffix}")),
        _ => Cow::Borrowed(version),
    }
}
