// src/evr.rs

//! EVR identity handling for graph nodes and dependency expressions
//!
//! The canonical identity of a package version is the `epoch:version-release`
//! string. Absent components are omitted together with their separators, and
//! a record without a `version` has no EVR identity at all. Ordering follows
//! the RPM convention: numeric epoch first, then version, then release.

use crate::error::{Error, Result};
use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// Render the canonical `epoch:version-release` string.
///
/// `epoch` and `release` are dropped along with their `:` / `-` separators
/// when absent. Callers must ensure `version` is present; identity assignment
/// is suppressed entirely for version-less records.
pub fn format_evr(version: &str, epoch: Option<&str>, release: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(e) = epoch {
        out.push_str(e);
        out.push(':');
    }
    out.push_str(version);
    if let Some(r) = release {
        out.push('-');
        out.push_str(r);
    }
    out
}

/// A parsed EVR identity with epoch, version, and release components
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Evr {
    pub epoch: u64,
    pub version: String,
    pub release: Option<String>,
}

impl Evr {
    /// Parse an `[epoch:]version[-release]` string.
    ///
    /// A missing or empty epoch defaults to 0. The version component is
    /// mandatory.
    pub fn parse(s: &str) -> Result<Self> {
        let (epoch, rest) = match s.split_once(':') {
            Some(("", rest)) => (0, rest),
            Some((e, rest)) => {
                let epoch = e.parse::<u64>().map_err(|err| {
                    Error::InvalidEvr(s.to_string(), format!("bad epoch: {}", err))
                })?;
                (epoch, rest)
            }
            None => (0, s),
        };

        let (version, release) = match rest.split_once('-') {
            Some((v, r)) => (v.to_string(), Some(r.to_string())),
            None => (rest.to_string(), None),
        };

        if version.is_empty() {
            return Err(Error::InvalidEvr(
                s.to_string(),
                "empty version component".to_string(),
            ));
        }

        Ok(Self {
            epoch,
            version,
            release,
        })
    }

    /// Best-effort semver view of the version component.
    ///
    /// Package versions are frequently not semver-compliant; in that case the
    /// leading dotted numeric segments are extracted so that at least the
    /// common `1.2` vs `1.10` shape orders numerically.
    fn semver_view(&self) -> Version {
        if let Ok(v) = Version::parse(&self.version) {
            return v;
        }
        let mut parts = self.version.split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let patch = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Version::new(major, minor, patch)
    }

    fn version_cmp(&self, other: &Evr) -> Ordering {
        let by_semver = self.semver_view().cmp(&other.semver_view());
        if by_semver != Ordering::Equal {
            return by_semver;
        }
        // Equal numeric views can still hide suffix differences (1.0 vs 1.0a)
        self.version.cmp(&other.version)
    }

    /// Ordering against a wanted EVR as written in a dependency expression.
    ///
    /// A wanted EVR without a release matches any release of the same
    /// epoch:version, so the provided release is ignored in that case.
    pub fn compare_against(&self, wanted: &Evr) -> Ordering {
        match self.epoch.cmp(&wanted.epoch) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.version_cmp(wanted) {
            Ordering::Equal => {}
            ord => return ord,
        }
        if wanted.release.is_none() {
            return Ordering::Equal;
        }
        self.release.cmp(&wanted.release)
    }
}

impl Ord for Evr {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.epoch.cmp(&other.epoch) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.version_cmp(other) {
            Ordering::Equal => {}
            ord => return ord,
        }
        self.release.cmp(&other.release)
    }
}

impl PartialOrd for Evr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Evr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(ref release) = self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

/// Compare a provided EVR string against a wanted one.
///
/// Unparseable strings fall back to a plain lexicographic comparison so a
/// malformed epoch in upstream metadata degrades instead of aborting a walk.
pub fn compare_evr(provided: &str, wanted: &str) -> Ordering {
    match (Evr::parse(provided), Evr::parse(wanted)) {
        (Ok(p), Ok(w)) => p.compare_against(&w),
        _ => provided.cmp(wanted),
    }
}
