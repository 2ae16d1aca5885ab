use std::fmt;

use crate::error::StoreError;

/// Which version of an artifact a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    Number(u32),
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Latest => write!(f, "latest"),
            VersionSelector::Number(n) => write!(f, "v{}", n),
        }
    }
}

/// Parsed artifact reference: `[entity/][project/]name[:version]`.
///
/// `version` is `latest` (the default), `vN` or a bare `N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub entity: Option<String>,
    pub project: Option<String>,
    pub name: String,
    pub version: VersionSelector,
}

impl ArtifactRef {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let invalid = || StoreError::InvalidReference(raw.to_string());
        let s = raw.trim();
        if s.is_empty() {
            return Err(invalid());
        }

        let (path, version) = match s.rsplit_once(':') {
            Some((path, v)) => (path, parse_version(v).ok_or_else(invalid)?),
            None => (s, VersionSelector::Latest),
        };

        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() > 3 || parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid());
        }

        let mut parts = parts.into_iter().rev();
        let name = parts.next().ok_or_else(invalid)?.to_string();
        let project = parts.next().map(str::to_string);
        let entity = parts.next().map(str::to_string);

        Ok(Self { entity, project, name, version })
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(entity) = &self.entity {
            write!(f, "{}/", entity)?;
        }
        if let Some(project) = &self.project {
            write!(f, "{}/", project)?;
        }
        write!(f, "{}:{}", self.name, self.version)
    }
}

fn parse_version(v: &str) -> Option<VersionSelector> {
    let v = v.trim();
    if v == "latest" {
        return Some(VersionSelector::Latest);
    }
    v.strip_prefix('v').unwrap_or(v).parse::<u32>().ok().map(VersionSelector::Number)
}
