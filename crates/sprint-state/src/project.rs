//! Project catalog and project selection
//!
//! Provides:
//! - [`Project`] metadata as served in `projects_meta.json`
//! - [`ProjectGroup`] symbolic tokens (`~all`, `~team`, ...) used in links
//! - [`ProjectsState`] with the selected/visible/invisible/team sets

use crate::ordered_set::OrderedSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Team marker of a project
///
/// Upstream metadata uses either a boolean or a numeric team id. The id
/// `-1` marks a project that may be selected but is never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamMarker {
    /// Plain flag
    Flag(bool),
    /// Numeric team id
    Id(i64),
}

impl TeamMarker {
    /// Id marking an invisible project
    pub const INVISIBLE: i64 = -1;

    /// Whether the marker denotes a team (any true flag or non-zero id)
    #[inline]
    #[must_use]
    pub fn is_team(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Id(id) => id != 0,
        }
    }

    /// Whether the project is hidden from display
    #[inline]
    #[must_use]
    pub fn is_invisible(self) -> bool {
        self == Self::Id(Self::INVISIBLE)
    }
}

impl Default for TeamMarker {
    fn default() -> Self {
        Self::Flag(false)
    }
}

/// Project metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project key, used in URLs and data paths
    pub name: String,
    /// Display name in the quality dashboard, if different
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_display_name: Option<String>,
    /// Team marker
    #[serde(default)]
    pub team: TeamMarker,
    /// Project has recent sprints
    #[serde(default)]
    pub recent: bool,
    /// Project is a core (non-support) project
    #[serde(default)]
    pub core: bool,
    /// Project is accessible to the current viewer
    #[serde(default = "default_accessible")]
    pub accessible: bool,
    /// Real projects aggregated by this team project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_names: Option<Vec<String>>,
}

fn default_accessible() -> bool {
    true
}

impl Project {
    /// Create plain project with default flags
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quality_display_name: None,
            team: TeamMarker::default(),
            recent: false,
            core: false,
            accessible: true,
            project_names: None,
        }
    }

    /// Mark as recent
    #[inline]
    #[must_use]
    pub fn recent(mut self) -> Self {
        self.recent = true;
        self
    }

    /// Mark as core
    #[inline]
    #[must_use]
    pub fn core(mut self) -> Self {
        self.core = true;
        self
    }

    /// With team marker
    #[inline]
    #[must_use]
    pub fn with_team(mut self, team: TeamMarker) -> Self {
        self.team = team;
        self
    }

    /// With aggregated project names (team aggregate)
    #[must_use]
    pub fn with_project_names(mut self, names: &[&str]) -> Self {
        self.project_names = Some(names.iter().map(|name| (*name).to_string()).collect());
        self
    }

    /// Name to show to users
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.quality_display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Symbolic project group usable in place of project names in a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectGroup {
    /// Every known project
    All,
    /// Recent team projects
    Team,
    /// Recent team projects the viewer can access
    Accessible,
    /// Recent core projects
    Recent,
    /// Non-core projects
    Support,
}

impl ProjectGroup {
    /// Token as written in a link
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::All => "~all",
            Self::Team => "~team",
            Self::Accessible => "~accessible",
            Self::Recent => "~recent",
            Self::Support => "~support",
        }
    }

    /// Whether a project belongs to this group
    #[must_use]
    pub fn contains(self, project: &Project) -> bool {
        match self {
            Self::All => true,
            Self::Team => project.recent && project.team.is_team(),
            Self::Accessible => project.recent && project.team.is_team() && project.accessible,
            Self::Recent => project.recent && project.core,
            Self::Support => !project.core,
        }
    }
}

impl FromStr for ProjectGroup {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "~all" => Ok(Self::All),
            "~team" => Ok(Self::Team),
            "~accessible" => Ok(Self::Accessible),
            "~recent" => Ok(Self::Recent),
            "~support" => Ok(Self::Support),
            _ => Err(()),
        }
    }
}

/// Project selection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectsState {
    /// Known project names, in catalog order
    pub known: Vec<String>,
    /// Project metadata, in catalog order
    pub meta: Vec<Project>,
    /// Selected projects
    pub selected: OrderedSet<String>,
    /// Selected projects that are drawn (`selected - invisible`)
    pub visible: OrderedSet<String>,
    /// Projects never drawn
    pub invisible: OrderedSet<String>,
    /// Team projects
    pub teams: OrderedSet<String>,
}

impl ProjectsState {
    /// Create state from catalog metadata with nothing selected
    #[must_use]
    pub fn new(meta: Vec<Project>) -> Self {
        let known = meta.iter().map(|project| project.name.clone()).collect();
        let invisible = meta
            .iter()
            .filter(|project| project.team.is_invisible())
            .map(|project| project.name.clone())
            .collect();
        let teams = meta
            .iter()
            .filter(|project| project.team.is_team() && !project.team.is_invisible())
            .map(|project| project.name.clone())
            .collect();

        Self {
            known,
            meta,
            selected: OrderedSet::new(),
            visible: OrderedSet::new(),
            invisible,
            teams,
        }
    }

    /// Look up project metadata
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.meta.iter().find(|project| project.name == name)
    }

    /// Known projects as a set
    #[must_use]
    pub fn known_set(&self) -> OrderedSet<String> {
        self.known.iter().cloned().collect()
    }

    /// Names of the projects in a symbolic group, in catalog order
    #[must_use]
    pub fn group(&self, group: ProjectGroup) -> Vec<String> {
        self.meta
            .iter()
            .filter(|project| group.contains(project))
            .map(|project| project.name.clone())
            .collect()
    }

    /// Expand a link token into project names
    ///
    /// Symbolic group tokens expand to their members; anything else is taken
    /// as a literal project name (which may still be unknown).
    #[must_use]
    pub fn resolve_token(&self, token: &str) -> Vec<String> {
        match token.parse::<ProjectGroup>() {
            Ok(group) => self.group(group),
            Err(()) => vec![token.to_string()],
        }
    }

    /// Replace the selection, dropping unknown projects
    pub fn select(&mut self, selected: &OrderedSet<String>) {
        let unknown = selected.subtract(&self.known_set());
        if !unknown.is_empty() {
            tracing::debug!("Dropping unknown projects: {:?}", unknown);
        }
        self.selected = selected.intersect(&self.known_set());
        self.visible = self.selected.subtract(&self.invisible);
    }

    /// Update which projects the viewer can access
    ///
    /// Called when the login/permission context changes. Not part of links.
    pub fn set_accessible(&mut self, accessible: &OrderedSet<String>) {
        for project in &mut self.meta {
            project.accessible = accessible.has(project.name.as_str());
        }
    }
}
