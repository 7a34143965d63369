use std::collections::HashSet;
use std::fmt::Display;

/// The four curated independent-specimen selections
///
/// Each selection contains at most one tumor specimen per participant. The
/// `AllCohorts*` selections are deduplicated across cohorts and apply to the
/// synthetic `all_cohorts` strata, the `EachCohort*` selections are
/// deduplicated within every cohort and apply to the real cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectionKind {
    /// Independent primary tumors, one per participant across all cohorts
    AllCohortsPrimary,
    /// Independent relapse tumors, one per participant across all cohorts
    AllCohortsRelapse,
    /// Independent primary tumors, one per participant within each cohort
    EachCohortPrimary,
    /// Independent relapse tumors, one per participant within each cohort
    EachCohortRelapse,
}

impl SelectionKind {
    /// All kinds, in declaration order
    pub const ALL: [SelectionKind; 4] = [
        SelectionKind::AllCohortsPrimary,
        SelectionKind::AllCohortsRelapse,
        SelectionKind::EachCohortPrimary,
        SelectionKind::EachCohortRelapse,
    ];

    /// Returns `true` for the selections that apply to the `all_cohorts` strata
    pub fn spans_all_cohorts(&self) -> bool {
        matches!(
            self,
            SelectionKind::AllCohortsPrimary | SelectionKind::AllCohortsRelapse
        )
    }

    /// Returns `true` for the primary tumor selections
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            SelectionKind::AllCohortsPrimary | SelectionKind::EachCohortPrimary
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl Display for SelectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SelectionKind::AllCohortsPrimary => "all_cohorts_primary",
            SelectionKind::AllCohortsRelapse => "all_cohorts_relapse",
            SelectionKind::EachCohortPrimary => "each_cohort_primary",
            SelectionKind::EachCohortRelapse => "each_cohort_relapse",
        };
        write!(f, "{name}")
    }
}

/// A named set of biospecimen IDs
#[derive(Debug, Clone)]
pub struct SelectionSet {
    kind: SelectionKind,
    ids: HashSet<String>,
}

impl SelectionSet {
    /// Constructs a new [`SelectionSet`] from biospecimen IDs
    ///
    /// Duplicate IDs are collapsed.
    pub fn new<I, S>(kind: SelectionKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Constructs an empty [`SelectionSet`]
    pub fn empty(kind: SelectionKind) -> Self {
        Self {
            kind,
            ids: HashSet::new(),
        }
    }

    /// The kind of the selection
    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    /// Returns `true` if the biospecimen is part of the selection
    pub fn contains(&self, biospecimen_id: &str) -> bool {
        self.ids.contains(biospecimen_id)
    }

    /// The number of biospecimens in the selection
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the selection does not contain any biospecimen
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One [`SelectionSet`] per [`SelectionKind`]
///
/// The default value holds four empty selections.
#[derive(Debug, Clone)]
pub struct SelectionSets {
    sets: [SelectionSet; 4],
}

impl Default for SelectionSets {
    fn default() -> Self {
        Self {
            sets: SelectionKind::ALL.map(SelectionSet::empty),
        }
    }
}

impl SelectionSets {
    /// Adds the selection, replacing a previous selection of the same kind
    pub fn insert(&mut self, set: SelectionSet) {
        let idx = set.kind.index();
        self.sets[idx] = set;
    }

    /// Returns the selection of the given kind
    pub fn get(&self, kind: SelectionKind) -> &SelectionSet {
        &self.sets[kind.index()]
    }

    /// Iterates all four selections
    pub fn iter(&self) -> std::slice::Iter<'_, SelectionSet> {
        self.sets.iter()
    }
}

impl FromIterator<SelectionSet> for SelectionSets {
    fn from_iter<T: IntoIterator<Item = SelectionSet>>(iter: T) -> Self {
        let mut sets = SelectionSets::default();
        for set in iter {
            sets.insert(set);
        }
        sets
    }
}
