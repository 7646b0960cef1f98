//! Request criteria: the attribute values one checkout or renewal is
//! matched on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A matchable attribute of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    MaterialType,
    LoanType,
    PatronGroup,
    Institution,
    Campus,
    Library,
    ShelvingLocation,
}

impl Dimension {
    pub fn all() -> &'static [Dimension] {
        &[
            Self::MaterialType,
            Self::LoanType,
            Self::PatronGroup,
            Self::Institution,
            Self::Campus,
            Self::Library,
            Self::ShelvingLocation,
        ]
    }

    /// Letter used in rule text.
    pub fn letter(&self) -> char {
        match self {
            Self::MaterialType => 'm',
            Self::LoanType => 't',
            Self::PatronGroup => 'g',
            Self::Institution => 'a',
            Self::Campus => 'b',
            Self::Library => 'c',
            Self::ShelvingLocation => 's',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::all().iter().copied().find(|d| d.letter() == letter)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MaterialType => "material type",
            Self::LoanType => "loan type",
            Self::PatronGroup => "patron group",
            Self::Institution => "institution",
            Self::Campus => "campus",
            Self::Library => "library",
            Self::ShelvingLocation => "shelving location",
        };
        f.write_str(s)
    }
}

/// Location hierarchy of the item's effective shelving location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub institution: String,
    pub campus: String,
    pub library: String,
    pub shelving_location: String,
}

impl Location {
    pub fn new(
        institution: impl Into<String>,
        campus: impl Into<String>,
        library: impl Into<String>,
        shelving_location: impl Into<String>,
    ) -> Self {
        Self {
            institution: institution.into(),
            campus: campus.into(),
            library: library.into(),
            shelving_location: shelving_location.into(),
        }
    }
}

/// The values a rule set is matched against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCriteria {
    pub material_type: String,
    pub loan_type: String,
    pub patron_group: String,
    #[serde(default)]
    pub location: Location,
}

impl RuleCriteria {
    pub fn new(
        material_type: impl Into<String>,
        loan_type: impl Into<String>,
        patron_group: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            material_type: material_type.into(),
            loan_type: loan_type.into(),
            patron_group: patron_group.into(),
            location,
        }
    }

    pub fn value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::MaterialType => &self.material_type,
            Dimension::LoanType => &self.loan_type,
            Dimension::PatronGroup => &self.patron_group,
            Dimension::Institution => &self.location.institution,
            Dimension::Campus => &self.location.campus,
            Dimension::Library => &self.location.library,
            Dimension::ShelvingLocation => &self.location.shelving_location,
        }
    }
}

impl fmt::Display for RuleCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Dimension::all()
            .iter()
            .map(|d| format!("{} {}", d.letter(), self.value(*d)))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
