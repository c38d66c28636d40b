//! Screening dimensions.

use serde::{Deserialize, Serialize};

/// A mental-health dimension a question measures.
///
/// Declaration order is significant: recommendations are emitted in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Depression,
    Anxiety,
    Stress,
    Sleep,
    Social,
    Physical,
    /// Derived from every other answer; questions are normally not tagged with it.
    Wellbeing,
}

impl Category {
    /// Categories that hold summed answer scores, in declaration order.
    pub const SCORED: [Category; 6] = [
        Category::Depression,
        Category::Anxiety,
        Category::Stress,
        Category::Sleep,
        Category::Social,
        Category::Physical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Depression => "depression",
            Category::Anxiety => "anxiety",
            Category::Stress => "stress",
            Category::Sleep => "sleep",
            Category::Social => "social",
            Category::Physical => "physical",
            Category::Wellbeing => "wellbeing",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
