//! The closed set of corn-leaf condition classes.
//!
//! The classifier was trained with a label encoding that sorts the original
//! label strings alphabetically, so the variant order here is a contract
//! with the persisted model and must never change:
//! index 0 = "Daun Rusak", 1 = "Daun Sehat", 2 = "Hawar Daun",
//! 3 = "Karat Daun".

use serde::{Deserialize, Serialize};

/// Number of condition classes the model distinguishes.
pub const CLASS_COUNT: usize = 4;

/// Condition class of a corn leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafClass {
    /// Mechanically or physically damaged leaf ("Daun Rusak").
    Damaged,
    /// Healthy leaf without disease symptoms ("Daun Sehat").
    Healthy,
    /// Northern leaf blight ("Hawar Daun").
    Blight,
    /// Common rust ("Karat Daun").
    Rust,
}

impl LeafClass {
    /// All classes in model output order.
    pub const ALL: [LeafClass; CLASS_COUNT] = [
        LeafClass::Damaged,
        LeafClass::Healthy,
        LeafClass::Blight,
        LeafClass::Rust,
    ];

    /// Returns the class for a model output index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the model output index of this class.
    pub fn index(self) -> usize {
        match self {
            LeafClass::Damaged => 0,
            LeafClass::Healthy => 1,
            LeafClass::Blight => 2,
            LeafClass::Rust => 3,
        }
    }

    /// Returns the display label the model was trained against.
    pub fn label(self) -> &'static str {
        match self {
            LeafClass::Damaged => "Daun Rusak",
            LeafClass::Healthy => "Daun Sehat",
            LeafClass::Blight => "Hawar Daun",
            LeafClass::Rust => "Karat Daun",
        }
    }

    /// Returns the class matching a display label, if any.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Returns the hex theme color used when presenting this class.
    pub fn color(self) -> &'static str {
        match self {
            LeafClass::Damaged => "#ef4444",
            LeafClass::Healthy => "#22c55e",
            LeafClass::Blight => "#f59e0b",
            LeafClass::Rust => "#a855f7",
        }
    }

    /// Returns a short description of the leaf condition.
    pub fn description(self) -> &'static str {
        match self {
            LeafClass::Damaged => "Leaf shows physical or mechanical damage.",
            LeafClass::Healthy => "Leaf is healthy with no signs of disease.",
            LeafClass::Blight => {
                "Northern leaf blight, caused by the fungus Exserohilum turcicum."
            }
            LeafClass::Rust => "Common rust, caused by the fungus Puccinia sorghi.",
        }
    }
}

impl std::fmt::Display for LeafClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
