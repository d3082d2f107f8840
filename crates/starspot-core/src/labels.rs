//! Score-to-name mapping.
//!
//! The classifier produces one scalar per face; each integer 0..29 is the
//! class index of one celebrity, so the score is bucketed into unit-width
//! bins centered on those integers. Scores outside every bin map to no
//! label at all.

use serde::Serialize;

/// The 30 names the model was trained on, indexed by class. Index 13 is the
/// model's own "not recognized" class and is kept as a regular entry.
const CELEBRITY_NAMES: [&str; 30] = [
    "Courtney Cox",
    "Anord Schwarzeneggar",
    "Bhuvan Bam",
    "Hardik Pandya",
    "David Schwimmer",
    "Matt LeBlanc",
    "Simon Helberg",
    "Scarlett Johnson",
    "Pankaj Tripathi",
    "Mathew Perry",
    "Sylvester Stallone",
    "Messi",
    "Jim Parsons",
    "Not in Dataset",
    "Lisa Kudrow",
    "Mohamed Ali",
    "Brad Pit",
    "Ronaldo",
    "Virat Kohli",
    "Angelina Jolie",
    "KunalNayya",
    "Monaje Bajpayee",
    "Sachin Tundulka",
    "Jennifer Aniston",
    "Dhoni",
    "Pewdiepie",
    "Aishwarya Rai",
    "Johnny Galeck",
    "Rohit Sharma",
    "Suresh Raina",
];

/// Half-open score bin `[lower, upper)` mapped to one label.
#[derive(Debug, Clone, Serialize)]
pub struct LabelBin {
    pub lower: f32,
    pub upper: f32,
    pub label: &'static str,
}

/// Ordered, non-overlapping sequence of score bins. Built once at startup,
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct LabelTable {
    bins: Vec<LabelBin>,
}

impl LabelTable {
    pub fn new(bins: Vec<LabelBin>) -> Self {
        Self { bins }
    }

    /// The fixed celebrity table: bin k covers `[k - 0.5, k + 0.5)`, except
    /// the first which starts at 0.0 (negative scores are unmapped).
    pub fn celebrities() -> Self {
        let bins = CELEBRITY_NAMES
            .iter()
            .enumerate()
            .map(|(k, &label)| {
                let center = k as f32;
                LabelBin {
                    lower: if k == 0 { 0.0 } else { center - 0.5 },
                    upper: center + 0.5,
                    label,
                }
            })
            .collect();
        Self { bins }
    }

    /// Look up the label for a score. `None` when the score falls outside
    /// every bin; callers render that as an empty label.
    ///
    /// Bins are lower-inclusive: a score sitting exactly on a boundary
    /// belongs to the higher bin.
    pub fn label_for(&self, score: f32) -> Option<&str> {
        self.bins
            .iter()
            .find(|bin| bin.lower <= score && score < bin.upper)
            .map(|bin| bin.label)
    }

    pub fn bins(&self) -> &[LabelBin] {
        &self.bins
    }
}
