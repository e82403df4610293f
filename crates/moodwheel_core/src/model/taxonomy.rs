//! Emotion taxonomy (core -> secondary -> tertiary).
//!
//! # Responsibility
//! - Hold the hand-authored three-level emotion wheel with display colors.
//! - Provide pure lookups used by wizard validation and rendering.
//!
//! # Invariants
//! - Data is `'static` and never mutated.
//! - Every secondary belongs to exactly one core; every tertiary label belongs
//!   to exactly one secondary of that core.
//! - Lookup order is the authored order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static UPPERCASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z])").expect("valid uppercase regex"));

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

/// Lookup failure for ids absent from the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    CoreNotFound(String),
    SecondaryNotFound {
        core: String,
        secondary: String,
    },
    TertiaryNotFound {
        core: String,
        secondary: String,
        tertiary: String,
    },
}

impl Display for TaxonomyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoreNotFound(core) => write!(f, "unknown core emotion `{core}`"),
            Self::SecondaryNotFound { core, secondary } => {
                write!(f, "unknown secondary emotion `{secondary}` under `{core}`")
            }
            Self::TertiaryNotFound {
                core,
                secondary,
                tertiary,
            } => write!(
                f,
                "unknown tertiary emotion `{tertiary}` under `{core}/{secondary}`"
            ),
        }
    }
}

impl Error for TaxonomyError {}

/// Leaf-carrying second level of the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecondaryEmotion {
    pub id: &'static str,
    /// Wedge fill color (`#RRGGBB`).
    pub color: &'static str,
    /// Ordered tertiary labels; these are leaves, not nodes.
    pub tertiaries: &'static [&'static str],
}

/// Top level of the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoreEmotion {
    pub id: &'static str,
    pub color: &'static str,
    /// Fill used for the core wheel, summary swatches and history badges.
    pub inner_color: &'static str,
    pub secondaries: &'static [SecondaryEmotion],
}

impl CoreEmotion {
    /// Finds one secondary by id within this core.
    pub fn secondary(&self, id: &str) -> Option<&'static SecondaryEmotion> {
        self.secondaries.iter().find(|secondary| secondary.id == id)
    }
}

/// Read-only emotion taxonomy.
#[derive(Debug)]
pub struct EmotionTaxonomy {
    cores: &'static [CoreEmotion],
}

/// Returns the process-wide standard taxonomy.
pub fn taxonomy() -> &'static EmotionTaxonomy {
    &STANDARD_TAXONOMY
}

impl EmotionTaxonomy {
    /// All core emotions in authored order.
    pub fn cores(&self) -> &'static [CoreEmotion] {
        self.cores
    }

    pub fn core_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cores.iter().map(|core| core.id)
    }

    pub fn core(&self, core: &str) -> TaxonomyResult<&'static CoreEmotion> {
        self.cores
            .iter()
            .find(|candidate| candidate.id == core)
            .ok_or_else(|| TaxonomyError::CoreNotFound(core.to_string()))
    }

    pub fn secondary(
        &self,
        core: &str,
        secondary: &str,
    ) -> TaxonomyResult<&'static SecondaryEmotion> {
        self.core(core)?
            .secondary(secondary)
            .ok_or_else(|| TaxonomyError::SecondaryNotFound {
                core: core.to_string(),
                secondary: secondary.to_string(),
            })
    }

    /// Ordered secondary ids under `core`.
    pub fn children(&self, core: &str) -> TaxonomyResult<Vec<&'static str>> {
        Ok(self
            .core(core)?
            .secondaries
            .iter()
            .map(|secondary| secondary.id)
            .collect())
    }

    /// Ordered tertiary labels under `core/secondary`.
    pub fn tertiaries(
        &self,
        core: &str,
        secondary: &str,
    ) -> TaxonomyResult<&'static [&'static str]> {
        Ok(self.secondary(core, secondary)?.tertiaries)
    }

    pub fn color_of(&self, core: &str) -> TaxonomyResult<&'static str> {
        Ok(self.core(core)?.color)
    }

    pub fn inner_color_of(&self, core: &str) -> TaxonomyResult<&'static str> {
        Ok(self.core(core)?.inner_color)
    }

    pub fn color_of_secondary(&self, core: &str, secondary: &str) -> TaxonomyResult<&'static str> {
        Ok(self.secondary(core, secondary)?.color)
    }

    /// Checks that `tertiary` is a leaf of `core/secondary`.
    pub fn validate_path(&self, core: &str, secondary: &str, tertiary: &str) -> TaxonomyResult<()> {
        let leaves = self.tertiaries(core, secondary)?;
        if leaves.contains(&tertiary) {
            return Ok(());
        }
        Err(TaxonomyError::TertiaryNotFound {
            core: core.to_string(),
            secondary: secondary.to_string(),
            tertiary: tertiary.to_string(),
        })
    }

    pub fn contains_path(&self, core: &str, secondary: &str, tertiary: &str) -> bool {
        self.validate_path(core, secondary, tertiary).is_ok()
    }
}

/// Humanizes a camelCase id for display (`letDown` -> `let Down`).
pub fn display_label(id: &str) -> String {
    UPPERCASE_RE.replace_all(id, " $1").trim().to_string()
}

const fn secondary(
    id: &'static str,
    color: &'static str,
    tertiaries: &'static [&'static str],
) -> SecondaryEmotion {
    SecondaryEmotion {
        id,
        color,
        tertiaries,
    }
}

static STANDARD_TAXONOMY: EmotionTaxonomy = EmotionTaxonomy {
    cores: &[
        CoreEmotion {
            id: "happy",
            color: "#FF9500",
            inner_color: "#FFA500",
            secondaries: &[
                secondary("optimistic", "#FFA500", &["Inspired", "Hopeful"]),
                secondary("trusting", "#FFB52E", &["Intimate", "Sensitive"]),
                secondary("proud", "#FFC04C", &["Successful", "Confident"]),
                secondary("excited", "#FFCC66", &["Eager", "Energetic"]),
                secondary("content", "#FFD580", &["Free", "Joyful"]),
                secondary("playful", "#FFE0A3", &["Cheeky", "Amused"]),
                secondary("accepted", "#FFEBC2", &["Respected", "Valued"]),
            ],
        },
        CoreEmotion {
            id: "sad",
            color: "#483D8B",
            inner_color: "#4B0082",
            secondaries: &[
                secondary("lonely", "#4A368A", &["Isolated", "Abandoned"]),
                secondary("vulnerable", "#4D3091", &["Victimized", "Fragile"]),
                secondary("despair", "#512B9C", &["Powerless", "Grief"]),
                secondary("guilty", "#5626A7", &["Remorseful", "Ashamed"]),
                secondary("depressed", "#5C22B4", &["Empty", "Inferior"]),
                secondary("hurt", "#631DC1", &["Disappointed", "Embarrassed"]),
            ],
        },
        CoreEmotion {
            id: "disgusted",
            color: "#A0522D",
            inner_color: "#8B4513",
            secondaries: &[
                secondary("disapproving", "#9A4E2A", &["Judgemental", "Critical"]),
                secondary("disappointed", "#8F4A27", &["Appalled", "Revolted"]),
                secondary("awful", "#834623", &["Detestable", "Nauseated"]),
                secondary("repelled", "#79421F", &["Avoidant", "Hesitant"]),
            ],
        },
        CoreEmotion {
            id: "angry",
            color: "#FF0066",
            inner_color: "#FF1493",
            secondaries: &[
                secondary("letDown", "#FF0066", &["Resentful", "Betrayed"]),
                secondary("humiliated", "#FF1A75", &["Disrespected", "Ridiculed"]),
                secondary("bitter", "#FF3385", &["Indignant", "Mad"]),
                secondary("aggressive", "#FF4D94", &["Provoked", "Frustrated"]),
                secondary("frustrated", "#FF66A3", &["Annoyed", "Distant"]),
                secondary("critical", "#FF80B2", &["Skeptical", "Dismissive"]),
            ],
        },
        CoreEmotion {
            id: "fearful",
            color: "#8A2BE2",
            inner_color: "#4B0082",
            secondaries: &[
                secondary("scared", "#8533E0", &["Helpless", "Frightened"]),
                secondary("anxious", "#7A3BD6", &["Overwhelmed", "Worried"]),
                secondary("insecure", "#6F42CC", &["Inferior", "Worthless"]),
                secondary("weak", "#644AC3", &["Insignificant", "Inadequate"]),
                secondary("rejected", "#5A52B9", &["Alienated", "Isolated"]),
                secondary("threatened", "#4F59AF", &["Nervous", "Exposed"]),
            ],
        },
        CoreEmotion {
            id: "bad",
            color: "#6A5ACD",
            inner_color: "#6959CD",
            secondaries: &[
                secondary("bored", "#6A5ACD", &["Indifferent", "Apathetic"]),
                secondary("busy", "#7363D1", &["Pressured", "Rushed"]),
                secondary("stressed", "#7D6CD6", &["Overwhelmed", "Anxious"]),
                secondary("tired", "#8675DB", &["Sleepy", "Unfocussed"]),
            ],
        },
        CoreEmotion {
            id: "surprised",
            color: "#2AAA8A",
            inner_color: "#2E8B57",
            secondaries: &[
                secondary("startled", "#2AAA8A", &["Shocked", "Dismayed"]),
                secondary("confused", "#33B594", &["Disillusioned", "Perplexed"]),
                secondary("amazed", "#3CBF9E", &["Awed", "Astonished"]),
                secondary("excited", "#46CAA8", &["Energetic", "Eager"]),
            ],
        },
    ],
};
