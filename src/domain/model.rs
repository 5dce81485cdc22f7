use serde::{Deserialize, Serialize};

/// Categories of timetable slots offered per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotType {
    /// Practical lab.
    Pl,
    /// Theoretical-practical.
    Tp,
    /// Theoretical.
    T,
}

impl SlotType {
    pub const ALL: [SlotType; 3] = [SlotType::Pl, SlotType::Tp, SlotType::T];

    /// The marker the portal prefixes slot labels and input names with.
    pub fn marker(&self) -> &'static str {
        match self {
            SlotType::Pl => "PL",
            SlotType::Tp => "TP",
            SlotType::T => "T",
        }
    }
}

impl std::fmt::Display for SlotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// One row of the preference table, normalized: the canonical class id and up
/// to three ordered slot-number preference lists. An absent list means no
/// preference was requested for that slot type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPreference {
    pub class_id: String,
    pub pl: Option<Vec<String>>,
    pub tp: Option<Vec<String>>,
    pub t: Option<Vec<String>>,
}

impl ClassPreference {
    pub fn preferences(&self, slot_type: SlotType) -> Option<&[String]> {
        match slot_type {
            SlotType::Pl => self.pl.as_deref(),
            SlotType::Tp => self.tp.as_deref(),
            SlotType::T => self.t.as_deref(),
        }
    }
}

/// A class discovered on the track's live listing page. A `None` href means
/// the class was listed but is not currently open for enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentTarget {
    pub class_id: String,
    pub class_name: String,
    pub href: Option<String>,
}

/// Availability of one slot row, read from its selection input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Selectable,
    FullOrMandatory,
    AlreadyEnrolled,
}

/// Transient view of one slot row during a slot-type pass.
#[derive(Debug, Clone)]
pub struct SlotRow<E> {
    pub slot_number: String,
    pub availability: Availability,
    pub input: E,
}

/// One committed (or dry-run simulated) choice. The accumulated sequence is
/// the run's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickResult {
    pub class_name: String,
    pub slot_type: SlotType,
    pub slot_number: String,
}
