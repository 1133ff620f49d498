use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::error::DetectError;

/// Index of the reserved background class in every vocabulary.
pub const BACKGROUND_ID: usize = 0;

/// PASCAL VOC labels, in the order the network's class columns are laid out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VocClass {
    Background,
    Aeroplane,
    Bicycle,
    Bird,
    Boat,
    Bottle,
    Bus,
    Car,
    Cat,
    Chair,
    Cow,
    DiningTable,
    Dog,
    Horse,
    Motorbike,
    Person,
    PottedPlant,
    Sheep,
    Sofa,
    Train,
    TvMonitor,
}

const VOC_NAMES: [&str; 21] = [
    "__background__",
    "aeroplane", "bicycle", "bird", "boat",
    "bottle", "bus", "car", "cat", "chair",
    "cow", "diningtable", "dog", "horse",
    "motorbike", "person", "pottedplant",
    "sheep", "sofa", "train", "tvmonitor",
];

impl VocClass {
    pub const ALL: [VocClass; 21] = [
        VocClass::Background,
        VocClass::Aeroplane,
        VocClass::Bicycle,
        VocClass::Bird,
        VocClass::Boat,
        VocClass::Bottle,
        VocClass::Bus,
        VocClass::Car,
        VocClass::Cat,
        VocClass::Chair,
        VocClass::Cow,
        VocClass::DiningTable,
        VocClass::Dog,
        VocClass::Horse,
        VocClass::Motorbike,
        VocClass::Person,
        VocClass::PottedPlant,
        VocClass::Sheep,
        VocClass::Sofa,
        VocClass::Train,
        VocClass::TvMonitor,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        VOC_NAMES[self.index()]
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        VOC_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(Self::from_index)
    }

    pub fn is_background(self) -> bool {
        self == VocClass::Background
    }
}

/// Ordered class names with a name-to-index map built once at construction.
///
/// Column `i` of the engine's score output belongs to `names[i]`; index 0 is
/// always the background class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassVocabulary {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl Default for ClassVocabulary {
    fn default() -> Self {
        Self::voc()
    }
}

impl ClassVocabulary {
    /// The 21-entry PASCAL VOC vocabulary.
    pub fn voc() -> Self {
        Self::build(VOC_NAMES.iter().map(|n| n.to_string()).collect())
    }

    /// Builds a vocabulary from user-supplied names. The first entry is taken
    /// as the background class. Names must be unique.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, DetectError> {
        if names.len() < 2 {
            return Err(DetectError::Config(format!(
                "a class vocabulary needs a background entry and at least one class, got {}",
                names.len()
            )));
        }
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let vocab = Self::build(names);
        if vocab.lookup.len() != vocab.names.len() {
            return Err(DetectError::Config("class names must be unique".to_string()));
        }
        Ok(vocab)
    }

    fn build(names: Vec<String>) -> Self {
        let lookup = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { names, lookup }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Class ids that can appear in results, i.e. everything but background.
    pub fn foreground_ids(&self) -> impl Iterator<Item = usize> {
        (BACKGROUND_ID + 1)..self.names.len()
    }
}
