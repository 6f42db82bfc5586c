use crate::math::DVec3;
use crate::pointer::{ManipulatorId, Positions};

pub(crate) use rotation::RotateLogic;
pub(crate) use scale::ScaleLogic;
pub(crate) use translation::{MoveLogic, MoveReference};

pub(crate) mod rotation;
pub(crate) mod scale;
pub(crate) mod translation;

/// Ordered pair of manipulators whose connecting vector drives
/// two-handed rotation and scaling.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Handlebar {
    first: ManipulatorId,
    second: ManipulatorId,
}

impl Handlebar {
    /// Picks the first two identifiers from an ascending list.
    pub(crate) fn from_ids(ids: &[ManipulatorId]) -> Option<Self> {
        match ids {
            [first, second, ..] => {
                debug_assert_ne!(first, second);
                Some(Self {
                    first: *first,
                    second: *second,
                })
            }
            _ => None,
        }
    }

    pub(crate) fn contains(&self, id: ManipulatorId) -> bool {
        self.first == id || self.second == id
    }

    /// Vector from the first to the second manipulator, if both can be resolved.
    pub(crate) fn vector(&self, positions: &Positions) -> Option<DVec3> {
        let first = positions.get(&self.first)?;
        let second = positions.get(&self.second)?;
        Some(*second - *first)
    }
}

#[cfg(test)]
pub(crate) fn positions(entries: &[(u64, DVec3)]) -> Positions {
    entries
        .iter()
        .map(|&(id, position)| (ManipulatorId(id), position))
        .collect()
}
