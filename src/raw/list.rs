use super::profile::RawProfile;

/// Records in acquisition order
///
/// Neighbours are resolved by position, so splicing a record out re-links the
/// sequence implicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileList {
    profiles: Vec<RawProfile>,
}

impl ProfileList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            profiles: Vec::with_capacity(capacity),
        }
    }

    /// Append a record at the tail
    pub fn push(&mut self, profile: RawProfile) {
        self.profiles.push(profile);
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the list holds no records
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Record at `index`
    pub fn get(&self, index: usize) -> Option<&RawProfile> {
        self.profiles.get(index)
    }

    /// Mutable record at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut RawProfile> {
        self.profiles.get_mut(index)
    }

    /// Head of the list
    pub fn first(&self) -> Option<&RawProfile> {
        self.profiles.first()
    }

    /// Tail of the list
    pub fn last(&self) -> Option<&RawProfile> {
        self.profiles.last()
    }

    /// Record following `index`
    pub fn next(&self, index: usize) -> Option<&RawProfile> {
        index.checked_add(1).and_then(|i| self.profiles.get(i))
    }

    /// Record preceding `index`
    pub fn previous(&self, index: usize) -> Option<&RawProfile> {
        index.checked_sub(1).and_then(|i| self.profiles.get(i))
    }

    /// Iterate in acquisition order
    pub fn iter(&self) -> std::slice::Iter<'_, RawProfile> {
        self.profiles.iter()
    }

    /// Iterate mutably in acquisition order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, RawProfile> {
        self.profiles.iter_mut()
    }

    /// Splice out the record after `index`
    pub fn delete_next(&mut self, index: usize) -> Option<RawProfile> {
        let next = index.checked_add(1)?;
        (next < self.profiles.len()).then(|| self.profiles.remove(next))
    }

    /// Splice out the record before `index`
    pub fn delete_previous(&mut self, index: usize) -> Option<RawProfile> {
        let previous = index.checked_sub(1)?;
        (previous < self.profiles.len()).then(|| self.profiles.remove(previous))
    }

    /// Remove every record except the one at `index`.
    ///
    /// Returns the number of records removed.
    pub fn delete_all_linked(&mut self, index: usize) -> usize {
        if index >= self.profiles.len() {
            return 0;
        }
        let removed = self.profiles.len() - 1;
        self.profiles.truncate(index + 1);
        self.profiles.drain(..index);
        removed
    }

    /// Order records by file offset with adjacent-swap passes.
    ///
    /// Stops after the first pass without a swap, so an already ordered list
    /// costs a single pass. Returns the new head.
    pub fn sort_by_file_position(&mut self) -> Option<&RawProfile> {
        loop {
            let mut swapped = false;
            for i in 1..self.profiles.len() {
                if self.profiles[i - 1].file_position > self.profiles[i].file_position {
                    self.profiles.swap(i - 1, i);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }
        self.profiles.first()
    }

    /// Largest sample magnitude over every record
    pub fn max_data_value(&self) -> f32 {
        self.profiles
            .iter()
            .map(RawProfile::max_data_value)
            .fold(0.0, f32::max)
    }
}

impl<'a> IntoIterator for &'a ProfileList {
    type Item = &'a RawProfile;
    type IntoIter = std::slice::Iter<'a, RawProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

impl IntoIterator for ProfileList {
    type Item = RawProfile;
    type IntoIter = std::vec::IntoIter<RawProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.into_iter()
    }
}

impl FromIterator<RawProfile> for ProfileList {
    fn from_iter<I: IntoIterator<Item = RawProfile>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}
