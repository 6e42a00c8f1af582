use std::collections::BTreeMap;
use std::iter::FusedIterator;

use super::spectra::BoundingBoxGroup;
use super::{MzdbError, MzdbStore};
use crate::model::Spectrum;

/// Lazy iterator over decoded spectra in ascending id order
///
/// Spectra are decoded one bounding box group (boxes sharing a
/// `first_spectrum_id`) at a time, so memory stays bounded by the largest
/// group. The connection lock is only held while a group is read.
///
/// Items are `(index, spectrum)` where `index` is the 0-based position in
/// the sequence. After an error the iterator returns `None`.
pub struct SpectrumDataIter<'a> {
    store: &'a MzdbStore,
    /// Spectrum ids to emit, keyed by their group's first spectrum id
    groups: Vec<(i64, Vec<i64>)>,
    next_group: usize,
    /// Decoded spectra waiting to be emitted
    buffer: BTreeMap<i64, Spectrum>,
    position: usize,
    done: bool,
}

impl<'a> SpectrumDataIter<'a> {
    fn new(store: &'a MzdbStore, ms_level: Option<u8>) -> Result<Self, MzdbError> {
        let mut groups: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for header in &store.index()?.headers {
            if ms_level.map_or(true, |level| header.ms_level == level as i64) {
                groups
                    .entry(header.bb_first_spectrum_id)
                    .or_default()
                    .push(header.id);
            }
        }

        log::debug!(
            "Iterating {} bounding box groups (ms_level: {:?})",
            groups.len(),
            ms_level
        );
        Ok(Self {
            store,
            groups: groups.into_iter().collect(),
            next_group: 0,
            buffer: BTreeMap::new(),
            position: 0,
            done: false,
        })
    }

    /// Decode every wanted spectrum of one group into the buffer
    fn load_group(&mut self, group: usize) -> Result<(), MzdbError> {
        let (first_spectrum_id, ref spectrum_ids) = self.groups[group];
        let index = self.store.index()?;

        let bb_group = self
            .store
            .with_connection(|conn| BoundingBoxGroup::load(conn, index, first_spectrum_id, None))?;

        for &id in spectrum_ids {
            let header = index
                .header(id)
                .ok_or_else(|| MzdbError::not_found("spectrum", id))?;
            let encoding = index.encoding(header.data_encoding_id)?;
            let data = bb_group.spectrum_data(header, encoding, None)?;
            self.buffer.insert(
                id,
                Spectrum {
                    header: header.clone(),
                    data,
                },
            );
        }
        Ok(())
    }
}

impl Iterator for SpectrumDataIter<'_> {
    type Item = Result<(usize, Spectrum), MzdbError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            // Spectra below the next group's first id cannot appear in a later group
            let bound = self.groups.get(self.next_group).map(|(first, _)| *first);
            if let Some(entry) = self.buffer.first_entry() {
                if bound.map_or(true, |first| *entry.key() < first) {
                    let spectrum = entry.remove();
                    let index = self.position;
                    self.position += 1;
                    return Some(Ok((index, spectrum)));
                }
            }

            if bound.is_none() {
                self.done = true;
                return None;
            }

            let group = self.next_group;
            self.next_group += 1;
            if let Err(e) = self.load_group(group) {
                self.done = true;
                self.buffer.clear();
                return Some(Err(e));
            }
        }
    }
}

impl FusedIterator for SpectrumDataIter<'_> {}

impl MzdbStore {
    /// Iterate over decoded spectra in ascending id order, optionally for one MS level
    pub fn iter_spectrum_data(
        &self,
        ms_level: Option<u8>,
    ) -> Result<SpectrumDataIter<'_>, MzdbError> {
        SpectrumDataIter::new(self, ms_level)
    }

    /// Call `callback` for every decoded spectrum in ascending id order
    ///
    /// A callback error stops the traversal and is returned as is; the store
    /// stays open.
    pub fn for_each_spectrum_data<F, E>(&self, ms_level: Option<u8>, mut callback: F) -> Result<(), E>
    where
        F: FnMut(usize, Spectrum) -> Result<(), E>,
        E: From<MzdbError>,
    {
        for item in self.iter_spectrum_data(ms_level)? {
            let (index, spectrum) = item?;
            callback(index, spectrum)?;
        }
        Ok(())
    }
}
