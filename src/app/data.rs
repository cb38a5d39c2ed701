use crate::http_log::{LogCollection, LogRecord, TimeRange};

#[cfg(test)]
mod tests;

/// A loaded [`LogCollection`] plus what is currently shown of it
///
/// Row indices used by this type refer to visible rows, when a filter is applied
/// they are translated to positions in the collection.
#[derive(Default, Debug)]
pub struct Data {
    collection: LogCollection,
    filtered_rows: Option<Vec<usize>>,
    applied_range: Option<TimeRange>,
    pub selected_row: Option<usize>,
}

impl From<LogCollection> for Data {
    fn from(collection: LogCollection) -> Self {
        Self {
            collection,
            ..Default::default()
        }
    }
}

impl Data {
    pub fn collection(&self) -> &LogCollection {
        &self.collection
    }

    /// Number of visible rows
    pub fn len(&self) -> usize {
        if let Some(filtered) = self.filtered_rows.as_ref() {
            filtered.len()
        } else {
            self.collection.len()
        }
    }

    pub fn total_len_unfiltered(&self) -> usize {
        self.collection.len()
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered_rows.is_some()
    }

    pub fn applied_range(&self) -> Option<&TimeRange> {
        self.applied_range.as_ref()
    }

    /// Record shown at `index` of the visible rows
    pub fn row(&self, index: usize) -> Option<&LogRecord> {
        let real_index = self.get_real_index(index)?;
        self.collection.records().get(real_index)
    }

    pub fn selected_record(&self) -> Option<&LogRecord> {
        self.row(self.selected_row?)
    }

    fn get_real_index(&self, index: usize) -> Option<usize> {
        if let Some(filtered) = self.filtered_rows.as_ref() {
            filtered.get(index).copied()
        } else {
            Some(index)
        }
    }

    /// Shows only records inside `range`, keeps the selection if it is still visible
    pub fn apply_filter(&mut self, range: TimeRange) {
        let previously_selected = self.selected_row.and_then(|x| self.get_real_index(x));
        if range.is_unbounded() {
            self.filtered_rows = None;
            self.applied_range = None;
        } else {
            self.filtered_rows = Some(self.collection.filter_indices(&range));
            self.applied_range = Some(range);
        }
        self.selected_row = previously_selected.and_then(|x| self.visible_index_of(x));
    }

    pub fn unfilter(&mut self) {
        let previously_selected = self.selected_row.and_then(|x| self.get_real_index(x));
        self.filtered_rows = None;
        self.applied_range = None;
        self.selected_row = previously_selected;
    }

    fn visible_index_of(&self, real_index: usize) -> Option<usize> {
        if let Some(filtered) = self.filtered_rows.as_ref() {
            filtered.binary_search(&real_index).ok()
        } else {
            (real_index < self.collection.len()).then_some(real_index)
        }
    }

    pub fn has_prev(&self) -> bool {
        self.selected_row.is_some_and(|x| x > 0)
    }

    pub fn has_next(&self) -> bool {
        match self.selected_row {
            Some(x) => x + 1 < self.len(),
            None => !self.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn move_selected_to_prev(&mut self) {
        if self.has_prev() {
            self.selected_row = self.selected_row.map(|x| x - 1);
        }
    }

    /// Selects the first row if nothing was selected yet
    pub fn move_selected_to_next(&mut self) {
        if self.has_next() {
            self.selected_row = Some(self.selected_row.map_or(0, |x| x + 1));
        }
    }

    pub fn move_selected_to_first(&mut self) {
        if !self.is_empty() {
            self.selected_row = Some(0);
        }
    }

    pub fn move_selected_to_last(&mut self) {
        if !self.is_empty() {
            self.selected_row = Some(self.len() - 1);
        }
    }
}
