use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use super::model::{Dataset, Dimension, Record};

// ---------------------------------------------------------------------------
// Filter criteria: what the user picked in the side panel
// ---------------------------------------------------------------------------

/// Inclusive order-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// An inverted range (`start > end`) contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Selections for one interaction.
///
/// An empty set means "no restriction on that dimension", not "exclude
/// everything". `date_range: None` likewise leaves dates unrestricted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub date_range: Option<DateRange>,
    pub regions: BTreeSet<String>,
    pub states: BTreeSet<String>,
    pub cities: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria seeded with the dataset's full date span.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        FilterCriteria {
            date_range: dataset
                .date_bounds()
                .ok()
                .map(|(lo, hi)| DateRange::new(lo, hi)),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – a dataset restricted to a subset of its rows
// ---------------------------------------------------------------------------

/// Borrowed dataset plus the indices of the rows that survived filtering,
/// in source order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over every row of the dataset.
    pub fn full(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    /// First `n` rows of the view.
    pub fn head(&self, n: usize) -> Vec<Record> {
        self.records().take(n).cloned().collect()
    }

    /// Narrow this view; only rows already in it are visited.
    pub fn restrict<F>(&self, mut keep: F) -> FilteredView<'a>
    where
        F: FnMut(&Record) -> bool,
    {
        let records = &self.dataset.records;
        FilteredView {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| keep(&records[i]))
                .collect(),
        }
    }

    /// Keep rows whose `dim` value is in `selected`; an empty selection keeps all.
    pub fn restrict_to(&self, dim: Dimension, selected: &BTreeSet<String>) -> FilteredView<'a> {
        if selected.is_empty() {
            return self.clone();
        }
        self.restrict(|r| selected.contains(r.dimension(dim)))
    }

    /// Distinct non-blank values of `dim` in first-seen order, used to
    /// populate pickers.
    pub fn distinct(&self, dim: Dimension) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records()
            .map(|r| r.dimension(dim))
            .filter(|v| !v.is_empty() && seen.insert(*v))
            .map(str::to_string)
            .collect()
    }

    /// Run the full filter cascade starting from this view.
    pub fn apply(&self, criteria: &FilterCriteria) -> FilteredView<'a> {
        FilterCascade::from_view(self, criteria).by_city
    }
}

impl PartialEq for FilteredView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dataset, other.dataset) && self.indices == other.indices
    }
}

// ---------------------------------------------------------------------------
// FilterCascade – every intermediate stage of the filter chain
// ---------------------------------------------------------------------------

/// Output of each filter stage. Each stage is computed from the previous one,
/// so a state that is not inside the selected regions matches nothing.
#[derive(Debug, Clone)]
pub struct FilterCascade<'a> {
    pub by_date: FilteredView<'a>,
    pub by_region: FilteredView<'a>,
    pub by_state: FilteredView<'a>,
    pub by_city: FilteredView<'a>,
}

impl<'a> FilterCascade<'a> {
    pub fn from_view(view: &FilteredView<'a>, criteria: &FilterCriteria) -> Self {
        let by_date = match criteria.date_range {
            Some(range) => view.restrict(|r| range.contains(r.order_date)),
            None => view.clone(),
        };
        let by_region = by_date.restrict_to(Dimension::Region, &criteria.regions);
        let by_state = by_region.restrict_to(Dimension::State, &criteria.states);
        let by_city = by_state.restrict_to(Dimension::City, &criteria.cities);

        log::debug!(
            "filter cascade: {} -> date {} -> region {} -> state {} -> city {}",
            view.len(),
            by_date.len(),
            by_region.len(),
            by_state.len(),
            by_city.len()
        );

        FilterCascade {
            by_date,
            by_region,
            by_state,
            by_city,
        }
    }

    /// Options for each picker, taken from the stage before it.
    pub fn region_options(&self) -> Vec<String> {
        self.by_date.distinct(Dimension::Region)
    }

    pub fn state_options(&self) -> Vec<String> {
        self.by_region.distinct(Dimension::State)
    }

    pub fn city_options(&self) -> Vec<String> {
        self.by_state.distinct(Dimension::City)
    }

    /// The final filtered view.
    pub fn result(&self) -> &FilteredView<'a> {
        &self.by_city
    }
}

/// Run every filter stage over the whole dataset.
pub fn cascade<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilterCascade<'a> {
    FilterCascade::from_view(&FilteredView::full(dataset), criteria)
}

/// Rows of `dataset` that satisfy `criteria`.
pub fn apply_filters<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    FilteredView::full(dataset).apply(criteria)
}
