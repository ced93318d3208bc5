//! Categorization results

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::snapshot::FileSnapshot;

/// Files matched by one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryListing {
    pub name: String,
    pub strategy: String,
    pub description: String,
    /// Distinct matched paths, sorted
    pub files: Vec<String>,
}

impl CategoryListing {
    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// First `limit` files and the number left out.
    ///
    /// A display helper only; the listing itself is never shortened.
    pub fn truncated(&self, limit: usize) -> (&[String], usize) {
        let shown = self.files.len().min(limit);
        (&self.files[..shown], self.files.len() - shown)
    }
}

/// Count and strategy for one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCount {
    pub count: usize,
    pub strategy: String,
}

/// Per-category counts in manifest order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySummary {
    entries: IndexMap<String, CategoryCount>,
}

impl CategorySummary {
    pub fn get(&self, name: &str) -> Option<&CategoryCount> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryCount)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts; files in several categories count once per category
    pub fn total(&self) -> usize {
        self.entries.values().map(|c| c.count).sum()
    }
}

/// The category membership of every file in a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categorization {
    listings: Vec<CategoryListing>,
    file_to_categories: BTreeMap<String, Vec<String>>,
    uncategorized: Vec<String>,
    total_files: usize,
}

impl Categorization {
    /// Build from per-category matches given in manifest order
    pub fn new(listings: Vec<CategoryListing>, snapshot: &FileSnapshot) -> Self {
        let mut file_to_categories: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for listing in &listings {
            for file in &listing.files {
                let categories = file_to_categories.entry(file.clone()).or_default();
                if !categories.contains(&listing.name) {
                    categories.push(listing.name.clone());
                }
            }
        }

        let uncategorized = snapshot
            .files()
            .filter(|f| !file_to_categories.contains_key(*f))
            .map(str::to_string)
            .collect();

        Self {
            listings,
            file_to_categories,
            uncategorized,
            total_files: snapshot.len(),
        }
    }

    /// Matched path -> categories in manifest order
    pub fn file_to_categories(&self) -> &BTreeMap<String, Vec<String>> {
        &self.file_to_categories
    }

    /// Categories of a path, empty when uncategorized
    pub fn categories_of(&self, path: &str) -> &[String] {
        self.file_to_categories
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn listings(&self) -> &[CategoryListing] {
        &self.listings
    }

    pub fn listing(&self, name: &str) -> Option<&CategoryListing> {
        self.listings.iter().find(|l| l.name == name)
    }

    /// Snapshot paths matched by no category
    pub fn uncategorized(&self) -> &[String] {
        &self.uncategorized
    }

    pub fn categorized_count(&self) -> usize {
        self.file_to_categories.len()
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Paths matched by more than one category
    pub fn overlaps(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.file_to_categories
            .iter()
            .filter(|(_, cats)| cats.len() > 1)
            .map(|(path, cats)| (path.as_str(), cats.as_slice()))
    }

    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            entries: self
                .listings
                .iter()
                .map(|l| {
                    (
                        l.name.clone(),
                        CategoryCount {
                            count: l.count(),
                            strategy: l.strategy.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Collect a category's matches into a sorted listing
pub(crate) fn listing_from_set(
    name: &str,
    strategy: &str,
    description: &str,
    files: BTreeSet<String>,
) -> CategoryListing {
    CategoryListing {
        name: name.to_string(),
        strategy: strategy.to_string(),
        description: description.to_string(),
        files: files.into_iter().collect(),
    }
}
