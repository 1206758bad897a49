//! Ordered, name-unique containers

use crate::column::{Column, ColumnKind};
use crate::error::{IrError, IrResult};
use crate::provenance::Provenance;
use crate::table::{Table, TableKind};
use regex::Regex;
use std::collections::HashMap;
use wf_core::Unit;

/// Something that can live in a [`NamedList`]
pub trait Member: Clone {
    /// Variant discriminator used for membership restrictions
    type Kind: Copy + PartialEq + std::fmt::Display;

    /// Container name used in error messages
    const CONTAINER: &'static str;

    fn member_name(&self) -> &str;

    fn member_kind(&self) -> Self::Kind;

    /// Whether two members with the same name describe the same node
    fn same_definition(&self, other: &Self) -> bool;
}

impl Member for Column {
    type Kind = ColumnKind;
    const CONTAINER: &'static str = "column list";

    fn member_name(&self) -> &str {
        self.name().as_str()
    }

    fn member_kind(&self) -> ColumnKind {
        self.kind()
    }

    fn same_definition(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Member for Table {
    type Kind = TableKind;
    const CONTAINER: &'static str = "table list";

    fn member_name(&self) -> &str {
        self.name().as_str()
    }

    fn member_kind(&self) -> TableKind {
        self.kind()
    }

    fn same_definition(&self, other: &Self) -> bool {
        self.definition_key() == other.definition_key()
    }
}

/// Ordered list with unique names and an optional set of allowed variants.
///
/// Insertion order is preserved. Replacing an entry keeps its position.
#[derive(Debug, Clone)]
pub struct NamedList<T: Member> {
    items: Vec<T>,
    index: HashMap<String, usize>,
    allowed: Option<Vec<T::Kind>>,
}

pub type ColumnList = NamedList<Column>;
pub type TableList = NamedList<Table>;

impl<T: Member> Default for NamedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            allowed: None,
        }
    }
}

impl<T: Member> NamedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list that only accepts the given variants
    pub fn restricted(allowed: &[T::Kind]) -> Self {
        Self {
            allowed: Some(allowed.to_vec()),
            ..Self::default()
        }
    }

    /// Build from items, failing on the first duplicate
    pub fn from_items<I>(items: I) -> IrResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut list = Self::new();
        for item in items {
            list.add(item, false)?;
        }
        Ok(list)
    }

    /// Append an item.
    ///
    /// An item whose name is already present is rejected unless
    /// `override_existing` is set, in which case it replaces the existing
    /// entry in place.
    pub fn add(&mut self, item: T, override_existing: bool) -> IrResult<()> {
        self.check_allowed(&item)?;
        let name = item.member_name().to_string();
        match self.index.get(&name) {
            Some(&pos) if override_existing => {
                self.items[pos] = item;
                Ok(())
            }
            Some(_) => Err(IrError::DuplicateName {
                container: T::CONTAINER.to_string(),
                name,
            }),
            None => {
                self.index.insert(name, self.items.len());
                self.items.push(item);
                Ok(())
            }
        }
    }

    /// Add `item` unless an identical entry is already listed.
    ///
    /// A different entry under the same name is a duplicate.
    pub fn add_unless_same(&mut self, item: T) -> IrResult<()> {
        let existing = self
            .get(item.member_name())
            .map(|current| current.same_definition(&item));
        match existing {
            Some(true) => Ok(()),
            Some(false) => Err(IrError::DuplicateName {
                container: T::CONTAINER.to_string(),
                name: item.member_name().to_string(),
            }),
            None => self.add(item, false),
        }
    }

    /// Append every item of `other` not listed yet
    pub fn merge_missing(&mut self, other: &Self) -> IrResult<()> {
        for item in &other.items {
            self.add_unless_same(item.clone())?;
        }
        Ok(())
    }

    fn check_allowed(&self, item: &T) -> IrResult<()> {
        match &self.allowed {
            Some(allowed) if !allowed.contains(&item.member_kind()) => {
                Err(IrError::WrongVariant {
                    container: T::CONTAINER.to_string(),
                    variant: item.member_kind().to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Remove an entry by name, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<T> {
        let pos = self.index.remove(name)?;
        let item = self.items.remove(pos);
        for idx in self.index.values_mut() {
            if *idx > pos {
                *idx -= 1;
            }
        }
        Some(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Names in insertion order
    pub fn list_names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.member_name()).collect()
    }

    /// Entries whose name matches a regular expression, in order
    pub fn filter_names(&self, pattern: &str) -> IrResult<Self> {
        let re = Regex::new(pattern).map_err(|e| IrError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.filtered(|item| re.is_match(item.member_name())))
    }

    fn filtered(&self, keep: impl Fn(&T) -> bool) -> Self {
        let mut out = Self {
            allowed: self.allowed.clone(),
            ..Self::default()
        };
        for item in self.items.iter().filter(|i| keep(i)) {
            out.index.insert(item.member_name().to_string(), out.items.len());
            out.items.push(item.clone());
        }
        out
    }
}

impl ColumnList {
    pub fn list_columns(&self) -> &[Column] {
        &self.items
    }

    /// Columns whose unit equals `unit`
    pub fn filter_unit(&self, unit: &Unit) -> Self {
        self.filtered(|c| c.unit() == unit)
    }
}

impl TableList {
    pub fn list_tables(&self) -> &[Table] {
        &self.items
    }
}

impl<'a, T: Member> IntoIterator for &'a NamedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[path = "container_test.rs"]
mod tests;
