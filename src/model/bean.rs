use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::model::PropertyMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeanOrigin {
    #[default]
    Literal,
    /// Properties produced by a script function called at registration.
    Factory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bean {
    pub name: String,
    pub type_name: String,
    pub properties: PropertyMap,
    pub origin: BeanOrigin,
}

/// Beans keyed by name, with a secondary index by declared type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BeanRegistry {
    by_name: IndexMap<String, Bean>,
    #[serde(skip)]
    by_type: IndexMap<String, IndexSet<String>>,
}

impl BeanRegistry {
    /// Inserts a bean, returning the one it replaced.
    pub(crate) fn insert(&mut self, bean: Bean) -> Option<Bean> {
        let previous = self.by_name.shift_remove(&bean.name);

        if let Some(previous) = &previous
            && let Some(names) = self.by_type.get_mut(&previous.type_name)
        {
            names.shift_remove(&previous.name);
            if names.is_empty() {
                self.by_type.shift_remove(&previous.type_name);
            }
        }

        self.by_type
            .entry(bean.type_name.clone())
            .or_default()
            .insert(bean.name.clone());
        self.by_name.insert(bean.name.clone(), bean);

        previous
    }

    pub fn get(&self, name: &str) -> Option<&Bean> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn find_by_type(&self, type_name: &str) -> Vec<&Bean> {
        self.by_type
            .get(type_name)
            .map(|names| names.iter().filter_map(|n| self.by_name.get(n)).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bean> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
