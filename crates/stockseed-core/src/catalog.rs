use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// String-keyed map that keeps entries in document order.
///
/// Catalog order is significant: category ids and variation names follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace a key; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

impl<V: JsonSchema> JsonSchema for OrderedMap<V> {
    fn schema_name() -> String {
        format!("OrderedMap_of_{}", V::schema_name())
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <BTreeMap<String, V>>::json_schema(generator)
    }
}

/// Attribute name to candidate values, in declaration order.
pub type Variations = OrderedMap<Vec<String>>;

/// Leaf of the catalog tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Subcategory {
    #[serde(default)]
    pub base_products: Vec<String>,
    #[serde(default)]
    pub variations: Variations,
}

/// Subcategories of one category.
pub type Category = OrderedMap<Subcategory>;

/// Read-only `category -> subcategory -> {base_products, variations}` tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CatalogDefinition {
    pub categories: OrderedMap<Category>,
}

impl CatalogDefinition {
    /// 1-based id of a category, by catalog position.
    pub fn category_id(&self, category: &str) -> Option<i64> {
        self.categories
            .keys()
            .position(|name| name == category)
            .map(|idx| idx as i64 + 1)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_document_order() {
        let json = r#"{
            "Zeta": {"z": {"base_products": ["A"], "variations": {"cor": ["x"], "ano": ["1"]}}},
            "Alfa": {"a": {"base_products": ["B"]}}
        }"#;
        let catalog: CatalogDefinition = serde_json::from_str(json).expect("parse catalog");

        let names: Vec<&str> = catalog.category_names().collect();
        assert_eq!(names, vec!["Zeta", "Alfa"]);
        assert_eq!(catalog.category_id("Zeta"), Some(1));
        assert_eq!(catalog.category_id("Alfa"), Some(2));
        assert_eq!(catalog.category_id("Beta"), None);

        let zeta = catalog.categories.get("Zeta").expect("zeta");
        let attrs: Vec<&str> = zeta
            .get("z")
            .expect("subcategory")
            .variations
            .keys()
            .collect();
        assert_eq!(attrs, vec!["cor", "ano"]);
    }

    #[test]
    fn round_trips_in_order() {
        let catalog: CatalogDefinition =
            serde_json::from_str(r#"{"B": {}, "A": {}}"#).expect("parse catalog");
        let encoded = serde_json::to_string(&catalog).expect("encode");
        assert_eq!(encoded, r#"{"B":{},"A":{}}"#);
    }
}
