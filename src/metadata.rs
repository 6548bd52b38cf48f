use std::collections::BTreeMap;

use serde::Serialize;

use crate::xml::Element;

/// Field name to XML tag for every value read off a `Product` record.
pub const METADATA_SCHEMA: &[(&str, &str)] = &[
    ("Observation_time", "Observation_time"),
    ("SpaceCraft_clock_start_count", "SpaceCraft_clock_start_count"),
    ("SpaceCraft_clock_stop_count", "SpaceCraft_clock_stop_count"),
    ("Start_orbit_number", "Start_orbit_number"),
    ("Stop_orbit_number", "Stop_orbit_number"),
    ("UTC_start_time", "UTC_start_time"),
    ("UTC_stop_time", "UTC_stop_time"),
    ("Solar_distance_text", "Solar_distance_text"),
    ("Center_georeferenced", "Center_georeferenced"),
    ("Center_latitude", "Center_latitude"),
    ("Center_longitude", "Center_longitude"),
    ("BB_georeferenced", "BB_georeferenced"),
    ("Easternmost_longitude", "Easternmost_longitude"),
    ("Maximum_latitude", "Maximum_latitude"),
    ("Minimum_latitude", "Minimum_latitude"),
    ("Westernmost_longitude", "Westernmost_longitude"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataSnapshot {
    fields: BTreeMap<&'static str, Option<String>>,
}

impl MetadataSnapshot {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|value| value.as_deref())
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub fn extract_metadata(product: &Element) -> MetadataSnapshot {
    extract_with_schema(product, METADATA_SCHEMA)
}

/// Every schema field is present in the snapshot; a tag missing from the
/// record maps to `None`.
pub fn extract_with_schema(
    product: &Element,
    schema: &[(&'static str, &'static str)],
) -> MetadataSnapshot {
    let fields = schema
        .iter()
        .map(|(field, tag)| (*field, product.first_text(tag)))
        .collect();
    MetadataSnapshot { fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    #[test]
    fn schema_has_sixteen_unique_fields() {
        let mut names: Vec<_> = METADATA_SCHEMA.iter().map(|(field, _)| *field).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn missing_tag_is_absent() {
        let doc = XmlDocument::parse(
            "<Product><Center_latitude>12.5</Center_latitude><UTC_start_time>2009-01-15T08:35:42</UTC_start_time></Product>",
        )
        .unwrap();
        let snapshot = extract_metadata(doc.root());
        assert_eq!(snapshot.len(), 16);
        assert_eq!(snapshot.get("Center_latitude"), Some("12.5"));
        assert_eq!(snapshot.get("UTC_start_time"), Some("2009-01-15T08:35:42"));
        assert!(snapshot.contains_field("Minimum_latitude"));
        assert_eq!(snapshot.get("Minimum_latitude"), None);
    }
}
