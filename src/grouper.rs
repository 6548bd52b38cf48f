use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::warn;

use crate::error::OdeError;
use crate::metadata::{MetadataSnapshot, extract_metadata};
use crate::xml::{Element, XmlDocument};

pub const PRODUCT_TAG: &str = "Product";
pub const PRODUCT_FILE_TAG: &str = "Product_file";
pub const PRODUCT_FILE_TYPE: &str = "Product";

const CH1_ORB_SUFFIXES: [&str; 4] = ["LOC.IMG", "LOC.HDR", "RDN.IMG", "RDN.HDR"];

/// How file names turn into group ids, and which files are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum GroupingPolicy {
    /// Chandrayaan-1 Moon Mineralogy Mapper calibrated products.
    #[serde(rename = "CH1-ORB")]
    Ch1Orb,
    /// Clementine HIRES camera EDR images.
    #[serde(rename = "CLEM")]
    Clem,
}

impl GroupingPolicy {
    pub fn select(target: &str, ihid: &str, iid: &str) -> Result<Self, OdeError> {
        match (target, ihid, iid) {
            ("moon", "CH1-ORB", "M3") => Ok(GroupingPolicy::Ch1Orb),
            ("moon", "CLEM", "HIRES") => Ok(GroupingPolicy::Clem),
            _ => Err(OdeError::UnsupportedCombination {
                target: target.to_string(),
                ihid: ihid.to_string(),
                iid: iid.to_string(),
            }),
        }
    }

    pub fn product_type(self) -> &'static str {
        match self {
            GroupingPolicy::Ch1Orb => "CALIV3",
            GroupingPolicy::Clem => "EDR",
        }
    }

    pub fn derive_group_id(self, file_name: &str) -> String {
        match self {
            // Drop the trailing `_<qualifier>`; a name with no `_` has nothing left.
            GroupingPolicy::Ch1Orb => file_name
                .rsplit_once('_')
                .map(|(stem, _)| stem.to_string())
                .unwrap_or_default(),
            GroupingPolicy::Clem => file_name.split('.').collect::<Vec<_>>().join("."),
        }
    }

    pub fn includes_file(self, file_name: &str) -> bool {
        match self {
            GroupingPolicy::Ch1Orb => CH1_ORB_SUFFIXES
                .iter()
                .any(|suffix| file_name.ends_with(suffix)),
            GroupingPolicy::Clem => true,
        }
    }
}

impl fmt::Display for GroupingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingPolicy::Ch1Orb => write!(f, "CH1-ORB"),
            GroupingPolicy::Clem => write!(f, "CLEM"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResultEntry {
    pub metadata: Arc<MetadataSnapshot>,
    pub files: Vec<String>,
}

/// Group id to entry. The `None` key holds entries written before any
/// Product-typed file of a record assigned an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMapping {
    entries: BTreeMap<Option<String>, ResultEntry>,
}

impl ResultMapping {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ResultEntry> {
        self.entries.get(&Some(id.to_string()))
    }

    pub fn get_unassigned(&self) -> Option<&ResultEntry> {
        self.entries.get(&None)
    }

    /// Number of entries stored under a derived id.
    pub fn assigned_len(&self) -> usize {
        self.entries.keys().filter(|key| key.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &ResultEntry)> + '_ {
        self.entries
            .iter()
            .map(|(key, entry)| (key.as_deref(), entry))
    }

    fn insert(&mut self, id: Option<String>, entry: ResultEntry) {
        self.entries.insert(id, entry);
    }
}

struct GroupRecord<'a> {
    id: Option<&'a str>,
    entry: &'a ResultEntry,
}

impl Serialize for GroupRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GroupRecord", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("metadata", &self.entry.metadata)?;
        state.serialize_field("files", &self.entry.files)?;
        state.end()
    }
}

impl Serialize for ResultMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|(id, entry)| GroupRecord { id, entry }))
    }
}

pub fn group_products(document: &XmlDocument, policy: GroupingPolicy) -> ResultMapping {
    let mut mapping = ResultMapping::default();
    for product in document.elements_by_tag(PRODUCT_TAG) {
        group_record(product, policy, &mut mapping);
    }
    mapping
}

/// Walks the `Product_file` children of one record. After every child the
/// record is written under the id held at that moment, so a record can leave
/// entries under an unassigned or superseded id as well as its final one.
/// Every write of a record refers to the same growing file list, hence all of
/// them end up carrying the complete list once the walk is over.
fn group_record(product: &Element, policy: GroupingPolicy, mapping: &mut ResultMapping) {
    let metadata = Arc::new(extract_metadata(product));
    let mut files = Vec::new();
    let mut current_id: Option<String> = None;
    let mut written_ids = Vec::new();

    for product_file in product.descendants(PRODUCT_FILE_TAG) {
        if product_file.first_text("Type").as_deref() == Some(PRODUCT_FILE_TYPE) {
            match product_file.first_text("FileName") {
                Some(file_name) => {
                    current_id = Some(policy.derive_group_id(&file_name));
                    if policy.includes_file(&file_name) {
                        match product_file.first_text("URL") {
                            Some(url) => files.push(url),
                            None => warn!(file = %file_name, "product file has no URL"),
                        }
                    }
                }
                None => warn!("product file has no FileName"),
            }
        }
        written_ids.push(current_id.clone());
    }

    for id in written_ids {
        mapping.insert(
            id,
            ResultEntry {
                metadata: Arc::clone(&metadata),
                files: files.clone(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn ch1_orb_strips_last_qualifier() {
        let policy = GroupingPolicy::Ch1Orb;
        assert_eq!(
            policy.derive_group_id("M3G20090115T083542_V03_RDN.IMG"),
            "M3G20090115T083542_V03"
        );
        assert_eq!(policy.derive_group_id("NOUNDERSCORE.IMG"), "");
    }

    #[test]
    fn ch1_orb_suffix_filter() {
        let policy = GroupingPolicy::Ch1Orb;
        assert!(policy.includes_file("M3G20090115T083542_V03_LOC.HDR"));
        assert!(policy.includes_file("M3G20090115T083542_V03_RDN.IMG"));
        assert!(!policy.includes_file("M3G20090115T083542_V03_RDN.LBL"));
        assert!(!policy.includes_file("M3G20090115T083542_V03_OBS.IMG"));
    }

    #[test]
    fn clem_id_is_file_name() {
        let policy = GroupingPolicy::Clem;
        for name in ["1234N567E890.IMG", "a.b.c", "LHA0001.012.LBL", "trailing."] {
            assert_eq!(policy.derive_group_id(name), name);
        }
        assert!(policy.includes_file("anything.LBL"));
    }

    #[test]
    fn select_policy() {
        assert_eq!(
            GroupingPolicy::select("moon", "CH1-ORB", "M3").unwrap(),
            GroupingPolicy::Ch1Orb
        );
        assert_eq!(
            GroupingPolicy::select("moon", "CLEM", "HIRES").unwrap(),
            GroupingPolicy::Clem
        );
        let err = GroupingPolicy::select("mars", "MRO", "CRISM").unwrap_err();
        assert_matches!(err, OdeError::UnsupportedCombination { .. });
    }

    #[test]
    fn unassigned_entry_from_leading_non_product_file() {
        let doc = XmlDocument::parse(
            r#"<Products><Product>
                <Product_file><Type>Browse</Type><FileName>x.PNG</FileName><URL>u0</URL></Product_file>
                <Product_file><Type>Product</Type><FileName>A_B_RDN.IMG</FileName><URL>u1</URL></Product_file>
            </Product></Products>"#,
        )
        .unwrap();
        let mapping = group_products(&doc, GroupingPolicy::Ch1Orb);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("A_B").unwrap().files, vec!["u1"]);
        assert_eq!(mapping.get_unassigned().unwrap().files, vec!["u1"]);
    }
}
