use ode_catalog::metadata::{METADATA_SCHEMA, extract_metadata};
use ode_catalog::xml::XmlDocument;

fn product_without(skipped: &str) -> XmlDocument {
    let tags: String = METADATA_SCHEMA
        .iter()
        .filter(|(field, _)| *field != skipped)
        .map(|(field, tag)| format!("<{tag}>{field}-value</{tag}>"))
        .collect();
    XmlDocument::parse(&format!("<Product>{tags}</Product>")).unwrap()
}

#[test]
fn single_missing_tag_is_the_only_absent_field() {
    for (missing, _) in METADATA_SCHEMA {
        let doc = product_without(missing);
        let snapshot = extract_metadata(doc.root());
        assert_eq!(snapshot.len(), METADATA_SCHEMA.len());

        for (field, _) in METADATA_SCHEMA {
            if field == missing {
                assert_eq!(snapshot.get(field), None, "{field} should be absent");
            } else {
                let expected = format!("{field}-value");
                assert_eq!(snapshot.get(field), Some(expected.as_str()));
            }
        }
    }
}
