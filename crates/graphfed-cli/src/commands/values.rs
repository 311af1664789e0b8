//! Property assignments on the command line
//!
//! An assignment is `NAME[:TYPE]=VALUE` with `TYPE` one of `string` (the
//! default), `long`, `double`, `boolean`, `binary` (base64) or `uuid`.
//! Repeating a name adds values to the same multi-valued property.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use graphfed_core::{GraphError, NodeId, Property, PropertyValue, Result};

const VALUE_TYPES: [&str; 6] = ["string", "long", "double", "boolean", "binary", "uuid"];

pub fn parse_assignment(text: &str) -> Result<(String, PropertyValue)> {
    let (key, raw) = text.split_once('=').ok_or_else(|| {
        GraphError::invalid_argument("property", format!("'{}' is not NAME=VALUE", text))
    })?;
    let (name, kind) = match key.rsplit_once(':') {
        Some((name, kind)) if VALUE_TYPES.contains(&kind) => (name, kind),
        _ => (key, "string"),
    };
    if name.trim().is_empty() {
        return Err(GraphError::invalid_argument(
            "property",
            format!("'{}' has an empty name", text),
        ));
    }

    let invalid = |reason: String| GraphError::invalid_argument(name, reason);
    let value = match kind {
        "string" => PropertyValue::String(raw.to_string()),
        "long" => PropertyValue::Long(raw.parse::<i64>().map_err(|e| invalid(e.to_string()))?),
        "double" => {
            PropertyValue::Double(raw.parse::<f64>().map_err(|e| invalid(e.to_string()))?)
        }
        "boolean" => {
            PropertyValue::Boolean(raw.parse::<bool>().map_err(|e| invalid(e.to_string()))?)
        }
        "binary" => PropertyValue::Binary(
            STANDARD
                .decode(raw.as_bytes())
                .map_err(|e| invalid(e.to_string()))?,
        ),
        "uuid" => PropertyValue::Uuid(raw.parse::<NodeId>()?),
        other => return Err(invalid(format!("unknown value type '{}'", other))),
    };
    Ok((name.to_string(), value))
}

/// Group assignments into properties, keeping first-seen name order
pub fn parse_properties(assignments: &[String]) -> Result<Vec<Property>> {
    let mut properties: Vec<Property> = Vec::new();
    for text in assignments {
        let (name, value) = parse_assignment(text)?;
        match properties.iter_mut().find(|p| p.name == name) {
            Some(property) => property.values.push(value),
            None => properties.push(Property::single(name, value)),
        }
    }
    Ok(properties)
}

pub fn render_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => s.clone(),
        PropertyValue::Long(v) => v.to_string(),
        PropertyValue::Double(v) => v.to_string(),
        PropertyValue::Boolean(v) => v.to_string(),
        PropertyValue::Binary(bytes) => STANDARD.encode(bytes),
        PropertyValue::Uuid(id) => id.to_string(),
    }
}

pub fn render_property(property: &Property) -> String {
    let values: Vec<String> = property.values.iter().map(render_value).collect();
    format!("{} = {}", property.name, values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untyped_assignment_is_string() {
        let (name, value) = parse_assignment("title=a=b").unwrap();
        assert_eq!(name, "title");
        assert_eq!(value, PropertyValue::String("a=b".to_string()));
    }

    #[test]
    fn test_typed_assignments() {
        assert_eq!(
            parse_assignment("n:long=-3").unwrap().1,
            PropertyValue::Long(-3)
        );
        assert_eq!(
            parse_assignment("ok:boolean=true").unwrap().1,
            PropertyValue::Boolean(true)
        );
        assert_eq!(
            parse_assignment("blob:binary=aGk=").unwrap().1,
            PropertyValue::Binary(b"hi".to_vec())
        );
    }

    #[test]
    fn test_bad_assignments_are_argument_errors() {
        for text in ["novalue", "=x", ":long=1", "n:long=abc", "n:boolean=yes"] {
            let err = parse_assignment(text).unwrap_err();
            assert!(
                matches!(err, GraphError::ArgumentValidation { .. }),
                "{} gave {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_namespaced_names_keep_their_prefix() {
        let (name, value) = parse_assignment("dc:title=Report").unwrap();
        assert_eq!(name, "dc:title");
        assert_eq!(value, PropertyValue::String("Report".to_string()));

        let (name, value) = parse_assignment("dc:size:long=4").unwrap();
        assert_eq!(name, "dc:size");
        assert_eq!(value, PropertyValue::Long(4));
    }

    #[test]
    fn test_repeated_names_become_multi_valued() {
        let properties = parse_properties(&[
            "tag=a".to_string(),
            "size:long=1".to_string(),
            "tag=b".to_string(),
        ])
        .unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].name, "tag");
        assert_eq!(properties[0].values.len(), 2);
        assert_eq!(render_property(&properties[0]), "tag = a, b");
    }
}
