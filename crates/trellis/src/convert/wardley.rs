//! Wardley-map conversion: components resolve evolution/visibility
//! coordinates from their declared attributes.

use trellis_core::{document::Profile, identifier::Id};

use crate::convert::GraphModel;

/// Coordinate used when a component declares no value, or a malformed
/// one.
const DEFAULT_COORDINATE: f64 = 0.5;

/// One component on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct WardleyComponent {
    pub id: Id,
    pub label: String,
    /// Horizontal position, 0 (genesis) to 1 (commodity).
    pub evolution: f64,
    /// Vertical position, 0 (invisible) to 1 (visible to the user).
    pub visibility: f64,
}

/// The wardley domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct WardleyModel {
    pub graph: GraphModel,
    pub components: Vec<WardleyComponent>,
}

/// Resolve map coordinates from a validated profile.
///
/// Values outside `[0, 1]` are clamped; missing or malformed values
/// degrade to the center of the axis.
pub fn convert_wardley(profile: &Profile) -> WardleyModel {
    let components = profile
        .nodes
        .iter()
        .map(|node| WardleyComponent {
            id: node.id,
            label: node.display_text(),
            evolution: coordinate(node.data.get("evolution").and_then(|v| v.as_number())),
            visibility: coordinate(node.data.get("visibility").and_then(|v| v.as_number())),
        })
        .collect();

    WardleyModel {
        graph: GraphModel::from_profile(profile),
        components,
    }
}

fn coordinate(value: Option<f64>) -> f64 {
    value.unwrap_or(DEFAULT_COORDINATE).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_parser::ParseOptions;

    fn convert_source(source: &str) -> WardleyModel {
        let document = trellis_parser::parse(source, &ParseOptions::default()).unwrap();
        convert_wardley(&document.profiles[0])
    }

    #[test]
    fn test_coordinates_resolved() {
        let model = convert_source(
            r#"
            profile wardley {
                node kettle [evolution: 0.6, visibility: 0.9];
                node power [evolution: 0.95, visibility: 0.2];
                kettle -> power;
            }
            "#,
        );
        assert_eq!(model.components[0].evolution, 0.6);
        assert_eq!(model.components[0].visibility, 0.9);
        assert_eq!(model.components[1].evolution, 0.95);
    }

    #[test]
    fn test_missing_and_clamped_coordinates() {
        let model = convert_source(
            r#"
            profile wardley {
                node vague;
                node extreme [evolution: 1.7, visibility: -0.3];
            }
            "#,
        );
        assert_eq!(model.components[0].evolution, 0.5);
        assert_eq!(model.components[0].visibility, 0.5);
        assert_eq!(model.components[1].evolution, 1.0);
        assert_eq!(model.components[1].visibility, 0.0);
    }

    #[test]
    fn test_malformed_coordinate_degrades() {
        let model = convert_source(
            r#"
            profile wardley {
                node odd [evolution: "somewhere"];
            }
            "#,
        );
        assert_eq!(model.components[0].evolution, 0.5);
    }
}
