//! Part/net conversion for the schematic-family profiles (electrical
//! schematics, digital logic, P&ID).
//!
//! A part's kind is its declared shape reference. Pins are declared in
//! the node's data bag under `pins`, mapping pin names to net names:
//!
//! ```text
//! node r1: resistor [data: { pins: { a: vcc, b: out } }];
//! ```
//!
//! A net is the set of all part/pin pairs sharing a net name; multiple
//! declarations of the same net name union into one net, never
//! creating duplicates.

use indexmap::IndexMap;
use log::debug;

use trellis_core::{document::Profile, identifier::Id, value::Value};
use trellis_parser::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError};

use crate::convert::GraphModel;

/// A pin on a part, tied to a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    pub pin: Id,
    pub net: Id,
}

/// A part/pin pair inside a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRef {
    pub part: Id,
    pub pin: Id,
}

/// One component of the schematic.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub id: Id,
    /// The part kind (its shape reference); required.
    pub kind: Id,
    pub label: Option<String>,
    /// Pin assignments in declaration order.
    pub pins: Vec<PinAssignment>,
}

/// An electrical net: every part/pin pair attached to one net name.
#[derive(Debug, Clone, PartialEq)]
pub struct Net {
    pub name: Id,
    pub members: Vec<PinRef>,
}

/// The schematic-family domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct PartModel {
    pub graph: GraphModel,
    pub parts: Vec<Part>,
    pub nets: Vec<Net>,
}

impl PartModel {
    pub fn net(&self, name: Id) -> Option<&Net> {
        self.nets.iter().find(|n| n.name == name)
    }
}

/// Build parts and nets from a validated profile.
///
/// Every node must declare a shape (its part kind); all missing kinds
/// are reported together as domain errors. Malformed pin declarations
/// degrade: the offending entry is skipped, the part survives.
pub fn convert_parts(profile: &Profile) -> Result<PartModel, ParseError> {
    let mut collector = DiagnosticCollector::new();
    let mut parts = Vec::with_capacity(profile.nodes.len());
    let mut nets: IndexMap<Id, Net> = IndexMap::new();

    for node in &profile.nodes {
        let Some(kind) = node.shape else {
            collector.emit(
                Diagnostic::error(format!("part `{}` declares no type", node.id))
                    .with_code(ErrorCode::E400)
                    .with_help("give the part a shape: `node r1: resistor;`"),
            );
            continue;
        };

        let mut pins = Vec::new();
        match node.data.get("pins") {
            Some(Value::Map(pin_map)) => {
                for (pin_name, net_value) in pin_map {
                    let net = match net_value {
                        Value::Ref(id) => *id,
                        Value::String(name) => Id::new(name),
                        other => {
                            debug!(
                                part = node.id.to_string(),
                                pin = pin_name.as_str(),
                                value:? = other;
                                "Skipping malformed pin declaration",
                            );
                            continue;
                        }
                    };
                    pins.push(PinAssignment {
                        pin: Id::new(pin_name),
                        net,
                    });
                }
            }
            Some(other) => {
                debug!(
                    part = node.id.to_string(),
                    value:? = other;
                    "Skipping malformed pins attribute",
                );
            }
            None => {}
        }

        for assignment in &pins {
            let net = nets.entry(assignment.net).or_insert_with(|| Net {
                name: assignment.net,
                members: Vec::new(),
            });
            let member = PinRef {
                part: node.id,
                pin: assignment.pin,
            };
            // Re-declaring the same attachment unions to one entry.
            if !net.members.contains(&member) {
                net.members.push(member);
            }
        }

        parts.push(Part {
            id: node.id,
            kind,
            label: node.label.clone(),
            pins,
        });
    }

    collector.finish_with(PartModel {
        graph: GraphModel::from_profile(profile),
        parts,
        nets: nets.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_parser::ParseOptions;

    fn convert_source(source: &str) -> Result<PartModel, ParseError> {
        let document = trellis_parser::parse(source, &ParseOptions::default()).unwrap();
        convert_parts(&document.profiles[0])
    }

    #[test]
    fn test_nets_union_by_name() {
        let model = convert_source(
            r#"
            profile schematic {
                node v1: battery [data: { pins: { pos: vcc, neg: gnd } }];
                node r1: resistor [data: { pins: { a: vcc, b: out } }];
                node r2: resistor [data: { pins: { a: out, b: gnd } }];
            }
            "#,
        )
        .unwrap();

        assert_eq!(model.parts.len(), 3);
        assert_eq!(model.nets.len(), 3); // vcc, gnd, out

        let vcc = model.net(Id::new("vcc")).unwrap();
        assert_eq!(vcc.members.len(), 2);
        assert_eq!(vcc.members[0].part, Id::new("v1"));
        assert_eq!(vcc.members[1].part, Id::new("r1"));

        let gnd = model.net(Id::new("gnd")).unwrap();
        assert_eq!(gnd.members.len(), 2);
    }

    #[test]
    fn test_duplicate_attachment_not_duplicated() {
        let model = convert_source(
            r#"
            profile schematic {
                node j1: junction [data: { pins: { a: bus, b: bus } }];
            }
            "#,
        )
        .unwrap();
        // Two pins on the same net are two members...
        assert_eq!(model.net(Id::new("bus")).unwrap().members.len(), 2);
        // ...but the part lists both assignments in order.
        assert_eq!(model.parts[0].pins.len(), 2);
    }

    #[test]
    fn test_missing_part_type_is_domain_error() {
        let err = convert_source(
            r#"
            profile schematic {
                node anon;
                node also_anon;
            }
            "#,
        )
        .unwrap_err();
        // Both missing kinds are reported in one pass.
        assert_eq!(err.diagnostics().len(), 2);
        assert!(
            err.diagnostics()
                .iter()
                .all(|d| d.code() == Some(ErrorCode::E400))
        );
    }

    #[test]
    fn test_malformed_pins_degrade() {
        let model = convert_source(
            r#"
            profile schematic {
                node r1: resistor [data: { pins: { a: 42, b: gnd } }];
                node r2: resistor [data: { pins: "oops" }];
            }
            "#,
        )
        .unwrap();
        // The malformed entries are omitted, not fatal.
        assert_eq!(model.parts[0].pins.len(), 1);
        assert!(model.parts[1].pins.is_empty());
        assert_eq!(model.nets.len(), 1);
    }

    #[test]
    fn test_partless_profile_is_empty_model() {
        let model = convert_source("profile pid { }").unwrap();
        assert!(model.parts.is_empty());
        assert!(model.nets.is_empty());
    }
}
