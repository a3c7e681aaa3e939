//! Sequence-diagram conversion: declaration order resolves lifelines,
//! edge order resolves the message sequence.

use log::debug;

use trellis_core::{
    document::{EdgeKind, Profile},
    identifier::Id,
};

use crate::convert::GraphModel;

/// A participant column (or row, depending on direction).
#[derive(Debug, Clone, PartialEq)]
pub struct Lifeline {
    pub id: Id,
    pub label: String,
}

/// One message between two lifelines; `index` is its position in the
/// global message order.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub index: usize,
    pub from: Id,
    pub to: Id,
    pub label: Option<String>,
    pub kind: EdgeKind,
}

/// The sequence-diagram domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceModel {
    pub graph: GraphModel,
    pub lifelines: Vec<Lifeline>,
    pub messages: Vec<Message>,
}

/// Resolve lifelines and ordered messages from a validated profile.
pub fn convert_sequence(profile: &Profile) -> SequenceModel {
    let lifelines: Vec<Lifeline> = profile
        .nodes
        .iter()
        .map(|node| Lifeline {
            id: node.id,
            label: node.display_text(),
        })
        .collect();

    let mut messages = Vec::with_capacity(profile.edges.len());
    for edge in &profile.edges {
        let endpoints_are_lifelines = lifelines.iter().any(|l| l.id == edge.source.id)
            && lifelines.iter().any(|l| l.id == edge.target.id);
        if !endpoints_are_lifelines {
            // Container endpoints have no place on a lifeline grid.
            debug!(
                source = edge.source.id.to_string(),
                target = edge.target.id.to_string();
                "Skipping message with non-lifeline endpoint",
            );
            continue;
        }
        messages.push(Message {
            index: messages.len(),
            from: edge.source.id,
            to: edge.target.id,
            label: edge.label.clone(),
            kind: edge.kind,
        });
    }

    SequenceModel {
        graph: GraphModel::from_profile(profile),
        lifelines,
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_parser::ParseOptions;

    fn convert_source(source: &str) -> SequenceModel {
        let document = trellis_parser::parse(source, &ParseOptions::default()).unwrap();
        convert_sequence(&document.profiles[0])
    }

    #[test]
    fn test_lifelines_in_declaration_order() {
        let model = convert_source(
            r#"
            profile sequence {
                node client [label: "Client"];
                node api;
                node db;
                client -> api: "POST /orders";
                api -> db: "INSERT";
                db -> api;
                api -> client: "201";
            }
            "#,
        );

        let ids: Vec<_> = model.lifelines.iter().map(|l| l.id.to_string()).collect();
        assert_eq!(ids, vec!["client", "api", "db"]);
        assert_eq!(model.lifelines[0].label, "Client");
        assert_eq!(model.lifelines[1].label, "api");
    }

    #[test]
    fn test_messages_keep_order_and_index() {
        let model = convert_source(
            r#"
            profile sequence {
                node a; node b;
                a -> b: "first";
                b -> a: "second";
                a <-> b: "third";
            }
            "#,
        );

        assert_eq!(model.messages.len(), 3);
        assert_eq!(model.messages[0].label.as_deref(), Some("first"));
        assert_eq!(model.messages[2].kind, EdgeKind::Bidirectional);
        for (i, message) in model.messages.iter().enumerate() {
            assert_eq!(message.index, i);
        }
    }

    #[test]
    fn test_container_endpoints_skipped() {
        let model = convert_source(
            r#"
            profile sequence {
                node a; node b;
                container group { b; }
                a -> group;
                a -> b;
            }
            "#,
        );
        assert_eq!(model.messages.len(), 1);
        assert_eq!(model.messages[0].to, Id::new("b"));
    }
}
