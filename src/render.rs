//! Drawing boundary.
//!
//! The crate draws nothing itself. A renderer implements [`Painter`] and
//! [`paint`] walks the layout in draw order: clear, every edge, every node.

use crate::graph::{Edge, Node};
use crate::layout::ForceDirectedLayout;
use crate::physics::{Spring, Vector};

/// Capabilities a renderer provides. Positions are in simulation
/// coordinates; mapping to the screen is up to the implementor.
pub trait Painter {
    fn clear(&mut self);
    fn draw_edge(&mut self, edge: &Edge, spring: &Spring, from: Vector, to: Vector);
    fn draw_node(&mut self, node: &Node, position: Vector);
}

/// Paint one frame of `layout`.
///
/// Edges are drawn between their spring's endpoints, so a reverse edge that
/// shares another edge's spring is drawn in its own direction.
pub fn paint<P: Painter + ?Sized>(layout: &ForceDirectedLayout, painter: &mut P) {
    painter.clear();

    layout.each_edge(|edge, spring| {
        let (Some(from), Some(to)) = (layout.point(spring.point1()), layout.point(spring.point2()))
        else {
            return;
        };
        painter.draw_edge(edge, spring, from.position(), to.position());
    });

    layout.each_node(|node, point| painter.draw_node(node, point.position()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeData, NodeData, NodeId};
    use crate::layout::LayoutConfig;

    #[derive(Debug, PartialEq)]
    enum Call {
        Clear,
        Edge(NodeId, NodeId, Vector, Vector),
        Node(NodeId, Vector),
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl Painter for Recorder {
        fn clear(&mut self) {
            self.0.push(Call::Clear);
        }

        fn draw_edge(&mut self, edge: &Edge, _spring: &Spring, from: Vector, to: Vector) {
            self.0.push(Call::Edge(edge.source, edge.target, from, to));
        }

        fn draw_node(&mut self, node: &Node, position: Vector) {
            self.0.push(Call::Node(node.id, position));
        }
    }

    #[test]
    fn test_paint_order() {
        let mut layout = ForceDirectedLayout::new(LayoutConfig {
            seed: Some(2),
            ..LayoutConfig::default()
        });
        let a = layout.add_node(NodeData::default()).unwrap();
        let b = layout.add_node(NodeData::default()).unwrap();
        layout.add_edge(a, b, EdgeData::default()).unwrap();
        layout.add_edge(b, a, EdgeData::default()).unwrap();
        let pa = Vector::new(1.0, 2.0);
        let pb = Vector::new(-3.0, 4.0);
        layout.set_position(a, pa);
        layout.set_position(b, pb);

        let mut recorder = Recorder::default();
        paint(&layout, &mut recorder);

        assert_eq!(
            recorder.0,
            vec![
                Call::Clear,
                Call::Edge(a, b, pa, pb),
                Call::Edge(b, a, pb, pa),
                Call::Node(a, pa),
                Call::Node(b, pb),
            ]
        );
    }

    #[test]
    fn test_paint_empty_layout_only_clears() {
        let layout = ForceDirectedLayout::default();
        let mut recorder = Recorder::default();
        paint(&layout, &mut recorder);
        assert_eq!(recorder.0, vec![Call::Clear]);
    }
}
