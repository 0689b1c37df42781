//! Z-ordered collection of SVG nodes.

use svg::node::element as svg_element;

pub(crate) type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum RenderLayer {
    Background,
    Cluster,
    Vertex,
    Edge,
    Text,
}

impl RenderLayer {
    fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Cluster => "cluster",
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Text => "text",
        }
    }
}

/// SVG nodes tagged with the layer they belong to.
#[derive(Debug, Default)]
pub(crate) struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: impl svg::Node + 'static) {
        self.items.push((layer, Box::new(node)));
    }

    /// Groups the nodes into one `<g data-layer=..>` per non-empty layer,
    /// keeping insertion order inside a layer.
    pub fn render(mut self) -> Vec<SvgNode> {
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current: Option<(RenderLayer, svg_element::Group)> = None;
        for (layer, node) in self.items {
            current = match current {
                Some((current_layer, group)) if current_layer == layer => {
                    Some((layer, group.add(node)))
                }
                previous => {
                    if let Some((_, group)) = previous {
                        result.push(Box::new(group) as SvgNode);
                    }
                    let group = svg_element::Group::new().set("data-layer", layer.name());
                    Some((layer, group.add(node)))
                }
            };
        }
        if let Some((_, group)) = current {
            result.push(Box::new(group) as SvgNode);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use svg::node::element::Rectangle;

    use super::*;

    #[test]
    fn test_render_groups_by_layer() {
        let mut output = LayeredOutput::default();
        output.add_to_layer(RenderLayer::Text, Rectangle::new());
        output.add_to_layer(RenderLayer::Cluster, Rectangle::new());
        output.add_to_layer(RenderLayer::Text, Rectangle::new());

        let nodes = output.render();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].to_string().contains(r#"data-layer="cluster""#));
        assert!(nodes[1].to_string().contains(r#"data-layer="text""#));
    }

    #[test]
    fn test_render_empty() {
        assert!(LayeredOutput::default().render().is_empty());
    }
}
