//! `#region` / `#endregion` matching.
//!
//! The grammar keeps region directives as `preproc_region` and
//! `preproc_endregion` nodes wherever they occur, so markers inside string
//! literals or comments never count. A marker stack over those nodes in
//! document order pairs them up. A `#region` left open runs to the end of
//! the file; an `#endregion` with nothing open is ignored.

use tree_sitter::Node;

use csguard_core::syntax;

/// A matched region span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Region name (text after `#region`, trimmed).
    pub name: String,
    /// Byte offset of the `#region` directive.
    pub start_byte: usize,
    /// Byte offset just past the `#endregion` directive (or end of file).
    pub end_byte: usize,
}

impl Region {
    /// Whether the region fully encloses `node`.
    #[must_use]
    pub fn contains(&self, node: Node<'_>) -> bool {
        self.contains_span(node.start_byte(), node.end_byte())
    }

    /// Whether the region fully encloses the byte span.
    #[must_use]
    pub fn contains_span(&self, start: usize, end: usize) -> bool {
        self.start_byte <= start && end <= self.end_byte
    }

    /// Whether exactly one of the region's markers lies inside `node`.
    #[must_use]
    pub fn crosses(&self, node: Node<'_>) -> bool {
        let (start, end) = (node.start_byte(), node.end_byte());
        let opens_inside = start <= self.start_byte && self.start_byte < end;
        let closes_inside = start < self.end_byte && self.end_byte <= end;
        opens_inside != closes_inside
    }
}

/// Collects every region under `root`, ordered by start offset.
#[must_use]
pub fn scan(root: Node<'_>, src: &str) -> Vec<Region> {
    let mut open: Vec<Region> = Vec::new();
    let mut closed = Vec::new();

    for node in syntax::descendants(root) {
        match node.kind() {
            "preproc_region" => open.push(Region {
                name: node
                    .child_by_field_name("content")
                    .map(|c| syntax::node_text(c, src).trim().to_string())
                    .unwrap_or_default(),
                start_byte: node.start_byte(),
                end_byte: root.end_byte(),
            }),
            "preproc_endregion" => {
                if let Some(mut region) = open.pop() {
                    region.end_byte = node.end_byte();
                    closed.push(region);
                }
            }
            _ => {}
        }
    }

    closed.extend(open);
    closed.sort_by_key(|r| r.start_byte);
    closed
}

/// Returns the innermost region enclosing `node`.
#[must_use]
pub fn innermost<'r>(regions: &'r [Region], node: Node<'_>) -> Option<&'r Region> {
    regions
        .iter()
        .filter(|r| r.contains(node))
        .max_by_key(|r| r.start_byte)
}

/// Returns the first region with one marker inside `node` and one outside.
#[must_use]
pub fn first_crossing<'r>(regions: &'r [Region], node: Node<'_>) -> Option<&'r Region> {
    regions.iter().find(|r| r.crosses(node))
}

/// Returns the regions inside `scope` that are not nested in another region
/// inside `scope`.
#[must_use]
pub fn top_level_within<'r>(regions: &'r [Region], scope: Node<'_>) -> Vec<&'r Region> {
    let inside: Vec<&Region> = regions.iter().filter(|r| within(r, scope)).collect();
    inside
        .iter()
        .copied()
        .filter(|r| {
            !inside
                .iter()
                .any(|outer| !std::ptr::eq(*outer, *r) && outer.contains_span(r.start_byte, r.end_byte))
        })
        .collect()
}

fn within(region: &Region, scope: Node<'_>) -> bool {
    scope.start_byte() <= region.start_byte && region.end_byte <= scope.end_byte()
}
