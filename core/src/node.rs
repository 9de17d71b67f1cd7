//! Assembled element tree.
//!
//! A [`Node`] is created when an element's start tag is seen below the depth
//! threshold. Children are grouped by tag name into [`Child`] slots, which
//! hold a single node until a second same-named sibling shows up and are
//! then promoted to a sequence for good.

use std::collections::BTreeMap;

/// Attribute mapping as delivered with an element-start event.
pub type Attributes = BTreeMap<String, String>;

/// One XML element instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    path: String,
    name: String,
    attributes: Attributes,
    text: Option<String>,
    children: Children,
}

impl Node {
    pub(crate) fn new(path: String, name: String, attributes: Attributes) -> Self {
        Self {
            path,
            name,
            attributes,
            text: None,
            children: Children::default(),
        }
    }

    /// Ancestor names from the document root to this element, joined by the
    /// configured separator.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Tag name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes from the start tag.
    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Looks up a single attribute value.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Trimmed character data directly inside this element.
    ///
    /// `None` when the element had no text or only whitespace.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Child slots, in the order their names first appeared.
    #[inline]
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Returns the slot for `name`, if any child with that name exists.
    #[inline]
    pub fn child(&self, name: &str) -> Option<&Child> {
        self.children.get(name)
    }

    /// Returns the first child named `name`.
    pub fn first(&self, name: &str) -> Option<&Node> {
        self.children.get(name).and_then(Child::first)
    }

    pub(crate) fn push_text(&mut self, chunk: &str) {
        self.text.get_or_insert_with(String::new).push_str(chunk);
    }

    pub(crate) fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    /// Finalizes text once the element closes.
    pub(crate) fn seal(&mut self) {
        if let Some(text) = self.text.take() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                self.text = Some(if trimmed.len() == text.len() {
                    text
                } else {
                    trimmed.to_owned()
                });
            }
        }
    }
}

/// Children sharing one tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Child {
    /// No child seen yet.
    #[default]
    Empty,
    /// Exactly one child seen.
    One(Node),
    /// Two or more children, in document order.
    Many(Vec<Node>),
}

impl Child {
    /// Adds a sibling, promoting `One` to `Many` on the second one.
    pub fn push(&mut self, node: Node) {
        *self = match std::mem::take(self) {
            Child::Empty => Child::One(node),
            Child::One(first) => Child::Many(vec![first, node]),
            Child::Many(mut nodes) => {
                nodes.push(node);
                Child::Many(nodes)
            }
        };
    }

    /// Number of nodes in the slot.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Child::Empty)
    }

    /// True once the slot has been promoted to a sequence.
    #[inline]
    pub fn is_many(&self) -> bool {
        matches!(self, Child::Many(_))
    }

    /// Nodes in the slot as a slice, whatever its shape.
    pub fn as_slice(&self) -> &[Node] {
        match self {
            Child::Empty => &[],
            Child::One(node) => std::slice::from_ref(node),
            Child::Many(nodes) => nodes,
        }
    }

    #[inline]
    pub fn first(&self) -> Option<&Node> {
        self.as_slice().first()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.as_slice().iter()
    }
}

impl<'a> IntoIterator for &'a Child {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Named child slots of a node.
///
/// Lookup is linear; elements rarely have more than a handful of distinct
/// child names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children {
    fields: Vec<(String, Child)>,
}

impl Children {
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Child> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, child)| child)
    }

    /// Number of children named `name`.
    #[inline]
    pub fn count(&self, name: &str) -> usize {
        self.get(name).map_or(0, Child::len)
    }

    /// Number of distinct child names.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(name, slot)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Child)> {
        self.fields.iter().map(|(name, child)| (name.as_str(), child))
    }

    /// Attaches `node` under its own name.
    pub(crate) fn push(&mut self, node: Node) {
        match self.fields.iter_mut().find(|(field, _)| *field == node.name) {
            Some((_, child)) => child.push(node),
            None => {
                let name = node.name.clone();
                self.fields.push((name, Child::One(node)));
            }
        }
    }
}

#[cfg(feature = "serde")]
mod serialize {
    //! Object-shaped serialization: `$path`, `$name`, `$`, `$text`, then one
    //! entry per child name.

    use super::{Child, Node};
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    impl Serialize for Node {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let len = 3 + usize::from(self.text.is_some()) + self.children.len();
            let mut map = serializer.serialize_map(Some(len))?;
            map.serialize_entry("$path", &self.path)?;
            map.serialize_entry("$name", &self.name)?;
            map.serialize_entry("$", &self.attributes)?;
            if let Some(text) = &self.text {
                map.serialize_entry("$text", text)?;
            }
            for (name, child) in self.children.iter() {
                map.serialize_entry(name, child)?;
            }
            map.end()
        }
    }

    impl Serialize for Child {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Child::Empty => serializer.serialize_none(),
                Child::One(node) => node.serialize(serializer),
                Child::Many(nodes) => {
                    let mut seq = serializer.serialize_seq(Some(nodes.len()))?;
                    for node in nodes {
                        seq.serialize_element(node)?;
                    }
                    seq.end()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(path: &str, name: &str) -> Node {
        Node::new(path.to_string(), name.to_string(), Attributes::new())
    }

    #[test]
    fn child_promotes_on_second_sibling() {
        let mut slot = Child::default();
        assert!(slot.is_empty());

        slot.push(leaf("a/b", "b"));
        assert!(matches!(slot, Child::One(_)));
        assert_eq!(slot.len(), 1);

        slot.push(leaf("a/b", "b"));
        assert!(slot.is_many());
        assert_eq!(slot.len(), 2);

        slot.push(leaf("a/b", "b"));
        assert!(slot.is_many());
        assert_eq!(slot.len(), 3);
    }

    #[test]
    fn children_keep_first_appearance_order() {
        let mut children = Children::default();
        children.push(leaf("a/x", "x"));
        children.push(leaf("a/y", "y"));
        children.push(leaf("a/x", "x"));

        let names: Vec<_> = children.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(children.count("x"), 2);
        assert_eq!(children.count("y"), 1);
        assert_eq!(children.count("z"), 0);
    }

    #[test]
    fn seal_trims_text() {
        let mut node = leaf("a", "a");
        node.push_text("  hi ");
        node.push_text(" there\n");
        node.seal();
        assert_eq!(node.text(), Some("hi  there"));
    }

    #[test]
    fn seal_drops_blank_text() {
        let mut node = leaf("a", "a");
        node.push_text(" \n\t ");
        node.seal();
        assert_eq!(node.text(), None);
    }

    #[test]
    fn seal_without_text_is_noop() {
        let mut node = leaf("a", "a");
        node.seal();
        assert_eq!(node.text(), None);
    }

    #[test]
    fn first_and_attribute_lookups() {
        let mut attributes = Attributes::new();
        attributes.insert("id".to_string(), "7".to_string());
        let mut parent = Node::new("a".to_string(), "a".to_string(), attributes);
        parent.children_mut().push(leaf("a/b", "b"));

        assert_eq!(parent.attribute("id"), Some("7"));
        assert_eq!(parent.attribute("missing"), None);
        assert_eq!(parent.first("b").map(Node::path), Some("a/b"));
        assert!(parent.first("c").is_none());
    }
}
