// Attribute tree domain model

/// A leaf measurement or property. `unit` is empty when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub unit: String,
}

impl Attribute {
    pub fn new(name: String, value: String, unit: String) -> Self {
        Self { name, value, unit }
    }
}

/// Pointer to another root document, possibly served by a different stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubQueryRef {
    pub iri: String,
    pub source: Option<String>,
}

/// One branch of the metadata document.
///
/// `display_order` interleaves the names of `attributes` and `sub_groups`
/// in discovery order; each name resolves to exactly one child.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeGroup {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub sub_groups: Vec<AttributeGroup>,
    pub display_order: Vec<String>,
    pub is_collapsed: bool,
    pub sub_query_ref: Option<SubQueryRef>,
}

/// Result of classifying one field of a branch.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeNode {
    Leaf(Attribute),
    Group(AttributeGroup),
}

/// A child of a group, resolved through the display order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayEntry<'a> {
    Attribute(&'a Attribute),
    Group(&'a AttributeGroup),
}

/// What expanding a group node asks of its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Children are already present; toggle locally.
    Local,
    /// Replace the whole tree with the document behind this reference.
    Subquery(SubQueryRef),
}

impl AttributeGroup {
    /// An empty group, used when the branch is missing or malformed.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a classified child and record it in the display order.
    pub fn push(&mut self, node: AttributeNode) {
        match node {
            AttributeNode::Leaf(attribute) => {
                self.display_order.push(attribute.name.clone());
                self.attributes.push(attribute);
            }
            AttributeNode::Group(group) => {
                self.display_order.push(group.name.clone());
                self.sub_groups.push(group);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.display_order.iter().any(|n| n == name)
    }

    pub fn expansion(&self) -> Expansion {
        match &self.sub_query_ref {
            Some(reference) => Expansion::Subquery(reference.clone()),
            None => Expansion::Local,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn sub_group(&self, name: &str) -> Option<&AttributeGroup> {
        self.sub_groups.iter().find(|g| g.name == name)
    }

    /// Children in display order.
    pub fn entries(&self) -> impl Iterator<Item = DisplayEntry<'_>> + '_ {
        self.display_order.iter().filter_map(|name| {
            self.attribute(name)
                .map(DisplayEntry::Attribute)
                .or_else(|| self.sub_group(name).map(DisplayEntry::Group))
        })
    }

    /// Locate a nested group by names below this one. An empty path is `self`.
    pub fn find_group<S: AsRef<str>>(&self, path: &[S]) -> Option<&AttributeGroup> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.sub_group(head.as_ref())?.find_group(rest),
        }
    }
}
