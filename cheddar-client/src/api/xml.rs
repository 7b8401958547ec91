//! Owned XML element tree
//!
//! Responses are parsed with `roxmltree` and copied into [`XmlElement`] so a
//! parsed document can outlive the response body it came from.

/// A single XML element with its attributes, leading text and child elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element
    pub fn parse(input: &str) -> Result<Self, roxmltree::Error> {
        let document = roxmltree::Document::parse(input)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        XmlElement {
            tag: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            text: node.text().map(str::to_string),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(Self::from_node)
                .collect(),
        }
    }

    /// Build an element by hand
    pub fn new(tag: impl Into<String>) -> Self {
        XmlElement {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text before the first child element, `None` when the element is empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True when the element has children and they all share one tag
    pub fn has_uniform_children(&self) -> bool {
        match self.children.split_first() {
            Some((first, rest)) => rest.iter().all(|child| child.tag == first.tag),
            None => false,
        }
    }

    /// All elements named `tag` in document order, this element included
    pub fn descendants<'a>(&'a self, tag: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(tag, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, tag: &str, found: &mut Vec<&'a XmlElement>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in &self.children {
            child.collect_descendants(tag, found);
        }
    }

    /// First element named `tag` below this one (this element excluded)
    pub fn find(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find_map(|child| {
            if child.tag == tag {
                Some(child)
            } else {
                child.find(tag)
            }
        })
    }
}
