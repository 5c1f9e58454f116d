//! Parse descriptor XML into a Catalog.

use roxmltree::{Document, Node, ParsingOptions};

use super::{Catalog, PackageEntry, RequiredField, Scope, PACKAGE_TAG};

/// Malformed XML. Carries the parser's message, which includes the position.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(#[from] roxmltree::Error);

pub(crate) fn parse_catalog(text: &str, scope: Scope) -> Result<Catalog, ParseError> {
    // A DOCTYPE declaration is well-formed XML; only undeclared entities fail.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;
    let root = doc.root_element();

    let packages = match scope {
        Scope::Children => root
            .children()
            .filter(is_package)
            .map(|n| read_entry(&n))
            .collect(),
        Scope::Descendants => root
            .descendants()
            .filter(|n| n.id() != root.id())
            .filter(is_package)
            .map(|n| read_entry(&n))
            .collect(),
    };

    Ok(Catalog {
        root_tag: root.tag_name().name().to_string(),
        packages,
    })
}

fn is_package(node: &Node<'_, '_>) -> bool {
    node.is_element() && node.has_tag_name(PACKAGE_TAG)
}

fn read_entry(package: &Node<'_, '_>) -> PackageEntry {
    PackageEntry {
        package_name: field_text(package, RequiredField::PackageName),
        version: field_text(package, RequiredField::Version),
        sha256: field_text(package, RequiredField::Sha256),
        url: field_text(package, RequiredField::Url),
    }
}

/// Trimmed text of the first direct child named after `field`; blank is None.
fn field_text(package: &Node<'_, '_>, field: RequiredField) -> Option<String> {
    let element = package
        .children()
        .find(|n| n.is_element() && n.has_tag_name(field.tag()))?;
    let text = leading_text(&element);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Text content up to the first child element, with comments and
/// processing instructions skipped. CDATA sections count as text.
fn leading_text(element: &Node<'_, '_>) -> String {
    element
        .children()
        .take_while(|n| !n.is_element())
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}
