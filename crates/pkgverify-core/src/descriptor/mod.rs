//! Package descriptor documents.
//!
//! A descriptor is an XML document whose root element is `<packages>` and
//! whose `<package>` children each name an artifact:
//!
//! ```xml
//! <packages>
//!   <package>
//!     <packageName>tool</packageName>
//!     <version>1.2.0-20240131</version>
//!     <sha256>...64 hex chars...</sha256>
//!     <url>https://example.com/tool.exe</url>
//!   </package>
//! </packages>
//! ```

mod parse;

use std::fmt;

pub use parse::ParseError;

/// Tag the root element of every descriptor must carry.
pub const ROOT_TAG: &str = "packages";
/// Tag of one package entry.
pub const PACKAGE_TAG: &str = "package";

/// Sub-elements every package entry must carry with non-blank text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    PackageName,
    Version,
    Sha256,
    Url,
}

impl RequiredField {
    /// All required fields, in the order they are checked and reported.
    pub const ALL: [RequiredField; 4] = [
        RequiredField::PackageName,
        RequiredField::Version,
        RequiredField::Sha256,
        RequiredField::Url,
    ];

    /// XML element name of the field.
    pub fn tag(self) -> &'static str {
        match self {
            RequiredField::PackageName => "packageName",
            RequiredField::Version => "version",
            RequiredField::Sha256 => "sha256",
            RequiredField::Url => "url",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One `<package>` element as read from the document; any field may be absent.
///
/// Field values are trimmed, and blank text counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageEntry {
    pub package_name: Option<String>,
    pub version: Option<String>,
    pub sha256: Option<String>,
    pub url: Option<String>,
}

impl PackageEntry {
    pub fn get(&self, field: RequiredField) -> Option<&str> {
        match field {
            RequiredField::PackageName => self.package_name.as_deref(),
            RequiredField::Version => self.version.as_deref(),
            RequiredField::Sha256 => self.sha256.as_deref(),
            RequiredField::Url => self.url.as_deref(),
        }
    }

    /// Package name, when the entry has one. Used to label findings.
    pub fn name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// Promote to a complete descriptor, or report every missing field.
    pub fn to_descriptor(&self) -> Result<PackageDescriptor, MissingFields> {
        match (&self.package_name, &self.version, &self.sha256, &self.url) {
            (Some(package_name), Some(version), Some(sha256), Some(url)) => Ok(PackageDescriptor {
                package_name: package_name.clone(),
                version: version.clone(),
                sha256: sha256.clone(),
                url: url.clone(),
            }),
            _ => Err(MissingFields(self.missing_fields())),
        }
    }
}

/// A package entry with all four required fields present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    package_name: String,
    version: String,
    sha256: String,
    url: String,
}

impl PackageDescriptor {
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declared digest exactly as written (case preserved).
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Required fields absent from a package entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing {}", join_fields(.0))]
pub struct MissingFields(pub Vec<RequiredField>);

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| format!("'{}'", f.tag()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which `<package>` elements a parse collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only direct children of the root element.
    Children,
    /// Package elements at any depth below the root.
    Descendants,
}

/// A parsed descriptor document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    root_tag: String,
    packages: Vec<PackageEntry>,
}

impl Catalog {
    /// Parse descriptor text, collecting package entries per `scope`.
    pub fn parse(text: &str, scope: Scope) -> Result<Self, ParseError> {
        parse::parse_catalog(text, scope)
    }

    pub fn root_tag(&self) -> &str {
        &self.root_tag
    }

    pub fn has_expected_root(&self) -> bool {
        self.root_tag == ROOT_TAG
    }

    /// Package entries in document order.
    pub fn packages(&self) -> &[PackageEntry] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
