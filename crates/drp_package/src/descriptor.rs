//! Typed DAZ Install Manager descriptor documents.
//!
//! Both documents have a fixed, enumerable element set and are serialized
//! through `quick-xml`'s event writer. Attribute order is stable across runs
//! because existing installer consumers are sensitive to it.

use std::io;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::writer::Writer;
use uuid::Uuid;

/// Archive entry name of the install manifest document.
pub const MANIFEST_ENTRY_NAME: &str = "Manifest.dsx";

/// Archive entry name of the product supplement document.
pub const SUPPLEMENT_ENTRY_NAME: &str = "Supplement.dsx";

const DOCUMENT_VERSION: &str = "0.1";
const INSTALL_TARGET: &str = "Content";
const INSTALL_ACTION: &str = "Install";
const INSTALL_TYPES: &str = "Content";
const PRODUCT_TAGS: &str = "DAZStudio4_5";

/// Library tag prepended to repackaged product names so they are
/// recognizable inside an installer library.
const PRODUCT_NAME_TAG: &str = "[DZRP]";

/// Install manifest: one install instruction per canonical file entry, plus
/// a run-scoped unique identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallManifest {
    pub global_id: String,
    pub files: Vec<String>,
}

impl InstallManifest {
    /// Build a manifest from resolved entries, dropping the filtered ones.
    pub fn from_canonical_entries(entries: &[Option<String>]) -> Self {
        Self {
            global_id: Uuid::new_v4().to_string(),
            files: entries.iter().flatten().cloned().collect(),
        }
    }

    pub fn to_xml(&self) -> io::Result<String> {
        let mut writer = document_writer();

        let mut root = BytesStart::new("DAZInstallManifest");
        root.push_attribute(("VERSION", DOCUMENT_VERSION));
        emit(&mut writer, Event::Start(root))?;

        let mut global_id = BytesStart::new("GlobalID");
        global_id.push_attribute(("VALUE", self.global_id.as_str()));
        emit(&mut writer, Event::Empty(global_id))?;

        for file in &self.files {
            let mut element = BytesStart::new("File");
            element.push_attribute(("TARGET", INSTALL_TARGET));
            element.push_attribute(("ACTION", INSTALL_ACTION));
            element.push_attribute(("VALUE", file.as_str()));
            emit(&mut writer, Event::Empty(element))?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("DAZInstallManifest")))?;
        into_document(writer)
    }
}

/// Product supplement: the display name plus fixed install-type and
/// product-classification tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSupplement {
    pub product_name: String,
}

impl ProductSupplement {
    pub fn new(display_name: &str) -> Self {
        Self {
            product_name: format!("{} {}", PRODUCT_NAME_TAG, display_name),
        }
    }

    pub fn to_xml(&self) -> io::Result<String> {
        let mut writer = document_writer();

        let mut root = BytesStart::new("ProductSupplement");
        root.push_attribute(("VERSION", DOCUMENT_VERSION));
        emit(&mut writer, Event::Start(root))?;

        let mut name = BytesStart::new("ProductName");
        name.push_attribute(("VALUE", self.product_name.as_str()));
        emit(&mut writer, Event::Empty(name))?;

        let mut install_types = BytesStart::new("InstallTypes");
        install_types.push_attribute(("VALUE", INSTALL_TYPES));
        emit(&mut writer, Event::Empty(install_types))?;

        let mut tags = BytesStart::new("ProductTags");
        tags.push_attribute(("VALUE", PRODUCT_TAGS));
        emit(&mut writer, Event::Empty(tags))?;

        emit(&mut writer, Event::End(BytesEnd::new("ProductSupplement")))?;
        into_document(writer)
    }
}

fn document_writer() -> Writer<Vec<u8>> {
    Writer::new_with_indent(Vec::new(), b' ', 2)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> io::Result<()> {
    writer.write_event(event).map_err(io::Error::other)
}

fn into_document(writer: Writer<Vec<u8>>) -> io::Result<String> {
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(io::Error::other)
}
