//! Translate gettext PO catalogs with a machine translation provider.
//!
//! Format placeholders such as `{name}` and `%(name)s` are swapped for anchor
//! tokens before a string is sent to the provider and restored afterwards, so
//! translations keep the placeholders of their source.

pub mod catalog;
pub mod mt;
pub mod po_document;

pub use catalog::{CatalogTranslator, TranslationSummary, TranslatorConfig};
pub use mt::{DeepLProvider, MachineTranslator, MockMode, MockTranslator, MtError, MtResult};
pub use po_document::PoDocument;
