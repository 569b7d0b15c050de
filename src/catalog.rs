//! Translate the untranslated entries of a PO catalog.
//!
//! Entries are handled one at a time, in file order. Each untranslated
//! singular entry has its placeholders swapped for anchor tokens, goes through
//! the provider, and gets its placeholders back before the result is stored as
//! `msgstr`. The catalog is written once, after every entry succeeded; any error
//! aborts the run and leaves the file on disk as it was.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use polib::catalog::Catalog;
use polib::message::{MessageMutView, MessageView};
use polib::po_file;
use tracing::{debug, info, warn};

use crate::mt::{
    MachineTranslator, MtError, MtResult, extract_placeholders, protect_placeholders,
    translator::validate_locale,
};
use crate::po_document::PoDocument;

/// Explicit configuration of a catalog run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslatorConfig {
    pub source_lang: String,
    pub target_lang: String,
    /// Fail the run instead of warning when a placeholder is lost in translation.
    pub strict_placeholders: bool,
}

impl TranslatorConfig {
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            strict_placeholders: false,
        }
    }

    pub fn with_strict_placeholders(mut self, strict: bool) -> Self {
        self.strict_placeholders = strict;
        self
    }
}

/// Counts of what happened to the entries of a catalog.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TranslationSummary {
    pub translated: usize,
    pub already_translated: usize,
    pub skipped_plural: usize,
    /// Translated entries whose placeholders differ from their source.
    pub placeholder_mismatches: usize,
}

impl TranslationSummary {
    /// Returns the number of entries looked at.
    pub fn total(&self) -> usize {
        self.translated + self.already_translated + self.skipped_plural
    }
}

impl Display for TranslationSummary {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{} translated, {} already translated, {} plural skipped",
            self.translated, self.already_translated, self.skipped_plural
        )?;
        if self.placeholder_mismatches > 0 {
            write!(f, ", {} with placeholder mismatches", self.placeholder_mismatches)?;
        }
        Ok(())
    }
}

fn is_pending(message: &(impl MessageView + ?Sized)) -> bool {
    !message.is_plural() && !has_msgstr(message)
}

fn has_msgstr(message: &(impl MessageView + ?Sized)) -> bool {
    message.msgstr().is_ok_and(|msgstr| !msgstr.is_empty())
}

/// Drives a [`MachineTranslator`] over a PO catalog.
pub struct CatalogTranslator<T> {
    translator: T,
    config: TranslatorConfig,
}

impl<T: MachineTranslator> CatalogTranslator<T> {
    pub fn new(translator: T, config: TranslatorConfig) -> Self {
        Self { translator, config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Load the catalog at `path`, translate it, and write it back in place.
    ///
    /// The file is only rewritten when at least one entry was translated, and
    /// then only the `msgstr` lines of the translated entries change. Header,
    /// comments and obsolete entries are kept as they are.
    pub async fn translate_file(&self, path: &Path) -> MtResult<TranslationSummary> {
        validate_locale(&self.config.source_lang)?;
        validate_locale(&self.config.target_lang)?;

        // Scanning first also rejects files polib cannot load without panicking.
        let mut document = PoDocument::load(path)?;
        let mut catalog = po_file::parse(path).map_err(|err| {
            MtError::CatalogError(format!("Could not parse {} as PO file: {err}", path.display()))
        })?;

        let summary = self.translate_catalog(&mut catalog).await?;
        if summary.translated == 0 {
            info!("No entries translated, leaving {} unchanged", path.display());
            return Ok(summary);
        }

        let updated = document.update_from(&catalog)?;
        debug!(updated, "Rewriting msgstr lines");
        document.save(path)?;
        info!("Translated PO file saved to {}", path.display());
        Ok(summary)
    }

    /// Translate every pending entry of `catalog` in memory.
    ///
    /// Plural entries and entries with a non-empty `msgstr` are left alone. Only
    /// `msgstr` is ever modified.
    pub async fn translate_catalog(&self, catalog: &mut Catalog) -> MtResult<TranslationSummary> {
        let pending = catalog.messages().filter(|msg| is_pending(*msg)).count();
        info!(
            provider = self.translator.provider_name(),
            source = %self.config.source_lang,
            target = %self.config.target_lang,
            "Found {pending} untranslated entries"
        );

        let mut summary = TranslationSummary::default();
        for mut message in catalog.messages_mut() {
            if message.is_plural() {
                debug!(msgid = message.msgid(), "Skipping plural entry");
                summary.skipped_plural += 1;
                continue;
            }
            if has_msgstr(&message) {
                debug!(msgid = message.msgid(), "Already translated");
                summary.already_translated += 1;
                continue;
            }

            let translated = self.translate_text(message.msgid(), &mut summary).await?;
            info!(msgid = message.msgid(), "Translated to {translated:?}");
            message
                .set_msgstr(translated)
                .map_err(|err| MtError::CatalogError(err.to_string()))?;
            summary.translated += 1;
        }

        Ok(summary)
    }

    /// Translate one string with its placeholders protected.
    async fn translate_text(
        &self,
        text: &str,
        summary: &mut TranslationSummary,
    ) -> MtResult<String> {
        let protected = protect_placeholders(text);
        let translated = self
            .translator
            .translate(
                &protected.masked,
                &self.config.source_lang,
                &self.config.target_lang,
            )
            .await?;
        let restored = protected.restore(&translated);

        let expected = extract_placeholders(text);
        let found = extract_placeholders(&restored);
        if expected != found {
            if self.config.strict_placeholders {
                return Err(MtError::PlaceholderMismatch {
                    msgid: text.to_string(),
                    expected,
                    found,
                });
            }
            warn!(
                msgid = text,
                ?expected,
                ?found,
                "Placeholders changed during translation"
            );
            summary.placeholder_mismatches += 1;
        }

        Ok(restored)
    }
}
