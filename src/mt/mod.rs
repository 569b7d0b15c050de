/// Machine Translation Module
///
/// Everything needed to push one string through a machine translation provider
/// without damaging the format placeholders it carries.
///
/// # Overview
///
/// 1. **Anchor tokens** - Swap `{name}` and `%(name)s` placeholders for opaque tokens
///    before translation and put them back afterwards
/// 2. **MT Trait & Providers** - Generic trait for MT systems with a DeepL implementation
/// 3. **Mock provider** - Deterministic provider for tests and offline runs
///
/// # Example
///
/// ```ignore
/// use po_translator::mt::{DeepLProvider, MachineTranslator, protect_placeholders};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let protected = protect_placeholders("Hello {name}, you have {count} messages");
///     let provider = DeepLProvider::new("your-key:fx".to_string())?;
///     let translated = provider.translate(&protected.masked, "en", "es").await?;
///     println!("{}", protected.restore(&translated));
///     Ok(())
/// }
/// ```
pub mod anchor;
pub mod deepl;
pub mod error;
pub mod mock;
pub mod translator;

pub use anchor::{
    AnchorToken, ProtectedText, extract_placeholders, protect_placeholders, restore_placeholders,
};
pub use deepl::DeepLProvider;
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockTranslator};
pub use translator::MachineTranslator;
