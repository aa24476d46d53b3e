use std::path::Path;

use fluent_bundle::{FluentArgs, FluentBundle, FluentResource};
use tracing::warn;
use unic_langid::LanguageIdentifier;

use crate::error::I18nError;

const FALLBACK_LANG: &str = "en";
const SUPPORTED: [&str; 2] = ["en", "de"];

/// Fluent-based internationalization.
pub struct I18n {
    bundle: FluentBundle<FluentResource>,
}

impl I18n {
    /// Load the `.ftl` file matching the system language, falling back to English.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let lang = detect_language();

        match Self::try_load(dir, lang) {
            Ok(i18n) => return i18n,
            Err(e) => warn!(lang, error = %e, "could not load translations"),
        }
        if lang != FALLBACK_LANG {
            match Self::try_load(dir, FALLBACK_LANG) {
                Ok(i18n) => return i18n,
                Err(e) => warn!(lang = FALLBACK_LANG, error = %e, "could not load translations"),
            }
        }

        // Message ids are shown verbatim.
        Self {
            bundle: FluentBundle::new(vec![LanguageIdentifier::default()]),
        }
    }

    fn try_load(dir: &Path, lang: &str) -> Result<Self, I18nError> {
        let path = dir.join(format!("{}.ftl", lang));
        let source = std::fs::read_to_string(&path).map_err(|source| I18nError::Io {
            path: path.clone(),
            source,
        })?;
        let resource = FluentResource::try_new(source)
            .map_err(|_| I18nError::Parse { path: path.clone() })?;
        let langid: LanguageIdentifier = lang
            .parse()
            .map_err(|_| I18nError::Language(lang.to_string()))?;
        let mut bundle = FluentBundle::new(vec![langid]);
        // Emoji and numbers must not be wrapped in bidi isolation marks.
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|_| I18nError::Bundle { path })?;
        Ok(Self { bundle })
    }

    /// Get a translated message by its identifier.
    pub fn t(&self, id: &str) -> String {
        self.format(id, None)
    }

    /// Get a translated message with arguments.
    pub fn t_args(&self, id: &str, args: &FluentArgs) -> String {
        self.format(id, Some(args))
    }

    fn format(&self, id: &str, args: Option<&FluentArgs>) -> String {
        let msg = match self.bundle.get_message(id) {
            Some(m) => m,
            None => return id.to_string(),
        };
        let pattern = match msg.value() {
            Some(p) => p,
            None => return id.to_string(),
        };
        let mut errors = vec![];
        self.bundle
            .format_pattern(pattern, args, &mut errors)
            .to_string()
    }
}

fn detect_language() -> &'static str {
    let sys_lang = sys_locale::get_locale()
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
        .to_lowercase();
    SUPPORTED
        .into_iter()
        .find(|code| sys_lang.starts_with(code))
        .unwrap_or(FALLBACK_LANG)
}
