use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Lexical description of a language as it appears in configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LanguageSpec {
    pub name: String,
    pub extensions: Vec<String>,
    pub keywords: Vec<String>,
    pub line_comment: Option<String>,
    /// `[open, close]`.
    pub block_comment: Option<(String, String)>,
    pub string_delimiters: Vec<char>,
    pub escape: Option<char>,
}

/// A language ready for tokenizing (keyword set built once).
#[derive(Debug, Clone)]
pub struct Language {
    pub(crate) name: String,
    pub(crate) extensions: Vec<String>,
    pub(crate) keywords: HashSet<String>,
    pub(crate) line_comment: Option<String>,
    pub(crate) block_comment: Option<(String, String)>,
    pub(crate) string_delimiters: Vec<char>,
    pub(crate) escape: Option<char>,
}

impl From<LanguageSpec> for Language {
    fn from(spec: LanguageSpec) -> Self {
        // Empty markers would match everywhere.
        let line_comment = spec.line_comment.filter(|m| !m.is_empty());
        let block_comment = spec
            .block_comment
            .filter(|(open, close)| !open.is_empty() && !close.is_empty());
        Self {
            name: spec.name,
            extensions: spec
                .extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            keywords: spec.keywords.into_iter().collect(),
            line_comment,
            block_comment,
            string_delimiters: spec.string_delimiters,
            escape: spec.escape,
        }
    }
}

fn words(list: &str) -> Vec<String> {
    list.split_whitespace().map(str::to_string).collect()
}

impl Language {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    pub fn has_block_comments(&self) -> bool {
        self.block_comment.is_some()
    }

    /// No rules at all: every line tokenizes to nothing.
    pub fn plain() -> Self {
        LanguageSpec {
            name: "plain".into(),
            extensions: vec!["txt".into()],
            ..LanguageSpec::default()
        }
        .into()
    }

    pub fn rust() -> Self {
        LanguageSpec {
            name: "rust".into(),
            extensions: vec!["rs".into()],
            keywords: words(
                "as async await break const continue crate dyn else enum extern false fn for if \
                 impl in let loop match mod move mut pub ref return self Self static struct super \
                 trait true type unsafe use where while",
            ),
            line_comment: Some("//".into()),
            block_comment: Some(("/*".into(), "*/".into())),
            string_delimiters: vec!['"'],
            escape: Some('\\'),
        }
        .into()
    }

    pub fn c() -> Self {
        LanguageSpec {
            name: "c".into(),
            extensions: ["c", "h", "cc", "cpp", "hpp", "cxx"]
                .into_iter()
                .map(String::from)
                .collect(),
            keywords: words(
                "auto break case char class const continue default delete do double else enum \
                 extern float for goto if inline int long namespace new private protected public \
                 register return short signed sizeof static struct switch template this typedef \
                 union unsigned using virtual void volatile while",
            ),
            line_comment: Some("//".into()),
            block_comment: Some(("/*".into(), "*/".into())),
            string_delimiters: vec!['"', '\''],
            escape: Some('\\'),
        }
        .into()
    }

    pub fn python() -> Self {
        LanguageSpec {
            name: "python".into(),
            extensions: vec!["py".into()],
            keywords: words(
                "False None True and as assert async await break class continue def del elif \
                 else except finally for from global if import in is lambda nonlocal not or pass \
                 raise return try while with yield",
            ),
            line_comment: Some("#".into()),
            block_comment: None,
            string_delimiters: vec!['"', '\''],
            escape: Some('\\'),
        }
        .into()
    }
}

/// Known languages, looked up by name or file extension.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self {
            languages: vec![
                Language::plain(),
                Language::rust(),
                Language::c(),
                Language::python(),
            ],
        }
    }
}

impl LanguageRegistry {
    /// Add `spec`, replacing any language with the same name.
    pub fn register(&mut self, spec: LanguageSpec) {
        let language = Language::from(spec);
        debug!(target: "syntax", name = language.name.as_str(), keywords = language.keywords.len(), "language_registered");
        if let Some(existing) = self.languages.iter_mut().find(|l| l.name == language.name) {
            *existing = language;
        } else {
            self.languages.push(language);
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.name == name)
    }

    /// Language whose extension list contains the extension of `path`.
    pub fn for_path(&self, path: &Path) -> Option<&Language> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.languages
            .iter()
            .find(|l| l.extensions.iter().any(|e| *e == ext))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(Language::name)
    }
}
