//! Tokens in the dependency tree.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;
use std::iter::FromIterator;
use std::mem;
use std::ops::{Deref, DerefMut};

use itertools::Itertools;
use thiserror::Error;

use crate::graph::{DependencyTree, Iter, IterMut, Node};

/// The placeholder for an absent column value.
pub const EMPTY_FIELD: &str = "_";

/// A builder for `Token`s.
///
/// A token carries a fair number of optional fields, so constructing
/// one field-by-field gets tedious. This builder provides a fluent
/// interface for creating `Token`s.
pub struct TokenBuilder {
    token: Token,
}

impl TokenBuilder {
    /// Create a `Token` builder with all non-form fields set to absent.
    pub fn new(form: impl Into<String>) -> TokenBuilder {
        TokenBuilder {
            token: Token::new(form),
        }
    }

    /// Set the word form or punctuation symbol.
    pub fn form(mut self, form: impl Into<String>) -> TokenBuilder {
        self.token.set_form(form);
        self
    }

    /// Set the lemma or stem of the word form.
    pub fn lemma(mut self, lemma: impl Into<String>) -> TokenBuilder {
        self.token.set_lemma(Some(lemma));
        self
    }

    /// Set the coarse (universal) part-of-speech tag.
    pub fn upos(mut self, upos: impl Into<String>) -> TokenBuilder {
        self.token.set_upos(Some(upos));
        self
    }

    /// Set the fine (language-specific) part-of-speech tag.
    pub fn xpos(mut self, xpos: impl Into<String>) -> TokenBuilder {
        self.token.set_xpos(Some(xpos));
        self
    }

    /// Set the morphological features of the token.
    pub fn features(mut self, features: Features) -> TokenBuilder {
        self.token.set_features(features);
        self
    }

    /// Set the raw enhanced-dependency column.
    pub fn deps(mut self, deps: impl Into<String>) -> TokenBuilder {
        self.token.set_deps(Some(deps));
        self
    }

    /// Set the raw miscellany column.
    pub fn misc(mut self, misc: impl Into<String>) -> TokenBuilder {
        self.token.set_misc(Some(misc));
        self
    }
}

impl From<Token> for TokenBuilder {
    fn from(token: Token) -> Self {
        TokenBuilder { token }
    }
}

impl From<TokenBuilder> for Token {
    fn from(builder: TokenBuilder) -> Self {
        builder.token
    }
}

/// One word or morpheme of a sentence.
///
/// The two reserved CoNLL-U columns (enhanced dependencies and
/// miscellany) are stored as raw strings: the augmentation operations
/// never interpret them, they are only kept so that read/write round
/// trips reproduce their input.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token {
    form: String,
    lemma: Option<String>,
    upos: Option<String>,
    xpos: Option<String>,
    features: Features,
    deps: Option<String>,
    misc: Option<String>,
}

impl Token {
    /// Create a new token where all the non-form fields are absent.
    pub fn new(form: impl Into<String>) -> Token {
        Token {
            form: form.into(),
            lemma: None,
            upos: None,
            xpos: None,
            features: Features::new(),
            deps: None,
            misc: None,
        }
    }

    /// Get the word form or punctuation symbol.
    pub fn form(&self) -> &str {
        self.form.as_ref()
    }

    /// Get the lemma or stem of the word form.
    pub fn lemma(&self) -> Option<&str> {
        self.lemma.as_deref()
    }

    /// Get the coarse (universal) part-of-speech tag.
    pub fn upos(&self) -> Option<&str> {
        self.upos.as_deref()
    }

    /// Get the fine (language-specific) part-of-speech tag.
    pub fn xpos(&self) -> Option<&str> {
        self.xpos.as_deref()
    }

    /// Get the morphological features of the token.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Get the morphological features mutably.
    pub fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    /// Get the raw enhanced-dependency column.
    pub fn deps(&self) -> Option<&str> {
        self.deps.as_deref()
    }

    /// Get the raw miscellany column.
    pub fn misc(&self) -> Option<&str> {
        self.misc.as_deref()
    }

    /// Set the word form or punctuation symbol.
    ///
    /// Returns the form that is replaced.
    pub fn set_form(&mut self, form: impl Into<String>) -> String {
        mem::replace(&mut self.form, form.into())
    }

    /// Set the lemma or stem of the word form.
    ///
    /// Returns the lemma that is replaced.
    pub fn set_lemma<S>(&mut self, lemma: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.lemma, lemma.map(Into::into))
    }

    /// Set the coarse (universal) part-of-speech tag.
    ///
    /// Returns the tag that is replaced.
    pub fn set_upos<S>(&mut self, upos: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.upos, upos.map(Into::into))
    }

    /// Set the fine (language-specific) part-of-speech tag.
    ///
    /// Returns the tag that is replaced.
    pub fn set_xpos<S>(&mut self, xpos: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.xpos, xpos.map(Into::into))
    }

    /// Set the morphological features of the token.
    ///
    /// Returns the features that are replaced.
    pub fn set_features(&mut self, features: Features) -> Features {
        mem::replace(&mut self.features, features)
    }

    /// Set the raw enhanced-dependency column.
    pub fn set_deps(&mut self, deps: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.deps, deps.map(Into::into))
    }

    /// Set the raw miscellany column.
    pub fn set_misc(&mut self, misc: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.misc, misc.map(Into::into))
    }
}

/// Error parsing a feature column.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("cannot parse feature field: {value:?}")]
pub struct ParseFeaturesError {
    pub value: String,
}

/// Morphological features of a token.
///
/// The features are an ordered key-value mapping, serialized in the
/// `key=value|key=value` column format.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Features {
    inner: BTreeMap<String, String>,
}

impl Features {
    /// Construct an empty set of features.
    pub fn new() -> Self {
        Features {
            inner: BTreeMap::new(),
        }
    }

    /// Unwrap the contained feature map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.inner
    }
}

impl Deref for Features {
    type Target = BTreeMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Features {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.inner.is_empty() {
            f.write_str(EMPTY_FIELD)
        } else {
            let features_str = self.inner.iter().map(|(k, v)| format!("{}={}", k, v)).join("|");
            f.write_str(&features_str)
        }
    }
}

impl From<BTreeMap<String, String>> for Features {
    fn from(feature_map: BTreeMap<String, String>) -> Self {
        Features { inner: feature_map }
    }
}

impl<S, T> FromIterator<(S, T)> for Features
where
    S: Into<String>,
    T: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
    {
        let features = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Features { inner: features }
    }
}

impl TryFrom<&str> for Features {
    type Error = ParseFeaturesError;

    fn try_from(feature_string: &str) -> Result<Self, Self::Error> {
        if feature_string == EMPTY_FIELD {
            return Ok(Features::new());
        }

        let mut features = BTreeMap::new();
        for fv in feature_string.split('|') {
            let idx = fv.find('=').ok_or_else(|| ParseFeaturesError {
                value: fv.to_owned(),
            })?;
            features.insert(fv[..idx].to_owned(), fv[idx + 1..].to_owned());
        }

        Ok(features.into())
    }
}

/// Get tokens of a tree.
pub trait Tokens {
    /// Get an iterator over the tokens in a tree.
    fn tokens(&self) -> TokenIter;

    /// Get the tokens in a tree mutably.
    fn tokens_mut(&mut self) -> TokenIterMut;
}

impl Tokens for DependencyTree {
    fn tokens(&self) -> TokenIter {
        TokenIter { inner: self.iter() }
    }

    fn tokens_mut(&mut self) -> TokenIterMut {
        TokenIterMut {
            inner: self.iter_mut(),
        }
    }
}

/// Token iterator.
pub struct TokenIter<'a> {
    inner: Iter<'a>,
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.inner.next() {
            if let Node::Token(token) = node {
                return Some(token);
            }
        }

        None
    }
}

/// Mutable token iterator.
pub struct TokenIterMut<'a> {
    inner: IterMut<'a>,
}

impl<'a> Iterator for TokenIterMut<'a> {
    type Item = &'a mut Token;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.inner.next() {
            if let Node::Token(token) = node {
                return Some(token);
            }
        }

        None
    }
}
