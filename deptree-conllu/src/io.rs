//! CoNLL-U format readers and writers.

use std::convert::TryFrom;
use std::io;

use deptree::graph::{DepTriple, DependencyTree, Node};
use deptree::token::{Features, Token, EMPTY_FIELD};

use crate::error::{IOError, ParseError};

/// A trait for objects that can read CoNLL-U trees.
pub trait ReadTree {
    /// Read a `DependencyTree` from this object.
    ///
    /// Returns `Ok(None)` when the reader is exhausted.
    fn read_tree(&mut self) -> Result<Option<DependencyTree>, IOError>;

    /// Get an iterator over the trees in this reader.
    fn trees(self) -> Trees<Self>
    where
        Self: Sized,
    {
        Trees { reader: self }
    }
}

/// A reader for CoNLL-U trees.
///
/// Sentence blocks are separated by blank lines; comment lines starting
/// with `#` are skipped.
pub struct Reader<R> {
    read: R,
}

impl<R: io::BufRead> Reader<R> {
    /// Construct a new reader from an object that implements the
    /// `io::BufRead` trait.
    pub fn new(read: R) -> Reader<R> {
        Reader { read }
    }
}

impl<R: io::BufRead> IntoIterator for Reader<R> {
    type Item = Result<DependencyTree, IOError>;
    type IntoIter = Trees<Reader<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees()
    }
}

impl<R: io::BufRead> ReadTree for Reader<R> {
    fn read_tree(&mut self) -> Result<Option<DependencyTree>, IOError> {
        let mut line = String::new();
        let mut tree = DependencyTree::new();
        let mut edges = Vec::new();

        loop {
            line.clear();

            // End of reader.
            if self.read.read_line(&mut line)? == 0 {
                if tree.len() == 1 {
                    return Ok(None);
                }

                add_edges(&mut tree, edges)?;

                return Ok(Some(tree));
            }

            // The blank line is a sentence separator. We want to be robust
            // in the case a CoNLL file is malformed and has two newlines as
            // a separator.
            if line.trim().is_empty() {
                if tree.len() == 1 {
                    continue;
                }

                add_edges(&mut tree, edges)?;

                return Ok(Some(tree));
            }

            if line.starts_with('#') {
                continue;
            }

            let mut iter = line.trim().split_terminator('\t');

            parse_identifier_field(iter.next())?;

            let mut token = Token::new(parse_form_field(iter.next())?);
            token.set_lemma(parse_string_field(iter.next()));
            token.set_upos(parse_string_field(iter.next()));
            token.set_xpos(parse_string_field(iter.next()));
            token.set_features(
                parse_string_field(iter.next())
                    .map(|s| Features::try_from(s.as_str()))
                    .transpose()
                    .map_err(ParseError::from)?
                    .unwrap_or_else(Features::new),
            );

            // Head relation.
            if let Some(head) = parse_numeric_field(iter.next())? {
                let head_rel = parse_string_field(iter.next());
                edges.push(DepTriple::new(head, head_rel, tree.len()));
            } else {
                // A head relation without a head address is not recoverable.
                if parse_string_field(iter.next()).is_some() {
                    return Err(ParseError::RelationWithoutHead {
                        token: line.trim().to_owned(),
                    }
                    .into());
                }
            }

            token.set_deps(parse_string_field(iter.next()));
            token.set_misc(parse_string_field(iter.next()));

            tree.push(token);
        }
    }
}

fn add_edges(tree: &mut DependencyTree, edges: Vec<DepTriple<String>>) -> Result<(), ParseError> {
    for edge in edges {
        tree.dep_graph_mut().add_deprel(edge)?;
    }

    Ok(())
}

/// An iterator over the trees in a `Reader`.
pub struct Trees<R>
where
    R: ReadTree,
{
    reader: R,
}

impl<R> Iterator for Trees<R>
where
    R: ReadTree,
{
    type Item = Result<DependencyTree, IOError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_tree() {
            Ok(None) => None,
            Ok(Some(tree)) => Some(Ok(tree)),
            Err(e) => Some(Err(e)),
        }
    }
}

fn parse_form_field(field: Option<&str>) -> Result<String, ParseError> {
    field.map(str::to_owned).ok_or(ParseError::MissingFormField)
}

fn parse_string_field(field: Option<&str>) -> Option<String> {
    field.and_then(|s| {
        if s == EMPTY_FIELD {
            None
        } else {
            Some(s.to_string())
        }
    })
}

fn parse_identifier_field(field: Option<&str>) -> Result<Option<usize>, ParseError> {
    match field {
        None => Err(ParseError::ParseIdentifierField {
            value: "a token identifier should be present".to_owned(),
        }),
        Some(s) => {
            if s == EMPTY_FIELD {
                return Err(ParseError::ParseIdentifierField {
                    value: s.to_owned(),
                });
            }

            Ok(Some(s.parse::<usize>().map_err(|_| {
                ParseError::ParseIntField {
                    value: s.to_owned(),
                }
            })?))
        }
    }
}

fn parse_numeric_field(field: Option<&str>) -> Result<Option<usize>, ParseError> {
    match field {
        None => Ok(None),
        Some(s) => {
            if s == EMPTY_FIELD {
                Ok(None)
            } else {
                Ok(Some(s.parse::<usize>().map_err(|_| {
                    ParseError::ParseIntField {
                        value: s.to_owned(),
                    }
                })?))
            }
        }
    }
}

/// A trait for objects that can write CoNLL-U trees.
pub trait WriteTree {
    /// Write a tree into this object.
    fn write_tree(&mut self, tree: &DependencyTree) -> Result<(), IOError>;
}

/// A writer for CoNLL-U trees.
///
/// Trees are written as 10-column token lines, one block per sentence,
/// with a blank line between consecutive sentences.
pub struct Writer<W> {
    write: W,
    first: bool,
}

impl<W: io::Write> Writer<W> {
    /// Construct a new writer from an object that implements the
    /// `io::Write` trait.
    pub fn new(write: W) -> Writer<W> {
        Writer { write, first: true }
    }

    /// Borrow the embedded writer.
    ///
    /// Getting the underlying writer is often useful when the writer
    /// writes to a memory object.
    pub fn get_ref(&self) -> &W {
        &self.write
    }
}

impl<W: io::Write> WriteTree for Writer<W> {
    fn write_tree(&mut self, tree: &DependencyTree) -> Result<(), IOError> {
        if self.first {
            self.first = false;
        } else {
            writeln!(self.write)?;
        }

        for address in 1..tree.len() {
            let token = match tree[address] {
                Node::Token(ref token) => token,
                Node::Anchor => unreachable!(),
            };

            let triple = tree.dep_graph().head(address);
            let head = triple
                .as_ref()
                .map(|t| t.head().to_string())
                .unwrap_or_else(|| EMPTY_FIELD.to_string());
            let head_rel = triple
                .as_ref()
                .and_then(|t| t.relation())
                .unwrap_or(EMPTY_FIELD);

            writeln!(
                self.write,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                address,
                token.form(),
                token.lemma().unwrap_or(EMPTY_FIELD),
                token.upos().unwrap_or(EMPTY_FIELD),
                token.xpos().unwrap_or(EMPTY_FIELD),
                token.features(),
                head,
                head_rel,
                token.deps().unwrap_or(EMPTY_FIELD),
                token.misc().unwrap_or(EMPTY_FIELD),
            )?;
        }

        Ok(())
    }
}
