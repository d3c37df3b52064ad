// OBO stanza reader
//
// Turns OBO text into terms, relation types and the edge declarations that the
// loader resolves once every term is known.

use crate::error::{LoadError, Result, SyntaxError};
use crate::models::{
    normalize_relation_name, Namespace, RelationType, Synonym, SynonymScope, Term, IS_A,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

// ============================================================================
// Parsed output
// ============================================================================

/// Header tags that precede the first stanza
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OboHeader {
    pub format_version: Option<String>,
    pub data_version: Option<String>,
    pub default_namespace: Option<Namespace>,
    pub ontology: Option<String>,
}

/// Edge declaration whose target has not been resolved yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    pub relation: String,
    pub target: String,
    /// Source line, for diagnostics
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTerm {
    pub term: Term,
    pub links: Vec<PendingLink>,
}

#[derive(Debug, Default)]
pub struct ParsedObo {
    pub header: OboHeader,
    pub terms: Vec<ParsedTerm>,
    pub typedefs: Vec<RelationType>,
}

// ============================================================================
// Stanza grouping
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum StanzaKind {
    Term,
    Typedef,
    Other(String),
}

#[derive(Debug)]
struct Entry {
    line: usize,
    key: String,
    value: String,
}

#[derive(Debug)]
struct Stanza {
    kind: StanzaKind,
    line: usize,
    entries: Vec<Entry>,
}

/// Physical lines joined across trailing backslashes, with their first line number
///
/// Only an odd run of trailing backslashes continues a line; `\\` is an
/// escaped backslash.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let raw = raw.trim_end();
        let (start, mut text) = match pending.take() {
            Some((start, mut text)) => {
                text.push_str(raw.trim_start());
                (start, text)
            },
            None => (line_no, raw.to_string()),
        };

        let trailing = raw.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            text.pop();
            pending = Some((start, text));
        } else {
            lines.push((start, text));
        }
    }

    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

pub struct OboParser;

impl OboParser {
    /// Parse OBO text
    ///
    /// Fails on the first malformed line. `cancel` is polled between stanzas.
    pub fn parse(content: &str, cancel: &CancellationToken) -> Result<ParsedObo> {
        let (header, stanzas) = Self::split_stanzas(content)?;

        info!(stanzas = stanzas.len(), "Starting OBO parsing");

        let mut parsed = ParsedObo {
            header,
            ..Default::default()
        };

        for stanza in stanzas {
            if cancel.is_cancelled() {
                info!("OBO parsing cancelled");
                return Err(LoadError::Cancelled);
            }

            match &stanza.kind {
                StanzaKind::Term => {
                    let term = Self::parse_term_stanza(&stanza, parsed.header.default_namespace)?;
                    parsed.terms.push(term);
                },
                StanzaKind::Typedef => parsed.typedefs.push(Self::parse_typedef_stanza(&stanza)?),
                StanzaKind::Other(tag) => {
                    debug!(tag = %tag, line = stanza.line, "Skipping unsupported stanza");
                },
            }
        }

        info!(
            terms = parsed.terms.len(),
            typedefs = parsed.typedefs.len(),
            "Parsed OBO stanzas"
        );

        Ok(parsed)
    }

    fn split_stanzas(content: &str) -> std::result::Result<(OboHeader, Vec<Stanza>), SyntaxError> {
        let mut header = OboHeader::default();
        let mut stanzas = Vec::new();
        let mut current: Option<Stanza> = None;
        let mut in_header = true;

        for (line_no, line) in logical_lines(content) {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                stanzas.extend(current.take());
                continue;
            }
            if trimmed.starts_with('!') {
                continue;
            }

            if let Some(tag) = trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                stanzas.extend(current.take());
                in_header = false;
                let kind = match tag.trim() {
                    "Term" => StanzaKind::Term,
                    "Typedef" => StanzaKind::Typedef,
                    other => StanzaKind::Other(other.to_string()),
                };
                current = Some(Stanza {
                    kind,
                    line: line_no,
                    entries: Vec::new(),
                });
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                if in_header || matches!(current, Some(Stanza { kind: StanzaKind::Other(_), .. })) {
                    continue;
                }
                return Err(SyntaxError::new(line_no, trimmed, "expected `key: value`"));
            };
            let (key, value) = (key.trim(), value.trim());

            if in_header {
                Self::parse_header_line(&mut header, line_no, key, value);
                continue;
            }

            match current.as_mut() {
                Some(stanza) => stanza.entries.push(Entry {
                    line: line_no,
                    key: key.to_string(),
                    value: value.to_string(),
                }),
                None => {
                    return Err(SyntaxError::new(
                        line_no,
                        trimmed,
                        "tag line outside of any stanza",
                    ));
                },
            }
        }

        stanzas.extend(current.take());
        Ok((header, stanzas))
    }

    fn parse_header_line(header: &mut OboHeader, line: usize, key: &str, value: &str) {
        match key {
            "format-version" => header.format_version = Some(value.to_string()),
            "data-version" => header.data_version = Some(value.to_string()),
            "ontology" => header.ontology = Some(value.to_string()),
            // GO releases declare `gene_ontology` here; terms then carry their own namespace
            "default-namespace" => match Namespace::parse(value) {
                Some(ns) => header.default_namespace = Some(ns),
                None => debug!(line, value, "Ignoring default-namespace outside the known namespaces"),
            },
            _ => {},
        }
    }

    /// Parse a single [Term] stanza
    fn parse_term_stanza(
        stanza: &Stanza,
        default_namespace: Option<Namespace>,
    ) -> std::result::Result<ParsedTerm, SyntaxError> {
        let mut id: Option<String> = None;
        let mut name: Option<String> = None;
        let mut namespace: Option<Namespace> = None;
        let mut definition: Option<String> = None;
        let mut comment: Option<String> = None;
        let mut is_obsolete = false;
        let mut alt_ids = Vec::new();
        let mut synonyms = Vec::new();
        let mut xrefs = Vec::new();
        let mut subsets = Vec::new();
        let mut links = Vec::new();

        for entry in &stanza.entries {
            let value = entry.value.as_str();
            match entry.key.as_str() {
                "id" => id = Some(value.to_string()),
                "name" => name = Some(value.to_string()),
                "namespace" => {
                    namespace = Some(Namespace::parse(value).ok_or_else(|| {
                        SyntaxError::new(entry.line, value, format!("unknown namespace `{value}`"))
                    })?);
                },
                "def" => definition = Some(quoted_or_raw(value)),
                "comment" => comment = Some(value.to_string()),
                "alt_id" => alt_ids.push(value.to_string()),
                "subset" => subsets.push(value.to_string()),
                "xref" => xrefs.push(value.to_string()),
                "is_obsolete" => is_obsolete = parse_bool(entry)?,
                "synonym" => synonyms.push(parse_synonym(entry, None)?),
                "exact_synonym" => synonyms.push(parse_synonym(entry, Some(SynonymScope::Exact))?),
                "narrow_synonym" => {
                    synonyms.push(parse_synonym(entry, Some(SynonymScope::Narrow))?)
                },
                "broad_synonym" => synonyms.push(parse_synonym(entry, Some(SynonymScope::Broad))?),
                "related_synonym" => {
                    synonyms.push(parse_synonym(entry, Some(SynonymScope::Related))?)
                },
                "is_a" => {
                    let target = leading_tokens(entry, 1)?.remove(0);
                    links.push(PendingLink {
                        relation: IS_A.to_string(),
                        target,
                        line: entry.line,
                    });
                },
                "relationship" => {
                    let mut tokens = leading_tokens(entry, 2)?;
                    let target = tokens.remove(1);
                    links.push(PendingLink {
                        relation: normalize_relation_name(&tokens[0]),
                        target,
                        line: entry.line,
                    });
                },
                _ => {}, // Ignore other fields
            }
        }

        let id = id.ok_or_else(|| SyntaxError::new(stanza.line, "[Term]", "stanza has no id"))?;
        let name = name.ok_or_else(|| {
            SyntaxError::new(stanza.line, format!("id: {id}"), "term has no name")
        })?;
        let namespace = namespace.or(default_namespace).ok_or_else(|| {
            SyntaxError::new(
                stanza.line,
                format!("id: {id}"),
                "term has no namespace and the header sets no default-namespace",
            )
        })?;

        let mut term = Term::new(id, name, namespace);
        term.definition = definition;
        term.comment = comment;
        term.is_obsolete = is_obsolete;
        term.alt_ids = alt_ids;
        term.synonyms = synonyms;
        term.xrefs = xrefs;
        term.subsets = subsets;

        Ok(ParsedTerm { term, links })
    }

    /// Parse a single [Typedef] stanza
    fn parse_typedef_stanza(stanza: &Stanza) -> std::result::Result<RelationType, SyntaxError> {
        let mut id: Option<String> = None;
        let mut rel = RelationType::new(String::new());

        for entry in &stanza.entries {
            let value = entry.value.as_str();
            match entry.key.as_str() {
                "id" => id = Some(normalize_relation_name(value)),
                "name" => rel.name = Some(value.to_string()),
                "namespace" => rel.namespace = Some(value.to_string()),
                "is_transitive" => rel.is_transitive = parse_bool(entry)?,
                "is_a" => {
                    let parent = leading_tokens(entry, 1)?.remove(0);
                    rel.parents.push(normalize_relation_name(&parent));
                },
                "xref" => rel.xrefs.push(value.to_string()),
                _ => {},
            }
        }

        rel.id = id.ok_or_else(|| SyntaxError::new(stanza.line, "[Typedef]", "stanza has no id"))?;
        Ok(rel)
    }
}

// ============================================================================
// Value helpers
// ============================================================================

fn parse_bool(entry: &Entry) -> std::result::Result<bool, SyntaxError> {
    match entry.value.as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(SyntaxError::new(
            entry.line,
            format!("{}: {}", entry.key, other),
            "expected `true` or `false`",
        )),
    }
}

/// First `n` tokens of an `is_a` / `relationship` value
///
/// Trailing `! comment` text and `{qualifier}` blocks carry no meaning and are
/// dropped before counting.
fn leading_tokens(entry: &Entry, n: usize) -> std::result::Result<Vec<String>, SyntaxError> {
    let tokens: Vec<String> = entry
        .value
        .split_whitespace()
        .take_while(|tok| !tok.starts_with('!') && !tok.starts_with('{'))
        .take(n)
        .map(str::to_string)
        .collect();

    if tokens.len() < n {
        return Err(SyntaxError::new(
            entry.line,
            format!("{}: {}", entry.key, entry.value),
            format!("expected {n} token(s) before any comment or qualifier"),
        ));
    }
    Ok(tokens)
}

/// Read a double-quoted string with backslash escapes
///
/// Returns the unescaped text and the remainder after the closing quote, or
/// `None` when the quote is never closed.
fn read_quoted(value: &str) -> Option<(String, &str)> {
    let body = value.strip_prefix('"')?;
    let mut text = String::new();
    let mut chars = body.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, escaped)) => text.push(escaped),
                None => return None,
            },
            '"' => return Some((text, &body[idx + 1..])),
            _ => text.push(c),
        }
    }
    None
}

/// Extract quoted text from a definition
/// Example: "\"biological_process\" [GO:curators]" -> "biological_process"
fn quoted_or_raw(value: &str) -> String {
    read_quoted(value)
        .map(|(text, _)| text)
        .unwrap_or_else(|| value.to_string())
}

/// Parse a synonym value
///
/// Modern form: `"text" SCOPE [TYPE] [xrefs]`. The legacy `*_synonym` keys carry
/// the scope in the key and the value is just `"text" [xrefs]`. A modern synonym
/// without a scope is RELATED.
fn parse_synonym(
    entry: &Entry,
    legacy_scope: Option<SynonymScope>,
) -> std::result::Result<Synonym, SyntaxError> {
    let value = entry.value.as_str();
    let fail = |reason: &str| SyntaxError::new(entry.line, format!("{}: {}", entry.key, value), reason);

    if !value.starts_with('"') {
        return Err(fail("synonym is missing its quoted text"));
    }
    let (text, rest) = read_quoted(value).ok_or_else(|| fail("unterminated quote in synonym"))?;

    let rest = rest.trim();
    let (words, xref_block) = match rest.find('[') {
        Some(idx) => (&rest[..idx], Some(&rest[idx..])),
        None => (rest, None),
    };
    let mut words = words.split_whitespace();

    let scope = match legacy_scope {
        Some(scope) => scope,
        None => match words.next() {
            Some(word) => SynonymScope::parse(word)
                .ok_or_else(|| fail(&format!("unknown synonym scope `{word}`")))?,
            None => SynonymScope::Related,
        },
    };
    let synonym_type = words.next().map(str::to_string);

    let xrefs = match xref_block {
        Some(block) => {
            let (inner, _) = block
                .strip_prefix('[')
                .and_then(|b| b.split_once(']'))
                .ok_or_else(|| fail("unterminated xref list"))?;
            inner
                .split(',')
                .map(str::trim)
                .filter(|x| !x.is_empty())
                .map(str::to_string)
                .collect()
        },
        None => Vec::new(),
    };

    Ok(Synonym {
        text,
        scope,
        synonym_type,
        xrefs,
    })
}

// ============================================================================
// Tests
// ============================================================================
