// GO annotation files (GAF 1.0 and 2.x)

use crate::error::AnnotationError;
use crate::models::{normalize_go_id, Namespace};
use crate::snapshot::Snapshot;
use crate::store::Lookup;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Columns in a GAF 1.0 row
pub const GAF1_COLUMNS: usize = 15;

/// Columns in a GAF 2.x row
pub const GAF2_COLUMNS: usize = 17;

// ============================================================================
// Evidence codes
// ============================================================================

/// Evidence supporting an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvidenceCode {
    // Experimental
    Exp,
    Ida,
    Ipi,
    Imp,
    Igi,
    Iep,
    // Computational analysis
    Iss,
    Iso,
    Isa,
    Ism,
    Igc,
    Iba,
    Ibd,
    Ikr,
    Ird,
    Rca,
    // Author statement
    Tas,
    Nas,
    // Curator statement
    Ic,
    Nd,
    // Electronic
    Iea,
    Nr,
}

impl EvidenceCode {
    pub const ALL: [EvidenceCode; 22] = [
        EvidenceCode::Exp,
        EvidenceCode::Ida,
        EvidenceCode::Ipi,
        EvidenceCode::Imp,
        EvidenceCode::Igi,
        EvidenceCode::Iep,
        EvidenceCode::Iss,
        EvidenceCode::Iso,
        EvidenceCode::Isa,
        EvidenceCode::Ism,
        EvidenceCode::Igc,
        EvidenceCode::Iba,
        EvidenceCode::Ibd,
        EvidenceCode::Ikr,
        EvidenceCode::Ird,
        EvidenceCode::Rca,
        EvidenceCode::Tas,
        EvidenceCode::Nas,
        EvidenceCode::Ic,
        EvidenceCode::Nd,
        EvidenceCode::Iea,
        EvidenceCode::Nr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceCode::Exp => "EXP",
            EvidenceCode::Ida => "IDA",
            EvidenceCode::Ipi => "IPI",
            EvidenceCode::Imp => "IMP",
            EvidenceCode::Igi => "IGI",
            EvidenceCode::Iep => "IEP",
            EvidenceCode::Iss => "ISS",
            EvidenceCode::Iso => "ISO",
            EvidenceCode::Isa => "ISA",
            EvidenceCode::Ism => "ISM",
            EvidenceCode::Igc => "IGC",
            EvidenceCode::Iba => "IBA",
            EvidenceCode::Ibd => "IBD",
            EvidenceCode::Ikr => "IKR",
            EvidenceCode::Ird => "IRD",
            EvidenceCode::Rca => "RCA",
            EvidenceCode::Tas => "TAS",
            EvidenceCode::Nas => "NAS",
            EvidenceCode::Ic => "IC",
            EvidenceCode::Nd => "ND",
            EvidenceCode::Iea => "IEA",
            EvidenceCode::Nr => "NR",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EvidenceCode::Exp => "Inferred from experiment",
            EvidenceCode::Ida => "Inferred from direct assay",
            EvidenceCode::Ipi => "Inferred from physical interaction",
            EvidenceCode::Imp => "Inferred from mutant phenotype",
            EvidenceCode::Igi => "Inferred from genetic interaction",
            EvidenceCode::Iep => "Inferred from expression pattern",
            EvidenceCode::Iss => "Inferred from sequence or structural similarity",
            EvidenceCode::Iso => "Inferred from sequence orthology",
            EvidenceCode::Isa => "Inferred from sequence alignment",
            EvidenceCode::Ism => "Inferred from sequence model",
            EvidenceCode::Igc => "Inferred from genomic context",
            EvidenceCode::Iba => "Inferred from biological aspect of ancestor",
            EvidenceCode::Ibd => "Inferred from biological aspect of descendant",
            EvidenceCode::Ikr => "Inferred from key residues",
            EvidenceCode::Ird => "Inferred from rapid divergence",
            EvidenceCode::Rca => "Inferred from reviewed computational analysis",
            EvidenceCode::Tas => "Traceable author statement",
            EvidenceCode::Nas => "Non-traceable author statement",
            EvidenceCode::Ic => "Inferred by curator",
            EvidenceCode::Nd => "No biological data available",
            EvidenceCode::Iea => "Inferred from electronic annotation",
            EvidenceCode::Nr => "Not recorded",
        }
    }

    pub fn is_experimental(&self) -> bool {
        matches!(
            self,
            EvidenceCode::Exp
                | EvidenceCode::Ida
                | EvidenceCode::Ipi
                | EvidenceCode::Imp
                | EvidenceCode::Igi
                | EvidenceCode::Iep
        )
    }

    pub fn is_computational(&self) -> bool {
        matches!(
            self,
            EvidenceCode::Iss
                | EvidenceCode::Iso
                | EvidenceCode::Isa
                | EvidenceCode::Ism
                | EvidenceCode::Igc
                | EvidenceCode::Iba
                | EvidenceCode::Ibd
                | EvidenceCode::Ikr
                | EvidenceCode::Ird
                | EvidenceCode::Rca
        )
    }

    pub fn is_electronic(&self) -> bool {
        matches!(self, EvidenceCode::Iea)
    }
}

impl std::str::FromStr for EvidenceCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        if code.is_empty() {
            return Ok(EvidenceCode::Nd);
        }
        EvidenceCode::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
            .ok_or_else(|| format!("Unknown evidence code: {}", s))
    }
}

impl std::fmt::Display for EvidenceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Annotation
// ============================================================================

/// One row of a GAF file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Source database (e.g., "UniProtKB")
    pub db: String,
    pub db_object_id: String,
    pub db_object_symbol: String,
    /// e.g., "NOT", "contributes_to"
    pub qualifiers: Vec<String>,
    pub go_id: String,
    pub db_references: Vec<String>,
    pub evidence_code: EvidenceCode,
    pub with_from: Vec<String>,
    pub aspect: Namespace,
    pub db_object_name: Option<String>,
    pub db_object_synonyms: Vec<String>,
    pub db_object_type: Option<String>,
    /// e.g., "taxon:9606"; a second entry names the interacting organism
    pub taxons: Vec<String>,
    pub date: Option<NaiveDate>,
    pub assigned_by: Option<String>,
    /// GAF 2.x only
    pub annotation_extensions: Vec<String>,
    /// GAF 2.x only
    pub gene_product_form_id: Option<String>,
}

impl Annotation {
    pub fn is_negated(&self) -> bool {
        self.qualifiers.iter().any(|q| q.eq_ignore_ascii_case("NOT"))
    }
}

/// Parsed contents of a GAF file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GafFile {
    /// `!key: value` header lines; repeated keys keep every value
    pub headers: BTreeMap<String, Vec<String>>,
    pub annotations: Vec<Annotation>,
}

impl GafFile {
    /// Value of the `gaf-version` header
    pub fn version(&self) -> Option<&str> {
        self.headers
            .get("gaf-version")
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Annotated GO ids that the snapshot does not define, sorted
    pub fn unknown_terms(&self, snapshot: &Snapshot) -> Vec<String> {
        let store = snapshot.store();
        self.distinct_go_ids()
            .into_iter()
            .filter(|id| store.resolve(id, Lookup::IncludeObsolete).is_err())
            .map(str::to_string)
            .collect()
    }

    /// Annotated GO ids that resolve only to obsolete terms, sorted
    pub fn obsolete_terms(&self, snapshot: &Snapshot) -> Vec<String> {
        let store = snapshot.store();
        self.distinct_go_ids()
            .into_iter()
            .filter(|id| {
                store
                    .resolve(id, Lookup::IncludeObsolete)
                    .is_ok_and(|term| term.is_obsolete)
            })
            .map(str::to_string)
            .collect()
    }

    /// Annotation count per evidence code
    pub fn evidence_counts(&self) -> BTreeMap<EvidenceCode, usize> {
        let mut counts = BTreeMap::new();
        for annotation in &self.annotations {
            *counts.entry(annotation.evidence_code).or_insert(0) += 1;
        }
        counts
    }

    fn distinct_go_ids(&self) -> BTreeSet<&str> {
        self.annotations.iter().map(|a| a.go_id.as_str()).collect()
    }
}

// ============================================================================
// GAF Parser
// ============================================================================

pub struct GafParser;

impl GafParser {
    /// Parse GAF text
    ///
    /// GAF format: tab-delimited, 15 (GAF 1.0) or 17 (GAF 2.x) columns
    /// Column 1: DB
    /// Column 2: DB Object ID
    /// Column 3: DB Object Symbol
    /// Column 4: Qualifier
    /// Column 5: GO ID
    /// Column 6: DB:Reference
    /// Column 7: Evidence Code
    /// Column 8: With (or) From
    /// Column 9: Aspect (P/F/C)
    /// Column 10: DB Object Name
    /// Column 11: DB Object Synonym
    /// Column 12: DB Object Type
    /// Column 13: Taxon
    /// Column 14: Date
    /// Column 15: Assigned By
    /// Column 16: Annotation Extension
    /// Column 17: Gene Product Form ID
    pub fn parse(content: &str) -> Result<GafFile, AnnotationError> {
        let mut gaf = GafFile::default();
        let mut in_header = true;

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim_end_matches(['\r', '\n']);

            if line.trim().is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('!') {
                if in_header {
                    if let Some((key, value)) = comment.split_once(':') {
                        gaf.headers
                            .entry(key.trim().to_string())
                            .or_default()
                            .push(value.trim().to_string());
                    }
                }
                continue;
            }

            in_header = false;
            gaf.annotations.push(Self::parse_gaf_line(line, line_no)?);
        }

        info!(
            version = gaf.version().unwrap_or("unknown"),
            annotations = gaf.annotations.len(),
            "Parsed GAF file"
        );

        Ok(gaf)
    }

    /// Read and parse a GAF file
    pub async fn parse_path(path: impl AsRef<Path>) -> Result<GafFile, AnnotationError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading GAF file");
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse a single GAF line
    fn parse_gaf_line(line: &str, line_no: usize) -> Result<Annotation, AnnotationError> {
        let columns: Vec<&str> = line.split('\t').map(str::trim).collect();

        if columns.len() < GAF1_COLUMNS || columns.len() > GAF2_COLUMNS {
            return Err(AnnotationError::malformed(
                line_no,
                format!(
                    "expected {GAF1_COLUMNS} to {GAF2_COLUMNS} columns, got {}",
                    columns.len()
                ),
            ));
        }

        let required = |idx: usize, name: &str| -> Result<String, AnnotationError> {
            match columns[idx] {
                "" => Err(AnnotationError::malformed(line_no, format!("missing {name}"))),
                value => Ok(value.to_string()),
            }
        };
        let column = |idx: usize| columns.get(idx).copied().unwrap_or("");

        let go_id = normalize_go_id(&required(4, "GO ID")?)
            .map_err(|e| AnnotationError::malformed(line_no, e))?;
        let evidence_code = column(6)
            .parse::<EvidenceCode>()
            .map_err(|e| AnnotationError::malformed(line_no, e))?;
        let aspect = Namespace::from_aspect(&required(8, "aspect")?).ok_or_else(|| {
            AnnotationError::malformed(line_no, format!("invalid aspect `{}`", column(8)))
        })?;
        let date = Self::parse_date(column(13))
            .map_err(|e| AnnotationError::malformed(line_no, e))?;

        Ok(Annotation {
            db: required(0, "DB")?,
            db_object_id: required(1, "DB object ID")?,
            db_object_symbol: column(2).to_string(),
            qualifiers: split_multi(column(3)),
            go_id,
            db_references: split_multi(column(5)),
            evidence_code,
            with_from: split_multi(column(7)),
            aspect,
            db_object_name: optional(column(9)),
            db_object_synonyms: split_multi(column(10)),
            db_object_type: optional(column(11)),
            taxons: split_multi(column(12)),
            date,
            assigned_by: optional(column(14)),
            annotation_extensions: split_multi(column(15)),
            gene_product_form_id: optional(column(16)),
        })
    }

    /// Parse date from "YYYYMMDD" format; empty means unknown
    fn parse_date(date_str: &str) -> Result<Option<NaiveDate>, String> {
        if date_str.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(date_str, "%Y%m%d")
            .map(Some)
            .map_err(|_| format!("invalid date `{date_str}`, expected YYYYMMDD"))
    }
}

/// Split a `|`-separated column, dropping empty parts
fn split_multi(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
