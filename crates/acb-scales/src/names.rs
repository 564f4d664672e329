//! Rewriting of brand and alternative drug names to generic names.
//!
//! A brand name matches a scale entry only where it stands alone: preceded
//! by the start of the name, whitespace or one of `+ _ " & ~ < /`, and
//! followed by the end of the name, whitespace or one of the same
//! characters. In a matching entry every occurrence of the brand is
//! replaced. Rules apply one after another, so a later rule sees the output
//! of earlier ones.

use std::path::Path;

use acb_ingest::{CsvOptions, read_csv_table};
use regex::Regex;
use tracing::debug;

use crate::error::{Result, ScalesError};
use crate::scale::{Scale, normalize_drug_name};

const DELIMITERS: &str = r#"[+_"&~</]"#;

#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    brand: String,
    generic: String,
}

#[derive(Debug, Clone, Default)]
pub struct NameRewriter {
    rules: Vec<Rule>,
}

impl NameRewriter {
    /// Build from `(brand, generic)` pairs applied in the given order.
    /// Both sides are lower-cased and trimmed; empty brands are skipped.
    pub fn new<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for (brand, generic) in pairs {
            let brand = normalize_drug_name(brand.as_ref());
            if brand.is_empty() {
                continue;
            }
            let pattern = format!(
                r"({DELIMITERS}|^|\s)({})({DELIMITERS}|\s|$)",
                regex::escape(&brand)
            );
            let pattern = Regex::new(&pattern).map_err(|source| ScalesError::Pattern {
                name: brand.clone(),
                source,
            })?;
            rules.push(Rule {
                pattern,
                brand,
                generic: normalize_drug_name(generic.as_ref()),
            });
        }
        Ok(Self { rules })
    }

    /// Load the `brand`/`generic` table, Windows-1252 encoded. When a
    /// `combination` column is present the rules are ordered by it.
    pub fn load(path: &Path) -> Result<Self> {
        let table = read_csv_table(path, &CsvOptions::legacy())?;
        let brand_idx = table.require_column("brand")?;
        let generic_idx = table.require_column("generic")?;
        let order_idx = table.column_index("combination");

        let mut pairs: Vec<(String, String, String)> = table
            .rows
            .iter()
            .filter_map(|row| {
                let brand = table.value(row, brand_idx)?;
                let generic = table.value(row, generic_idx).unwrap_or_default();
                let order = order_idx
                    .and_then(|idx| table.value(row, idx))
                    .map(normalize_drug_name)
                    .unwrap_or_default();
                Some((order, brand.to_string(), generic.to_string()))
            })
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let rewriter = Self::new(pairs.into_iter().map(|(_, brand, generic)| (brand, generic)))?;
        debug!(path = %path.display(), rules = rewriter.len(), "drug name rules loaded");
        Ok(rewriter)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule to one drug name.
    pub fn rewrite(&self, name: &str) -> String {
        self.rules.iter().fold(name.to_string(), |current, rule| {
            if rule.pattern.is_match(&current) {
                current.replace(&rule.brand, &rule.generic)
            } else {
                current
            }
        })
    }

    /// Rewrite every entry of `scale`; returns the number of changed names.
    pub fn apply(&self, scale: &mut Scale) -> usize {
        let mut changed = 0;
        for (drug, _) in &mut scale.entries {
            let rewritten = self.rewrite(drug);
            if rewritten != *drug {
                *drug = rewritten;
                changed += 1;
            }
        }
        changed
    }
}
