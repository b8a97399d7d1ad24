use async_trait::async_trait;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::services::{ClassificationResult, ClassifierService};
use lakehouse_ingest_domain::value_objects::Category;
use regex::RegexSet;
use std::sync::OnceLock;

/// `path_str` match is a strong signal (weight 2); a `filename`-only match
/// is moderate (weight 1). Keeps the German+English keyword set the
/// original rule engine used.
const PATTERNS: &[(Category, &[&str])] = &[
    (
        Category::Tax,
        &[
            "steuer", "finanzamt", "umsatzsteuer", "ust", r"\best\b", "gewerbesteuer", "buchung", "buchhaltung",
            "bilanz", "jahresabschluss", "datev", "elster", "steuerbescheid", "steuererklärung", "vorsteuer",
            r"\btax\b", "taxation", "revenue", "accounting", "bookkeeping", r"financial\s+statement",
            r"balance\s+sheet",
        ],
    ),
    (
        Category::Legal,
        &[
            "vertrag", "verträge", "vereinbarung", "agb", "rechnung", "mahnung", "anwalt", "recht", "klage",
            "gericht", "urteil", "beschluss", "satzung", "geschäftsordnung", "compliance", "datenschutz", "dsgvo",
            "contract", "agreement", "legal", "law", "invoice", "terms", "conditions", "lawsuit", "court",
            "judgment", "gdpr",
        ],
    ),
    (
        Category::Products,
        &[
            "produkt", "artikel", "etim", "eclass", "bmcat", "katalog", "stammdaten", "material", "warengruppe",
            "produktdaten", "artikelnummer", "ean", "gtin", "produktkatalog", "product", "item", "catalog",
            "catalogue", r"master\s+data", "sku", "parts", "inventory",
        ],
    ),
    (
        Category::Hr,
        &[
            "personal", "mitarbeiter", "employee", "bewerbung", "gehalt", "salary", "lohn", "arbeitsvertrag",
            "zeugnis", "kündigung", "urlaub", "vacation", "weiterbildung", "training", "qualifikation",
            "lebenslauf", "cv", "resume", r"\bhr\b", r"human\s+resources", "recruitment", "hiring", "payroll",
            "benefits", "onboarding",
        ],
    ),
    (
        Category::Correspondence,
        &[
            "korrespondenz", "email", "e-mail", "brief", "schreiben", "anfrage", "angebot", "bestellung",
            "lieferung", "versand", "letter", "correspondence", "inquiry", "quotation", "order", "delivery",
        ],
    ),
];

struct CompiledPatterns {
    category: Category,
    set: RegexSet,
}

fn compiled() -> &'static Vec<CompiledPatterns> {
    static CACHE: OnceLock<Vec<CompiledPatterns>> = OnceLock::new();
    CACHE.get_or_init(|| {
        PATTERNS
            .iter()
            .map(|(category, patterns)| CompiledPatterns {
                category: *category,
                set: RegexSet::new(patterns.iter().map(|p| format!("(?i){p}"))).expect("classifier patterns are valid regex"),
            })
            .collect()
    })
}

/// Rule-based classifier: scores each `Category` by regex hits against
/// the full path (weight 2) and filename alone (weight 1), then requires
/// both a minimum score and a clear margin over the runner-up before
/// committing - otherwise the document is left for the LLM tier.
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when no category clears the score/margin gate.
    pub fn classify_sync(&self, path: &str, filename: &str) -> Option<ClassificationResult> {
        let path_lower = path.to_lowercase();
        let filename_lower = filename.to_lowercase();

        let mut scores: Vec<(Category, u32)> = Category::ALL.iter().map(|c| (*c, 0)).collect();

        for entry in compiled() {
            let path_hits = entry.set.matches(&path_lower).iter().count() as u32;
            let filename_hits = entry.set.matches(&filename_lower).iter().count() as u32;
            let score = if path_hits > 0 {
                path_hits * 2
            } else {
                filename_hits
            };
            if let Some(slot) = scores.iter_mut().find(|(c, _)| *c == entry.category) {
                slot.1 += score;
            }
        }

        scores.sort_by(|a, b| b.1.cmp(&a.1));
        let (best_category, best_score) = scores[0];
        let second_best_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0);

        if best_score < 1 || best_score.saturating_sub(second_best_score) < 2 {
            return None;
        }

        Some(ClassificationResult {
            category: best_category,
            confidence: (best_score as f32 / 10.0).min(1.0),
        })
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClassifierService for RuleClassifier {
    async fn classify(&self, path: &str, filename: &str, _text_sample: &str) -> Result<ClassificationResult, IngestionError> {
        self.classify_sync(path, filename)
            .ok_or_else(|| IngestionError::classification("rule engine could not clear the confidence bar"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_path_match_wins_with_confidence_above_zero() {
        let classifier = RuleClassifier::new();
        let result = classifier
            .classify_sync("/data/steuer/finanzamt/bescheid_2024.pdf", "bescheid_2024.pdf")
            .unwrap();
        assert_eq!(result.category, Category::Tax);
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn ambiguous_filenames_return_none() {
        let classifier = RuleClassifier::new();
        assert!(classifier.classify_sync("/data/misc/file001.pdf", "file001.pdf").is_none());
    }

    #[test]
    fn close_scores_between_categories_are_left_uncertain() {
        let classifier = RuleClassifier::new();
        // "invoice" (legal) and "order" (correspondence) both hit filename-only.
        let result = classifier.classify_sync("/data/misc/invoice_order.pdf", "invoice_order.pdf");
        assert!(result.is_none());
    }
}
