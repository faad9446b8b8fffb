/// Price cell value meaning "ask the staff"; carries no price.
pub const UNPRICED_SENTINEL: &str = "CJ";

/// Accent and typo fixes applied to meal names and meal types.
/// Keys never overlap each other, so application order does not matter.
pub const DEFAULT_REPLACEMENTS: &[(&str, &str)] = &[
    (" a la ", " à la "),
    (" au gratin", " gratiné"),
    ("Puree", "Purée"),
    ("puree", "purée"),
    ("Pates", "Pâtes"),
    ("pates", "pâtes"),
    ("Legumes", "Légumes"),
    ("legumes", "légumes"),
    ("Creme", "Crème"),
    ("creme", "crème"),
    ("Epinards", "Épinards"),
    ("Roti ", "Rôti "),
    ("roti ", "rôti "),
    ("Saute ", "Sauté "),
    ("saute ", "sauté "),
    ("Cordon bleu", "Cordon-bleu"),
    ("Poelee", "Poêlée"),
    ("poelee", "poêlée"),
];

/// Price parsing and grammar smoothing for sheet cells.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    replacements: Vec<(String, String)>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_REPLACEMENTS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string())),
        )
    }
}

impl TextNormalizer {
    pub fn new(replacements: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            replacements: replacements
                .into_iter()
                .filter(|(from, _)| !from.is_empty())
                .collect(),
        }
    }

    /// Built-in dictionary with `extra` entries added; an extra entry with the
    /// same key as a built-in one replaces it.
    pub fn with_extra(extra: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut normalizer = Self::default();
        for (from, to) in extra {
            if from.is_empty() {
                continue;
            }
            match normalizer.replacements.iter_mut().find(|(f, _)| *f == from) {
                Some(entry) => entry.1 = to,
                None => normalizer.replacements.push((from, to)),
            }
        }
        normalizer
    }

    pub fn replacements(&self) -> &[(String, String)] {
        &self.replacements
    }

    /// Parses a price cell into cents. Dots and commas are digit grouping only:
    /// the sheet already stores minor units, so `"12,50"` is 1250.
    pub fn parse_price(&self, cell: &str) -> Option<u32> {
        let cell = cell.trim();
        if cell.is_empty() || cell == UNPRICED_SENTINEL {
            return None;
        }

        let digits: String = cell.chars().filter(|c| *c != '.' && *c != ',').collect();
        digits.parse().ok()
    }

    pub fn smooth_grammar(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (from, to) in &self.replacements {
            if result.contains(from.as_str()) {
                result = result.replace(from.as_str(), to);
            }
        }
        result
    }
}
