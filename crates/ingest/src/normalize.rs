//! Column translation and join-key normalization rules.

/// Source (French) → canonical header vocabulary for the accounts-payable
/// export. Applied once at ingestion; nothing downstream sees the source
/// names.
pub const AP_HEADER_TRANSLATION: &[(&str, &str)] = &[
    ("Code de fournisseur", "Supplier code"),
    ("Immeuble", "Building"),
    ("Nom du fournisseur", "Supplier name"),
    ("Compagnie", "Company"),
    ("Commentaire", "Comment"),
    ("Montant payé", "Paid amount"),
    ("No facture", "Invoice no"),
];

/// Cash-management header renames.
pub const CM_HEADER_TRANSLATION: &[(&str, &str)] = &[("Co. no.", "Company")];

/// Normalize a join-key value: trim, strip a trailing `.0` float artifact,
/// lowercase. Empty values become the `nan` sentinel so they compare equal
/// across tables the way the legacy pipeline's stringified NaNs did.
pub fn clean_key(raw: &str) -> String {
    let mut s = raw.trim().to_string();
    if let Some(stripped) = s.strip_suffix(".0") {
        s = stripped.to_string();
    }
    let s = s.to_lowercase();
    if s.is_empty() {
        "nan".to_string()
    } else {
        s
    }
}

/// Bank-account join key: digit strings are zero-filled to four digits;
/// anything else is the `nan` sentinel (never matches a real account).
pub fn clean_bank_key(raw: &str) -> String {
    let s = clean_key(raw);
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        format!("{s:0>4}")
    } else {
        "nan".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_cleaning() {
        assert_eq!(clean_key("  1010.0 "), "1010");
        assert_eq!(clean_key("Main St. WEST"), "main st. west");
        assert_eq!(clean_key(""), "nan");
        assert_eq!(clean_key("   "), "nan");
    }

    #[test]
    fn bank_keys_are_four_digits_or_nan() {
        assert_eq!(clean_bank_key("45"), "0045");
        assert_eq!(clean_bank_key("1234"), "1234");
        assert_eq!(clean_bank_key("12345"), "12345");
        assert_eq!(clean_bank_key("1234.0"), "1234");
        assert_eq!(clean_bank_key("12a4"), "nan");
        assert_eq!(clean_bank_key(""), "nan");
    }
}
