use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FinanceError, Result};

/// Canonical category keys understood by reports and budgets.
pub const CANONICAL_CATEGORIES: &[&str] = &[
    "food",
    "transport",
    "housing",
    "bills",
    "utilities",
    "entertainment",
    "health",
    "shopping",
    "education",
    "travel",
    "personal",
    "other",
    "salary",
    "freelance",
    "investments",
    "gifts",
    "other_income",
];

/// Display labels written by older releases, keyed by their lowercase form.
static LEGACY_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let entries: &[(&str, &str)] = &[
        // English
        ("food", "food"),
        ("food & dining", "food"),
        ("groceries", "food"),
        ("transportation", "transport"),
        ("bills & utilities", "bills"),
        ("healthcare", "health"),
        ("personal care", "personal"),
        ("investment", "investments"),
        ("gift", "gifts"),
        ("other income", "other_income"),
        // Spanish
        ("comida", "food"),
        ("alimentación", "food"),
        ("transporte", "transport"),
        ("vivienda", "housing"),
        ("facturas", "bills"),
        ("servicios", "utilities"),
        ("entretenimiento", "entertainment"),
        ("salud", "health"),
        ("compras", "shopping"),
        ("educación", "education"),
        ("viajes", "travel"),
        ("cuidado personal", "personal"),
        ("otros", "other"),
        ("salario", "salary"),
        ("sueldo", "salary"),
        ("trabajo independiente", "freelance"),
        ("inversiones", "investments"),
        ("regalos", "gifts"),
        ("otros ingresos", "other_income"),
        // Portuguese
        ("alimentação", "food"),
        ("moradia", "housing"),
        ("contas", "bills"),
        ("serviços", "utilities"),
        ("saúde", "health"),
        ("educação", "education"),
        ("viagens", "travel"),
        ("cuidados pessoais", "personal"),
        ("outros", "other"),
        ("salário", "salary"),
        ("investimentos", "investments"),
        ("presentes", "gifts"),
        ("outras receitas", "other_income"),
        // French
        ("alimentation", "food"),
        ("logement", "housing"),
        ("factures", "bills"),
        ("services publics", "utilities"),
        ("divertissement", "entertainment"),
        ("santé", "health"),
        ("achats", "shopping"),
        ("éducation", "education"),
        ("voyages", "travel"),
        ("soins personnels", "personal"),
        ("autres", "other"),
        ("salaire", "salary"),
        ("indépendant", "freelance"),
        ("investissements", "investments"),
        ("cadeaux", "gifts"),
        ("autres revenus", "other_income"),
    ];
    entries.iter().copied().collect()
});

pub fn is_canonical(key: &str) -> bool {
    CANONICAL_CATEGORIES.contains(&key)
}

/// Maps a stored category string to its canonical key.
///
/// Canonical keys pass through, known legacy labels in any supported language
/// resolve to their key, and anything else is returned unchanged.
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_canonical(trimmed) {
        return trimmed.to_string();
    }
    let lowered = trimmed.to_lowercase();
    if is_canonical(&lowered) {
        return lowered;
    }
    match LEGACY_LABELS.get(lowered.as_str()) {
        Some(key) => (*key).to_string(),
        None => raw.to_string(),
    }
}

pub fn same_category(a: &str, b: &str) -> bool {
    normalize_category(a) == normalize_category(b)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
}

/// A user-defined category shown alongside the canonical set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomCategory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CustomCategory {
    pub fn new(user_id: Uuid, name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            kind,
            icon: None,
            color: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::invalid("category name is required"));
        }
        Ok(())
    }
}
