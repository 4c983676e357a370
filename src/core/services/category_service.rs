use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::{
    category::is_canonical, ledger::take_where, CategoryKind, CustomCategory, Ledger,
    CANONICAL_CATEGORIES,
};

const INCOME_KEYS: &[&str] = &["salary", "freelance", "investments", "gifts", "other_income"];

pub struct CategoryService;

impl CategoryService {
    pub fn add(ledger: &mut Ledger, mut category: CustomCategory) -> Result<Uuid> {
        category.id = Uuid::new_v4();
        category.validate()?;
        Self::validate_name(ledger, category.user_id, None, &category.name)?;
        let id = category.id;
        ledger.custom_categories.push(category);
        Ok(id)
    }

    pub fn edit(ledger: &mut Ledger, id: Uuid, changes: CustomCategory) -> Result<()> {
        changes.validate()?;
        let owner = ledger
            .custom_categories
            .iter()
            .find(|category| category.id == id)
            .map(|category| category.user_id)
            .ok_or_else(|| FinanceError::not_found("category", id))?;
        Self::validate_name(ledger, owner, Some(id), &changes.name)?;
        if let Some(category) = ledger
            .custom_categories
            .iter_mut()
            .find(|category| category.id == id)
        {
            category.name = changes.name;
            category.kind = changes.kind;
            category.icon = changes.icon;
            category.color = changes.color;
        }
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<CustomCategory> {
        let removed = take_where(&mut ledger.custom_categories, |category| category.id == id)
            .ok_or_else(|| FinanceError::not_found("category", id))?;
        Ok(removed)
    }

    pub fn list(ledger: &Ledger, user_id: Uuid) -> Vec<&CustomCategory> {
        ledger
            .custom_categories
            .iter()
            .filter(|category| category.user_id == user_id)
            .collect()
    }

    /// Canonical keys of the requested kind followed by the user's own categories.
    pub fn available(ledger: &Ledger, user_id: Uuid, kind: CategoryKind) -> Vec<String> {
        let mut names: Vec<String> = CANONICAL_CATEGORIES
            .iter()
            .filter(|key| (kind == CategoryKind::Income) == INCOME_KEYS.contains(key))
            .map(|key| key.to_string())
            .collect();
        names.extend(
            Self::list(ledger, user_id)
                .into_iter()
                .filter(|category| category.kind == kind)
                .map(|category| category.name.clone()),
        );
        names
    }

    fn validate_name(
        ledger: &Ledger,
        user_id: Uuid,
        exclude: Option<Uuid>,
        candidate: &str,
    ) -> Result<()> {
        let normalized = candidate.trim().to_lowercase();
        if is_canonical(&normalized) {
            return Err(FinanceError::invalid(format!(
                "category `{}` is a built-in category",
                candidate.trim()
            )));
        }
        let duplicate = ledger.custom_categories.iter().any(|category| {
            category.user_id == user_id
                && category.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| category.id != id)
        });
        if duplicate {
            Err(FinanceError::invalid(format!(
                "category `{}` already exists",
                candidate.trim()
            )))
        } else {
            Ok(())
        }
    }
}
