//! Movement-type registry.
//!
//! Maps the options of the type select to [`MovementType`]. Option values are
//! matched against the canonical tokens first; options with non-canonical
//! values fall back to keyword matching on their label, after stripping
//! diacritics and lower-casing.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::types::{MovementType, TypeOption};

const LABEL_KEYWORDS: &[(&str, MovementType)] = &[
    ("entrada", MovementType::Intake),
    ("ingreso", MovementType::Intake),
    ("salida", MovementType::Withdrawal),
    ("egreso", MovementType::Withdrawal),
    ("ajuste", MovementType::Adjustment),
    ("transfer", MovementType::Transfer),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    value: String,
    kind: Option<MovementType>,
}

/// Resolution table built from the options of the type control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    entries: Vec<Entry>,
}

impl TypeRegistry {
    pub fn from_options(options: &[TypeOption]) -> Self {
        let entries = options
            .iter()
            .filter(|opt| !opt.value.trim().is_empty())
            .map(|opt| Entry {
                value: opt.value.clone(),
                kind: classify_option(opt),
            })
            .collect();
        Self { entries }
    }

    /// Registry for the stock form's own choices.
    pub fn canonical() -> Self {
        let options: Vec<TypeOption> = MovementType::ALL
            .iter()
            .map(|kind| TypeOption::new(kind.as_token(), kind.as_token()))
            .collect();
        Self::from_options(&options)
    }

    /// Resolve a raw control value. Values that are not options of the
    /// control are matched against the canonical tokens.
    pub fn resolve(&self, raw: &str) -> Option<MovementType> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match self.entries.iter().find(|e| e.value.eq_ignore_ascii_case(raw)) {
            Some(entry) => entry.kind,
            None => MovementType::from_token(raw),
        }
    }

    /// First option value that resolves to `kind`.
    pub fn value_for(&self, kind: MovementType) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.kind == Some(kind))
            .map(|e| e.value.as_str())
    }

    /// Value written into an empty control: the intake option, or the
    /// canonical intake token when no option resolves to intake.
    pub fn default_value(&self) -> String {
        self.value_for(MovementType::Intake)
            .unwrap_or(MovementType::Intake.as_token())
            .to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn classify_option(option: &TypeOption) -> Option<MovementType> {
    if let Some(kind) = MovementType::from_token(&option.value) {
        return Some(kind);
    }
    let label = fold_label(&option.label);
    LABEL_KEYWORDS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, kind)| *kind)
}

/// Lower-case and strip diacritics ("Tránsferencia" -> "transferencia").
pub fn fold_label(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(pairs: &[(&str, &str)]) -> Vec<TypeOption> {
        pairs.iter().map(|(v, l)| TypeOption::new(*v, *l)).collect()
    }

    #[test]
    fn canonical_values_resolve_case_insensitively() {
        let reg = TypeRegistry::from_options(&opts(&[
            ("ingreso", "Ingreso"),
            ("EGRESO", "Egreso"),
            ("Ajuste", "Ajuste"),
            ("TRANSFERENCIA", "Transferencia"),
        ]));
        assert_eq!(reg.resolve("ingreso"), Some(MovementType::Intake));
        assert_eq!(reg.resolve("EGRESO"), Some(MovementType::Withdrawal));
        assert_eq!(reg.resolve("Ajuste"), Some(MovementType::Adjustment));
        assert_eq!(reg.resolve("TRANSFERENCIA"), Some(MovementType::Transfer));
    }

    #[test]
    fn option_values_match_regardless_of_case() {
        let reg = TypeRegistry::from_options(&opts(&[("in", "Entrada"), ("out", "Salida")]));
        assert_eq!(reg.resolve("IN"), Some(MovementType::Intake));
        assert_eq!(reg.resolve("Out"), Some(MovementType::Withdrawal));
        assert_eq!(reg.resolve(" in "), Some(MovementType::Intake));
    }

    #[test]
    fn labels_resolve_opaque_values() {
        let reg = TypeRegistry::from_options(&opts(&[
            ("1", "Entrada de mercadería"),
            ("2", "Salida a taller"),
            ("3", "Ajuste de inventario"),
            ("4", "Transferencia entre depósitos"),
        ]));
        assert_eq!(reg.resolve("1"), Some(MovementType::Intake));
        assert_eq!(reg.resolve("2"), Some(MovementType::Withdrawal));
        assert_eq!(reg.resolve("3"), Some(MovementType::Adjustment));
        assert_eq!(reg.resolve("4"), Some(MovementType::Transfer));
        assert_eq!(reg.value_for(MovementType::Transfer), Some("4"));
    }

    #[test]
    fn label_matching_ignores_diacritics_and_case() {
        let reg = TypeRegistry::from_options(&opts(&[
            ("a", "EGRESÓ"),
            ("b", "Tránsfer"),
            ("c", "INGRESO por compra"),
        ]));
        assert_eq!(reg.resolve("a"), Some(MovementType::Withdrawal));
        assert_eq!(reg.resolve("b"), Some(MovementType::Transfer));
        assert_eq!(reg.resolve("c"), Some(MovementType::Intake));
    }

    #[test]
    fn unknown_options_do_not_resolve() {
        let reg = TypeRegistry::from_options(&opts(&[("x", "Otro"), ("", "---------")]));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.resolve("x"), None);
        assert_eq!(reg.resolve(""), None);
    }

    #[test]
    fn values_outside_options_fall_back_to_tokens() {
        let reg = TypeRegistry::from_options(&opts(&[("1", "Entrada")]));
        assert_eq!(reg.resolve("EGRESO"), Some(MovementType::Withdrawal));
        assert_eq!(reg.resolve("zzz"), None);
    }

    #[test]
    fn default_value_prefers_intake_option() {
        let reg = TypeRegistry::from_options(&opts(&[("7", "Salida"), ("9", "Ingreso")]));
        assert_eq!(reg.default_value(), "9");

        let no_intake = TypeRegistry::from_options(&opts(&[("7", "Salida")]));
        assert_eq!(no_intake.default_value(), "INGRESO");
        assert_eq!(
            no_intake.resolve(&no_intake.default_value()),
            Some(MovementType::Intake)
        );
    }

    #[test]
    fn canonical_registry_covers_every_kind() {
        let reg = TypeRegistry::canonical();
        for kind in MovementType::ALL {
            assert_eq!(reg.value_for(kind), Some(kind.as_token()));
        }
    }

    #[test]
    fn fold_label_strips_marks() {
        assert_eq!(fold_label("Ubicación ÁÉÍ"), "ubicacion aei");
    }
}
