//! Kudos category catalog.
//!
//! Two lookup tables keyed by category slug: a one-sentence description shown
//! under the category selector, and a suggested message used to pre-fill the
//! free-text field. Lookups never fail; callers fall back to
//! [`FALLBACK_DESCRIPTION`] or an empty message.

/// Sentinel slug for a user-named category.
pub const CUSTOM_CATEGORY: &str = "custom";

/// Description used when a slug is not in the catalog.
pub const FALLBACK_DESCRIPTION: &str = "Tipo de elogio selecionado";

/// Glyph rendered in place of a category emoji for custom categories.
pub const CUSTOM_CATEGORY_GLYPH: &str = "✏️";

const DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "entrega-excepcional",
        "Reconhecer entregas de alta qualidade, no prazo ou superando expectativas",
    ),
    ("espirito-de-equipe", "Colaboração, ajudar colegas, trabalho em conjunto"),
    ("ideia-brilhante", "Inovação, criatividade, soluções inteligentes"),
    ("acima-e-alem", "Ir além do esperado, esforço extra"),
    ("mestre-em-ensinar", "Compartilhar conhecimento, mentorar, ensinar"),
    ("resolvedor-de-problemas", "Resolver problemas complexos, troubleshooting"),
    ("atitude-positiva", "Manter o moral alto, positividade, energia boa"),
    ("crescimento-continuo", "Aprendizado, desenvolvimento pessoal, adaptabilidade"),
    ("conquista-do-time", "Vitórias coletivas, marcos alcançados"),
    ("resiliencia", "Superar desafios, persistência, lidar com adversidades"),
];

const SUGGESTED_MESSAGES: &[(&str, &str)] = &[
    ("entrega-excepcional", "Sua dedicação e capricho na entrega fizeram toda a diferença!"),
    ("espirito-de-equipe", "Obrigado por estar sempre a disposição para ajudar o time!"),
    ("ideia-brilhante", "Sua ideia trouxe uma perspectiva nova e valiosa para o problema!"),
    ("acima-e-alem", "Você foi além das expectativas e isso não passou despercebido!"),
    ("mestre-em-ensinar", "Obrigado por compartilhar seu conhecimento e ajudar o time a crescer!"),
    ("resolvedor-de-problemas", "Sua habilidade de resolver problemas salvou o dia!"),
    ("atitude-positiva", "Sua energia positiva contagia e motiva todo o time!"),
    ("crescimento-continuo", "Inspirador ver sua dedicação em sempre aprender e evoluir!"),
    ("conquista-do-time", "Parabéns pela conquista! Sucesso de todos nós!"),
    ("resiliencia", "Sua persistência diante dos desafios é admirável!"),
];

/// A category selection as seen in an interaction payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KudoCategory<'a> {
    Custom,
    /// Any other slug, known to the catalog or not.
    Predefined(&'a str),
}

impl<'a> KudoCategory<'a> {
    pub fn from_slug(slug: &'a str) -> Self {
        if slug == CUSTOM_CATEGORY {
            Self::Custom
        } else {
            Self::Predefined(slug)
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }

    /// Description text for the context block, with the fixed fallback for
    /// unknown slugs. Custom categories have no description.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::Custom => None,
            Self::Predefined(slug) => Some(description(slug).unwrap_or(FALLBACK_DESCRIPTION)),
        }
    }

    /// Suggested message, or an empty string when none applies.
    pub fn suggested_message(&self) -> &'static str {
        match self {
            Self::Custom => "",
            Self::Predefined(slug) => suggested_message(slug).unwrap_or_default(),
        }
    }
}

pub fn description(slug: &str) -> Option<&'static str> {
    lookup(DESCRIPTIONS, slug)
}

pub fn suggested_message(slug: &str) -> Option<&'static str> {
    lookup(SUGGESTED_MESSAGES, slug)
}

pub fn description_slugs() -> impl Iterator<Item = &'static str> {
    DESCRIPTIONS.iter().map(|(slug, _)| *slug)
}

pub fn suggested_message_slugs() -> impl Iterator<Item = &'static str> {
    SUGGESTED_MESSAGES.iter().map(|(slug, _)| *slug)
}

fn lookup(table: &'static [(&'static str, &'static str)], slug: &str) -> Option<&'static str> {
    table.iter().find(|(key, _)| *key == slug).map(|(_, value)| *value)
}

#[cfg(test)]
mod tests {
    use super::{
        description, description_slugs, suggested_message, suggested_message_slugs, KudoCategory,
        DESCRIPTIONS, FALLBACK_DESCRIPTION, SUGGESTED_MESSAGES,
    };

    #[test]
    fn every_suggested_message_has_a_description() {
        for slug in suggested_message_slugs() {
            assert!(description(slug).is_some(), "missing description for `{slug}`");
        }
    }

    #[test]
    fn every_description_has_a_suggested_message() {
        for slug in description_slugs() {
            assert!(suggested_message(slug).is_some(), "missing suggested message for `{slug}`");
        }
    }

    #[test]
    fn catalog_entries_have_reasonable_length() {
        for (slug, text) in DESCRIPTIONS.iter().chain(SUGGESTED_MESSAGES.iter()) {
            assert!(text.chars().count() >= 10, "entry for `{slug}` is too short: `{text}`");
        }
    }

    #[test]
    fn slugs_are_unique() {
        let mut slugs = description_slugs().collect::<Vec<_>>();
        let total = slugs.len();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), total);
    }

    #[test]
    fn unknown_slug_falls_back_to_fixed_description() {
        let category = KudoCategory::from_slug("nao-existe");
        assert_eq!(category, KudoCategory::Predefined("nao-existe"));
        assert_eq!(category.description(), Some(FALLBACK_DESCRIPTION));
        assert_eq!(category.suggested_message(), "");
    }

    #[test]
    fn custom_sentinel_has_no_catalog_text() {
        let category = KudoCategory::from_slug("custom");
        assert!(category.is_custom());
        assert_eq!(category.description(), None);
        assert_eq!(category.suggested_message(), "");
    }

    #[test]
    fn known_slug_resolves_both_tables() {
        let category = KudoCategory::from_slug("resolvedor-de-problemas");
        assert_eq!(category.description(), Some("Resolver problemas complexos, troubleshooting"));
        assert_eq!(
            category.suggested_message(),
            "Sua habilidade de resolver problemas salvou o dia!"
        );
    }
}
