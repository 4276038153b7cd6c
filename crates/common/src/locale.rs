//! Locale labels for poll types and template option names.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// `(locale, key) -> label` for the built-in poll types and the translatable
/// option names of the closed templates.
static LABELS: Lazy<HashMap<(&'static str, &'static str), &'static str>> = Lazy::new(|| {
    let mut labels = HashMap::new();

    labels.insert(("en", "proposal"), "Proposal");
    labels.insert(("en", "poll"), "Poll");
    labels.insert(("en", "count"), "Count");
    labels.insert(("en", "dot_vote"), "Dot vote");
    labels.insert(("en", "meeting"), "Time poll");
    labels.insert(("en", "ranked_choice"), "Ranked choice");

    labels.insert(("es", "proposal"), "Propuesta");
    labels.insert(("es", "poll"), "Encuesta");
    labels.insert(("es", "count"), "Recuento");
    labels.insert(("es", "dot_vote"), "Voto por puntos");
    labels.insert(("es", "meeting"), "Encuesta de horario");
    labels.insert(("es", "ranked_choice"), "Voto preferencial");

    labels.insert(("fr", "proposal"), "Proposition");
    labels.insert(("fr", "poll"), "Sondage");
    labels.insert(("fr", "count"), "Comptage");
    labels.insert(("fr", "dot_vote"), "Vote par points");
    labels.insert(("fr", "meeting"), "Sondage horaire");
    labels.insert(("fr", "ranked_choice"), "Vote prioritaire");

    labels.insert(("en", "agree"), "Agree");
    labels.insert(("en", "abstain"), "Abstain");
    labels.insert(("en", "disagree"), "Disagree");
    labels.insert(("en", "block"), "Block");
    labels.insert(("en", "yes"), "Yes");

    labels
});

/// The localized, lowercased label for a poll type.
///
/// Falls back to `en`, then to the raw key with underscores spaced out, so
/// an unregistered type still renders as words.
#[must_use]
pub fn poll_type_label(locale: &str, poll_type: &str) -> String {
    LABELS
        .get(&(locale, poll_type))
        .or_else(|| LABELS.get(&("en", poll_type)))
        .map_or_else(|| poll_type.replace('_', " "), |label| (*label).to_string())
        .to_lowercase()
}

/// The localized label for a translatable option name, e.g. `agree`.
///
/// Unlike poll type labels this keeps its display case.
#[must_use]
pub fn option_label(locale: &str, option_name: &str) -> String {
    LABELS
        .get(&(locale, option_name))
        .or_else(|| LABELS.get(&("en", option_name)))
        .map_or_else(|| option_name.to_string(), |label| (*label).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_lowercased() {
        assert_eq!(poll_type_label("en", "proposal"), "proposal");
        assert_eq!(poll_type_label("fr", "meeting"), "sondage horaire");
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(poll_type_label("de", "dot_vote"), "dot vote");
    }

    #[test]
    fn unknown_type_falls_back_to_the_key() {
        assert_eq!(poll_type_label("en", "secret_ballot"), "secret ballot");
    }

    #[test]
    fn option_labels_keep_case() {
        assert_eq!(option_label("en", "agree"), "Agree");
        assert_eq!(option_label("en", "maybe"), "maybe");
    }
}
